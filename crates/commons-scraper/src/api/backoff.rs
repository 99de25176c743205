//! Randomized exponential backoff between retries.
//!
//! Each wait lasts `base^exponent` seconds plus a jitter of 0.001..=0.999
//! seconds, capped at a ceiling. The exponent only grows while the uncapped
//! delay is still below the ceiling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::time::sleep;

/// Backoff controller owned by a single client
#[derive(Debug)]
pub struct Backoff {
    /// Growth base
    base: f64,
    /// Ceiling in seconds
    max_wait_secs: f64,
    /// Current exponent, 0 after construction or reset
    exponent: u32,
    rng: StdRng,
}

impl Backoff {
    /// Create a backoff controller seeded from the OS entropy source
    pub fn new(base: f64, max_wait_secs: f64) -> Self {
        Self::with_rng(base, max_wait_secs, StdRng::from_entropy())
    }

    /// Create a backoff controller with a caller-supplied random source
    pub fn with_rng(base: f64, max_wait_secs: f64, rng: StdRng) -> Self {
        Self {
            base,
            max_wait_secs,
            exponent: 0,
            rng,
        }
    }

    /// Compute the next delay and advance the exponent, without sleeping
    pub fn next_delay(&mut self) -> Duration {
        let jitter = self.rng.gen_range(1..=1000u32) as f64 / 1000.0;
        let exponent = i32::try_from(self.exponent).unwrap_or(i32::MAX);
        let backoff = self.base.powi(exponent) + jitter;

        if backoff < self.max_wait_secs {
            self.exponent = self.exponent.saturating_add(1);
        }

        // Ceilings beyond what a Duration can hold saturate
        Duration::try_from_secs_f64(backoff.min(self.max_wait_secs)).unwrap_or(Duration::MAX)
    }

    /// Sleep for the next delay
    pub async fn wait(&mut self) -> Duration {
        let delay = self.next_delay();
        tracing::debug!(
            delay_ms = delay.as_millis(),
            exponent = self.exponent,
            "Backing off before retry"
        );
        sleep(delay).await;
        delay
    }

    /// Drop back to the initial schedule
    pub fn reset(&mut self) {
        if self.exponent > 0 {
            tracing::debug!(exponent = self.exponent, "Backoff reset");
        }
        self.exponent = 0;
    }

    pub fn exponent(&self) -> u32 {
        self.exponent
    }
}
