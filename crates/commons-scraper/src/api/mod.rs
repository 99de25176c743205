//! Wikimedia Commons API client implementation.
//!
//! This module provides a retrying client with exponential backoff for the
//! two category queries the census needs.

pub mod backoff;
pub mod client;
pub mod types;

pub use backoff::Backoff;
pub use client::{ClientError, CommonsClient, TransientError};
pub use types::*;
