//! Configuration management for the license census.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Longest backoff ceiling accepted, one day
pub const MAX_BACKOFF_CEILING_SECS: f64 = 86_400.0;

/// Root category crawled when none is configured
pub const DEFAULT_ROOT_CATEGORY: &str = "Free_Creative_Commons_licenses";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory settings
    pub data: DataConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Commons scraper settings
    pub scraper: ScraperConfig,

    /// Report output settings
    #[serde(default)]
    pub report: ReportConfig,
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root data directory path
    pub root_dir: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log directory path (relative to data directory or absolute)
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// Commons scraper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Full URL of the MediaWiki `api.php` endpoint
    pub base_url: String,

    /// Category the crawl starts from
    pub root_category: String,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Subcategories requested per listing page (`cmlimit`)
    pub members_per_request: u32,

    /// Maximum retries for failed requests
    pub max_retries: u32,

    /// Backoff between retries
    pub backoff: BackoffConfig,
}

/// Exponential backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Growth base of the delay
    pub base: f64,

    /// Ceiling for a single delay in seconds
    pub max_wait_secs: f64,
}

/// Report output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Report directory (relative to data directory or absolute)
    pub output_dir: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: "reports".to_string(),
        }
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base: 2.0,
            max_wait_secs: 64.0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig {
                root_dir: "data".to_string(),
            },
            logging: LoggingConfig {
                log_dir: "logs".to_string(),
                default_level: "info".to_string(),
                console: true,
                file: true,
                json_format: false,
            },
            scraper: ScraperConfig {
                base_url: "https://commons.wikimedia.org/w/api.php".to_string(),
                root_category: DEFAULT_ROOT_CATEGORY.to_string(),
                user_agent: concat!("commons-scraper/", env!("CARGO_PKG_VERSION")).to_string(),
                request_timeout_secs: 30,
                members_per_request: 500,
                max_retries: 5,
                backoff: BackoffConfig::default(),
            },
            report: ReportConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::load(path)?.unwrap_or_default())
    }

    /// Load configuration from a TOML file, or `None` if the file does not exist
    ///
    /// Runs before logging is initialized, so the caller reports a missing file.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(Some(config))
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }

    /// Reject settings the crawl cannot run with
    pub fn validate(&self) -> Result<()> {
        let backoff = &self.scraper.backoff;
        if backoff.base.is_nan() || backoff.base < 1.0 {
            bail!("scraper.backoff.base must be at least 1, got {}", backoff.base);
        }
        if !backoff.max_wait_secs.is_finite()
            || backoff.max_wait_secs <= 0.0
            || backoff.max_wait_secs > MAX_BACKOFF_CEILING_SECS
        {
            bail!(
                "scraper.backoff.max_wait_secs must be between 0 and {} seconds, got {}",
                MAX_BACKOFF_CEILING_SECS,
                backoff.max_wait_secs
            );
        }
        if self.scraper.root_category.trim().is_empty() {
            bail!("scraper.root_category must not be empty");
        }
        if self.scraper.members_per_request == 0 {
            bail!("scraper.members_per_request must be at least 1");
        }
        Ok(())
    }

    /// Get the absolute path for the data directory
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data.root_dir)
    }

    /// Get the absolute path for the log directory
    pub fn log_dir(&self) -> PathBuf {
        self.resolve(&self.logging.log_dir)
    }

    /// Get the absolute path for the report directory
    pub fn report_dir(&self) -> PathBuf {
        self.resolve(&self.report.output_dir)
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir().join(path)
        }
    }
}
