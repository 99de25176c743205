//! Shared library for the Commons license census.
//!
//! This crate provides common functionality used by the scraper crate:
//! - Configuration management
//! - Report data models
//! - Output path utilities
//! - Logging infrastructure

pub mod config;
pub mod logging;
pub mod models;
pub mod paths;

// Re-export commonly used types
pub use config::Config;
pub use logging::LogConfig;
pub use models::*;
pub use paths::DataPaths;
