//! Commons scraper library for census of license categories.
//!
//! This library crawls the Wikimedia Commons category tree below a root
//! license category and records file and page counts per category.

pub mod api;
pub mod report;
pub mod traversal;

pub use api::{Backoff, ClientError, CommonsClient};
pub use report::ReportWriter;
pub use traversal::{CategorySource, CrawlStats, LicenseCrawler, VisitedSet};
