//! Data models for the license census.
//!
//! A category is identified by its name; the alias records how the crawl
//! reached it and only labels report rows.

use std::fmt;

/// Aggregate file and page counts of a category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentMetrics {
    pub file_count: u64,
    pub page_count: u64,
}

impl ContentMetrics {
    pub fn new(file_count: u64, page_count: u64) -> Self {
        Self {
            file_count,
            page_count,
        }
    }
}

/// One data line of the census report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    /// Slash-joined route from the root category
    pub alias: String,
    pub metrics: ContentMetrics,
}

impl ReportRow {
    pub fn new(alias: impl Into<String>, metrics: ContentMetrics) -> Self {
        Self {
            alias: alias.into(),
            metrics,
        }
    }
}

/// Rendered without quoting; aliases are assumed to be comma-free
impl fmt::Display for ReportRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{}",
            self.alias, self.metrics.file_count, self.metrics.page_count
        )
    }
}

/// Join a parent alias and a child category name
pub fn child_alias(parent: &str, child: &str) -> String {
    format!("{}/{}", parent, child)
}
