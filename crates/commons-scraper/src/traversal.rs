//! Depth-first crawl of the license category graph.
//!
//! A category is fetched, recorded, marked visited and then expanded, in that
//! order. The graph may contain shared subcategories and cycles; the visited
//! set is the only guard needed for termination.

use crate::api::ClientError;
use crate::report::ReportWriter;
use anyhow::{Context, Result};
use async_trait::async_trait;
use shared::{child_alias, ContentMetrics, ReportRow};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Remote source of category metrics and subcategory listings
#[async_trait]
pub trait CategorySource: Send {
    async fn get_content_metrics(&mut self, category: &str) -> Result<ContentMetrics, ClientError>;

    async fn list_subcategories(&mut self, category: &str) -> Result<Vec<String>, ClientError>;
}

/// Categories recorded during one run
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    recorded: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, category: &str) -> bool {
        self.recorded.contains(category)
    }

    /// Returns false if the category was already marked
    pub fn mark(&mut self, category: &str) -> bool {
        self.recorded.insert(category.to_string())
    }

    pub fn len(&self) -> usize {
        self.recorded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recorded.is_empty()
    }
}

/// Statistics for a crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Categories written to the report
    pub recorded: usize,
    /// Categories skipped with their subtree because metrics were empty
    pub skipped: usize,
    /// Recorded categories whose subcategory listing was empty
    pub truncated: usize,
    /// Encounters of an already visited category
    pub duplicates: usize,
}

/// Crawls a category graph into a report
pub struct LicenseCrawler<S> {
    source: S,
    report: ReportWriter,
}

impl<S: CategorySource> LicenseCrawler<S> {
    pub fn new(source: S, report: ReportWriter) -> Self {
        Self { source, report }
    }

    /// Crawl everything reachable from `root` with a fresh visited set
    pub async fn run(&mut self, root: &str) -> Result<CrawlStats> {
        info!(
            root,
            report = %self.report.path().display(),
            "Starting license census"
        );

        let mut visited = VisitedSet::new();
        let stats = self.visit(&mut visited, root, root).await?;

        info!(
            recorded = stats.recorded,
            skipped = stats.skipped,
            truncated = stats.truncated,
            duplicates = stats.duplicates,
            "License census complete"
        );

        Ok(stats)
    }

    /// Visit `category` under `alias` and everything below it
    ///
    /// Categories already in `visited` are neither fetched nor recorded.
    /// Subtrees are expanded in pre-order, children in the order the source
    /// lists them. Empty results are logged and skipped; any other failure
    /// aborts the crawl.
    pub async fn visit(
        &mut self,
        visited: &mut VisitedSet,
        category: &str,
        alias: &str,
    ) -> Result<CrawlStats> {
        let mut stats = CrawlStats::default();
        let mut pending = vec![(category.to_string(), alias.to_string())];

        while let Some((category, alias)) = pending.pop() {
            if visited.contains(&category) {
                debug!(category = %category, alias = %alias, "Already recorded, skipping");
                stats.duplicates += 1;
                continue;
            }

            let metrics = match self.source.get_content_metrics(&category).await {
                Ok(metrics) => metrics,
                Err(e) if e.is_empty_result() => {
                    warn!(
                        category = %category,
                        alias = %alias,
                        error = %e,
                        "Category will not be processed due to empty result"
                    );
                    stats.skipped += 1;
                    continue;
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to fetch content counts for {}", alias));
                }
            };

            self.report
                .append_row(&ReportRow::new(alias.as_str(), metrics))?;
            visited.mark(&category);
            stats.recorded += 1;

            info!(
                category = %category,
                alias = %alias,
                files = metrics.file_count,
                pages = metrics.page_count,
                "Logged category"
            );

            let subcategories = match self.source.list_subcategories(&category).await {
                Ok(subcategories) => subcategories,
                Err(e) if e.is_empty_result() => {
                    warn!(
                        category = %category,
                        alias = %alias,
                        error = %e,
                        "Subcategories will not be processed due to empty result"
                    );
                    stats.truncated += 1;
                    continue;
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to list subcategories of {}", alias));
                }
            };

            debug!(category = %category, count = subcategories.len(), "Listed subcategories");

            // Reversed so the first listed child is expanded first
            for child in subcategories.into_iter().rev() {
                let child_path = child_alias(&alias, &child);
                pending.push((child, child_path));
            }
        }

        Ok(stats)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn report(&self) -> &ReportWriter {
        &self.report
    }
}
