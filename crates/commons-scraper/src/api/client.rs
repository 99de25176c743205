//! Wikimedia Commons API client with bounded retry and backoff.

use super::backoff::Backoff;
use super::types::*;
use crate::traversal::CategorySource;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::ContentMetrics;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Namespace prefix carried by every category title
pub const CATEGORY_NAMESPACE: &str = "Category:";

const METRICS_OPERATION: &str = "categoryinfo";
const SUBCATEGORIES_OPERATION: &str = "categorymembers";

/// Failure of a single request attempt; always retried
#[derive(Debug, Error)]
pub enum TransientError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// The response parsed but does not contain the expected `query` data
    #[error("empty {operation} result for category '{category}': {detail}")]
    EmptyResult {
        category: String,
        operation: &'static str,
        detail: String,
    },

    #[error("{operation} request for category '{category}' failed after {attempts} attempts")]
    RetriesExhausted {
        category: String,
        operation: &'static str,
        attempts: u32,
        #[source]
        source: TransientError,
    },

    #[error("failed to build HTTP client")]
    Build(#[source] reqwest::Error),
}

impl ClientError {
    pub fn is_empty_result(&self) -> bool {
        matches!(self, ClientError::EmptyResult { .. })
    }
}

/// Wikimedia Commons `api.php` client
pub struct CommonsClient {
    /// HTTP client
    client: Client,
    /// Full URL of the `api.php` endpoint
    base_url: String,
    /// `cmlimit` sent with subcategory listings
    members_per_request: u32,
    /// Retries after the first attempt
    max_retries: u32,
    backoff: Backoff,
}

impl CommonsClient {
    /// Create a new Commons client
    pub fn new(
        base_url: String,
        user_agent: &str,
        timeout: Duration,
        members_per_request: u32,
        max_retries: u32,
        backoff: Backoff,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            client,
            base_url,
            members_per_request,
            max_retries,
            backoff,
        })
    }

    /// Issue a query, retrying transient failures with backoff
    ///
    /// A body that is valid JSON but does not have the shape of `T` is an
    /// empty result and is not retried.
    async fn get<T: DeserializeOwned>(
        &mut self,
        category: &str,
        operation: &'static str,
        params: &[(String, String)],
    ) -> Result<T, ClientError> {
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(category, operation, attempt, "Making API request");

            match self.try_get(params).await {
                Ok(body) => {
                    self.backoff.reset();
                    return serde_json::from_value(body).map_err(|e| ClientError::EmptyResult {
                        category: category.to_string(),
                        operation,
                        detail: format!("unexpected response structure: {}", e),
                    });
                }
                Err(e) if attempt > self.max_retries => {
                    return Err(ClientError::RetriesExhausted {
                        category: category.to_string(),
                        operation,
                        attempts: attempt,
                        source: e,
                    });
                }
                Err(e) => {
                    warn!(category, operation, attempt, error = %e, "Request failed, retrying");
                    self.backoff.wait().await;
                }
            }
        }
    }

    async fn try_get(&self, params: &[(String, String)]) -> Result<Value, TransientError> {
        let response = self.client.get(&self.base_url).query(params).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TransientError::Status { status, body });
        }

        Ok(response.json::<Value>().await?)
    }

    /// Sum file and page counts over every page entry returned for a category
    pub async fn get_content_metrics(
        &mut self,
        category: &str,
    ) -> Result<ContentMetrics, ClientError> {
        let params = vec![
            param("action", "query"),
            param("prop", "categoryinfo"),
            param("titles", &query_title(category)),
            param("format", "json"),
        ];

        let QueryResponse { query, error, .. }: QueryResponse<CategoryInfoQuery> =
            self.get(category, METRICS_OPERATION, &params).await?;

        let pages = query
            .and_then(|q| q.pages)
            .ok_or_else(|| empty_result(category, METRICS_OPERATION, error))?;

        let mut metrics = ContentMetrics::default();
        for (page_id, entry) in &pages {
            match entry.categoryinfo {
                Some(info) => {
                    metrics.file_count += info.files;
                    metrics.page_count += info.pages;
                }
                None => debug!(
                    category,
                    page_id = %page_id,
                    title = entry.title.as_deref().unwrap_or(""),
                    "Page entry has no category info, counting as empty"
                ),
            }
        }

        Ok(metrics)
    }

    /// List the immediate subcategories of a category, following continuations
    ///
    /// Returned names have the namespace prefix removed and `&` escaped as
    /// `%26`.
    pub async fn list_subcategories(&mut self, category: &str) -> Result<Vec<String>, ClientError> {
        let mut names = Vec::new();
        let mut continuation: Option<Continuation> = None;
        let mut seen_tokens: HashSet<Continuation> = HashSet::new();

        loop {
            let mut params = vec![
                param("action", "query"),
                param("list", "categorymembers"),
                param("cmtitle", &query_title(category)),
                param("cmtype", "subcat"),
                param("cmlimit", &self.members_per_request.to_string()),
                param("format", "json"),
            ];
            if let Some(tokens) = &continuation {
                params.extend(tokens.iter().map(|(k, v)| (k.clone(), v.clone())));
            }

            let QueryResponse {
                query,
                continuation: next,
                error,
            }: QueryResponse<CategoryMembersQuery> =
                self.get(category, SUBCATEGORIES_OPERATION, &params).await?;

            let members = query
                .and_then(|q| q.categorymembers)
                .ok_or_else(|| empty_result(category, SUBCATEGORIES_OPERATION, error))?;

            names.extend(members.iter().map(|m| category_name(&m.title)));

            match next {
                Some(tokens) if seen_tokens.insert(tokens.clone()) => {
                    debug!(category, fetched = names.len(), "Following subcategory continuation");
                    continuation = Some(tokens);
                }
                Some(_) => {
                    warn!(category, "API repeated an earlier continuation, stopping listing");
                    break;
                }
                None => break,
            }
        }

        Ok(names)
    }
}

#[async_trait]
impl CategorySource for CommonsClient {
    async fn get_content_metrics(&mut self, category: &str) -> Result<ContentMetrics, ClientError> {
        CommonsClient::get_content_metrics(self, category).await
    }

    async fn list_subcategories(&mut self, category: &str) -> Result<Vec<String>, ClientError> {
        CommonsClient::list_subcategories(self, category).await
    }
}

fn param(key: &str, value: &str) -> (String, String) {
    (key.to_string(), value.to_string())
}

/// Title sent to the API for a category name
///
/// Names carry `&` escaped as `%26`; it is restored here so the HTTP layer
/// encodes the title exactly once.
pub fn query_title(category: &str) -> String {
    format!("{}{}", CATEGORY_NAMESPACE, category.replace("%26", "&"))
}

/// Category name derived from a member title
pub fn category_name(title: &str) -> String {
    title
        .strip_prefix(CATEGORY_NAMESPACE)
        .unwrap_or(title)
        .replace('&', "%26")
}

fn empty_result(category: &str, operation: &'static str, error: Option<ApiError>) -> ClientError {
    let detail = match error {
        Some(e) => format!("API error {}: {}", e.code, e.info),
        None => "response has no query data".to_string(),
    };
    ClientError::EmptyResult {
        category: category.to_string(),
        operation,
        detail,
    }
}
