//! MediaWiki action API response types.
//!
//! Only the fields the census reads are modelled. Every level that may be
//! absent in a structurally broken response is an `Option`, so a missing key
//! surfaces as `None` instead of a deserialization failure.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Continuation tokens to send back verbatim for the next page
pub type Continuation = BTreeMap<String, String>;

/// Top-level envelope shared by every `action=query` response
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse<Q> {
    pub query: Option<Q>,
    #[serde(default, rename = "continue")]
    pub continuation: Option<Continuation>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

/// Error object returned instead of `query`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub info: String,
}

/// `prop=categoryinfo` payload
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInfoQuery {
    /// Keyed by page id (negative ids for missing pages)
    #[serde(default)]
    pub pages: Option<HashMap<String, PageEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub categoryinfo: Option<CategoryInfo>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CategoryInfo {
    #[serde(default)]
    pub files: u64,
    #[serde(default)]
    pub pages: u64,
}

/// `list=categorymembers` payload
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryMembersQuery {
    #[serde(default)]
    pub categorymembers: Option<Vec<CategoryMember>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryMember {
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_query_is_none() {
        let parsed: QueryResponse<CategoryInfoQuery> =
            serde_json::from_str(r#"{"batchcomplete": ""}"#).unwrap();
        assert!(parsed.query.is_none());
        assert!(parsed.error.is_none());
    }

    #[test]
    fn test_missing_query_with_continuation_only() {
        let parsed: QueryResponse<CategoryMembersQuery> =
            serde_json::from_str(r#"{"continue": {"cmcontinue": "x", "continue": "-||"}}"#).unwrap();
        assert!(parsed.query.is_none());
        assert_eq!(parsed.continuation.unwrap().len(), 2);
    }

    #[test]
    fn test_member_without_title_fails_to_parse() {
        let result = serde_json::from_str::<QueryResponse<CategoryMembersQuery>>(
            r#"{"query": {"categorymembers": [{"ns": 14}]}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_error_payload() {
        let parsed: QueryResponse<CategoryMembersQuery> = serde_json::from_str(
            r#"{"error": {"code": "invalidcategory", "info": "The category name you entered is not valid."}}"#,
        )
        .unwrap();
        let error = parsed.error.unwrap();
        assert_eq!(error.code, "invalidcategory");
        assert!(parsed.query.is_none());
    }

    #[test]
    fn test_missing_category_has_no_info() {
        let parsed: QueryResponse<CategoryInfoQuery> = serde_json::from_str(
            r#"{"query": {"pages": {"-1": {"ns": 14, "title": "Category:Nope", "missing": ""}}}}"#,
        )
        .unwrap();
        let pages = parsed.query.unwrap().pages.unwrap();
        assert!(pages["-1"].categoryinfo.is_none());
    }

    #[test]
    fn test_continuation_tokens() {
        let parsed: QueryResponse<CategoryMembersQuery> = serde_json::from_str(
            r#"{"continue": {"cmcontinue": "subcat|abc|123", "continue": "-||"},
                "query": {"categorymembers": [{"ns": 14, "title": "Category:CC-BY"}]}}"#,
        )
        .unwrap();
        let continuation = parsed.continuation.unwrap();
        assert_eq!(continuation["cmcontinue"], "subcat|abc|123");
        assert_eq!(parsed.query.unwrap().categorymembers.unwrap().len(), 1);
    }
}
