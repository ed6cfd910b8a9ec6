//! Search request/response types and the category filter

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Columns requested from the chunk index
pub const DEFAULT_COLUMNS: [&str; 3] = ["chunk", "relative_path", "category"];

/// Sentinel category that disables filtering
pub const ALL_CATEGORIES: &str = "ALL";

/// Optional equality predicate on the `category` column
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Equals(String),
}

impl CategoryFilter {
    /// Parse user input; "ALL" (any case) or blank disables the filter
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_CATEGORIES) {
            CategoryFilter::All
        } else {
            CategoryFilter::Equals(trimmed.to_string())
        }
    }

    /// Filter expression for the search request, `None` when unfiltered
    pub fn to_filter(&self) -> Option<Value> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Equals(category) => Some(json!({ "@eq": { "category": category } })),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, CategoryFilter::All)
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str(ALL_CATEGORIES),
            CategoryFilter::Equals(category) => f.write_str(category),
        }
    }
}

/// One search call against a chunk index
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    pub limit: usize,
}

impl SearchRequest {
    pub fn new(query: &str, columns: &[String], filter: &CategoryFilter, limit: usize) -> Self {
        Self {
            query: query.to_string(),
            columns: columns.to_vec(),
            filter: filter.to_filter(),
            limit,
        }
    }
}

/// Raw response body of a search call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

/// One row returned by the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub chunk: String,
    #[serde(default)]
    pub relative_path: String,
    #[serde(default)]
    pub category: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_disables_filter() {
        assert_eq!(CategoryFilter::parse("ALL"), CategoryFilter::All);
        assert_eq!(CategoryFilter::parse("all"), CategoryFilter::All);
        assert_eq!(CategoryFilter::parse("  "), CategoryFilter::All);
        assert!(CategoryFilter::All.to_filter().is_none());
    }

    #[test]
    fn test_equality_predicate() {
        let filter = CategoryFilter::parse("Snacks");
        assert_eq!(filter, CategoryFilter::Equals("Snacks".to_string()));
        assert_eq!(
            filter.to_filter().unwrap(),
            json!({ "@eq": { "category": "Snacks" } })
        );
        assert_eq!(filter.to_string(), "Snacks");
    }

    #[test]
    fn test_request_omits_filter_when_unfiltered() {
        let columns: Vec<String> = DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect();
        let request = SearchRequest::new("revenue", &columns, &CategoryFilter::All, 3);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("filter").is_none());
        assert_eq!(json["limit"], 3);
        assert_eq!(json["columns"][1], "relative_path");
    }

    #[test]
    fn test_response_tolerates_missing_optional_columns() {
        let body = r#"{"results":[{"chunk":"text only"}]}"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.results[0].chunk, "text only");
        assert_eq!(response.results[0].relative_path, "");

        let empty: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.results.is_empty());
    }
}
