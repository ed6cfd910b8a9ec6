//! Search service client
//!
//! Queries one managed chunk index:
//! POST /api/v2/databases/{db}/schemas/{schema}/cortex-search-services/{service}:query

use crate::errors::{KaiError, Result};
use crate::search::types::{SearchRequest, SearchResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const SERVICE: &str = "search";

/// A queryable chunk index
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Name used when reporting failures of this index
    fn name(&self) -> &str;

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;
}

/// Location of one search service inside the account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceLocation {
    pub database: String,
    pub schema: String,
    pub service: String,
}

impl ServiceLocation {
    pub fn new(database: &str, schema: &str, service: &str) -> Self {
        Self {
            database: database.to_string(),
            schema: schema.to_string(),
            service: service.to_string(),
        }
    }

    /// Dotted name, e.g. `DOCS.DATA.CC_SEARCH_SERVICE_CS`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}.{}", self.database, self.schema, self.service)
    }
}

/// HTTP client for one search service
#[derive(Debug, Clone)]
pub struct HttpSearchClient {
    client: Client,
    base_url: String,
    location: ServiceLocation,
    name: String,
    token: Option<String>,
    timeout: Duration,
}

impl HttpSearchClient {
    pub fn with_config(
        base_url: &str,
        location: ServiceLocation,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(KaiError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            name: location.qualified_name(),
            location,
            token,
            timeout,
        })
    }

    /// Full query URL for this service
    pub fn endpoint(&self) -> String {
        format!(
            "{}/api/v2/databases/{}/schemas/{}/cortex-search-services/{}:query",
            self.base_url, self.location.database, self.location.schema, self.location.service
        )
    }
}

#[async_trait]
impl SearchService for HttpSearchClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let mut builder = self.client.post(self.endpoint()).json(request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| KaiError::from_send(SERVICE, e, self.timeout))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(KaiError::external(
                SERVICE,
                format!("{} returned HTTP {}: {}", self.name, status, error_text),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| KaiError::external(SERVICE, format!("Failed to read response: {}", e)))?;

        parse_search_body(&body)
    }
}

/// Decode a search response body
pub fn parse_search_body(body: &str) -> Result<SearchResponse> {
    serde_json::from_str(body).map_err(|e| KaiError::parse("search response", e.to_string()))
}
