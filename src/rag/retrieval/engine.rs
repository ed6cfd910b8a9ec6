// Retrieval engine: filtered search over one or more chunk indices
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::search::{CategoryFilter, SearchHit, SearchRequest, SearchService, DEFAULT_COLUMNS};

/// Default number of chunks requested from each index
pub const DEFAULT_NUM_CHUNKS: usize = 3;

/// Retrieval parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalParams {
    /// Maximum chunks taken from each index
    pub limit: usize,
    /// Columns requested from the index
    pub columns: Vec<String>,
    /// Drop repeated (source path, text) pairs, keeping the first
    pub dedupe: bool,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_NUM_CHUNKS,
            columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            dedupe: true,
        }
    }
}

/// One chunk returned for the current question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub source_path: String,
    pub category: String,
    /// Position within the response of the index it came from
    pub rank: usize,
}

impl RetrievedChunk {
    fn from_hit(hit: SearchHit, rank: usize) -> Self {
        Self {
            text: hit.chunk,
            source_path: hit.relative_path,
            category: hit.category,
            rank,
        }
    }
}

/// An index that could not contribute to the result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalFailure {
    pub index: String,
    pub message: String,
}

/// Concatenated chunks from every index, in call order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub query: String,
    pub chunks: Vec<RetrievedChunk>,
    pub failures: Vec<RetrievalFailure>,
}

impl RetrievalResult {
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Distinct source paths, in first-seen order
    pub fn sources(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.chunks
            .iter()
            .map(|c| c.source_path.as_str())
            .filter(|p| !p.is_empty() && seen.insert(*p))
            .collect()
    }

    /// One user-facing line per index that failed this turn
    pub fn failure_messages(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|f| {
                format!(
                    "search index '{}' failed, answer drafted without its context: {}",
                    f.index, f.message
                )
            })
            .collect()
    }
}

/// Issues searches against the configured indices and merges the results
pub struct Retriever {
    indices: Vec<Arc<dyn SearchService>>,
    params: RetrievalParams,
}

impl Retriever {
    /// Create retriever over the given indices
    pub fn new(indices: Vec<Arc<dyn SearchService>>) -> Self {
        Self::with_params(indices, RetrievalParams::default())
    }

    /// Create with custom parameters
    pub fn with_params(indices: Vec<Arc<dyn SearchService>>, params: RetrievalParams) -> Self {
        Self { indices, params }
    }

    /// Query every index in order. Never fails: an index that errors is
    /// recorded in `failures` and the others still contribute.
    pub async fn retrieve(&self, query: &str, filter: &CategoryFilter) -> RetrievalResult {
        let request = SearchRequest::new(query, &self.params.columns, filter, self.params.limit);
        let mut result = RetrievalResult {
            query: query.to_string(),
            ..Default::default()
        };
        let mut seen: HashSet<(String, String)> = HashSet::new();

        for index in &self.indices {
            match index.search(&request).await {
                Ok(response) => {
                    tracing::debug!(
                        index = index.name(),
                        hits = response.results.len(),
                        "search completed"
                    );
                    let hits = response.results.into_iter().take(self.params.limit);
                    for (rank, hit) in hits.enumerate() {
                        let chunk = RetrievedChunk::from_hit(hit, rank);
                        if self.params.dedupe
                            && !seen.insert((chunk.source_path.clone(), chunk.text.clone()))
                        {
                            continue;
                        }
                        result.chunks.push(chunk);
                    }
                }
                Err(e) => {
                    tracing::warn!(index = index.name(), error = %e, "search failed, continuing without it");
                    result.failures.push(RetrievalFailure {
                        index: index.name().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        result
    }

    /// Number of indices queried per question
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn params(&self) -> &RetrievalParams {
        &self.params
    }

    pub fn set_params(&mut self, params: RetrievalParams) {
        self.params = params;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{KaiError, Result};
    use crate::search::SearchResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StaticIndex {
        name: String,
        hits: Vec<SearchHit>,
        requests: Mutex<Vec<SearchRequest>>,
    }

    impl StaticIndex {
        fn new(name: &str, hits: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                hits: hits
                    .iter()
                    .map(|(path, text)| SearchHit {
                        chunk: text.to_string(),
                        relative_path: path.to_string(),
                        category: "Financials".to_string(),
                    })
                    .collect(),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SearchService for StaticIndex {
        fn name(&self) -> &str {
            &self.name
        }

        async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(SearchResponse {
                results: self.hits.clone(),
            })
        }
    }

    struct BrokenIndex;

    #[async_trait]
    impl SearchService for BrokenIndex {
        fn name(&self) -> &str {
            "broken"
        }

        async fn search(&self, _request: &SearchRequest) -> Result<SearchResponse> {
            Err(KaiError::parse("search response", "unexpected body"))
        }
    }

    #[test]
    fn test_params_default() {
        let params = RetrievalParams::default();
        assert_eq!(params.limit, 3);
        assert_eq!(params.columns, vec!["chunk", "relative_path", "category"]);
        assert!(params.dedupe);
    }

    #[tokio::test]
    async fn test_caps_each_index_at_limit() {
        let index = StaticIndex::new("a", &[("1.pdf", "a"), ("2.pdf", "b"), ("3.pdf", "c"), ("4.pdf", "d")]);
        let retriever = Retriever::new(vec![index.clone()]);

        let result = retriever.retrieve("revenue", &CategoryFilter::All).await;
        assert_eq!(result.len(), 3);
        assert_eq!(result.chunks[2].rank, 2);
        assert_eq!(index.requests.lock().unwrap()[0].limit, 3);
    }

    #[tokio::test]
    async fn test_concatenates_in_call_order() {
        let first = StaticIndex::new("first", &[("a.pdf", "alpha")]);
        let second = StaticIndex::new("second", &[("b.pdf", "beta")]);
        let retriever = Retriever::new(vec![first, second]);

        let result = retriever.retrieve("q", &CategoryFilter::All).await;
        let texts: Vec<_> = result.chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_dedupes_across_indices() {
        let first = StaticIndex::new("first", &[("a.pdf", "same"), ("b.pdf", "other")]);
        let second = StaticIndex::new("second", &[("a.pdf", "same")]);

        let retriever = Retriever::new(vec![first.clone(), second.clone()]);
        assert_eq!(retriever.retrieve("q", &CategoryFilter::All).await.len(), 2);

        let params = RetrievalParams {
            dedupe: false,
            ..Default::default()
        };
        let retriever = Retriever::with_params(vec![first, second], params);
        assert_eq!(retriever.retrieve("q", &CategoryFilter::All).await.len(), 3);
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_other_results() {
        let good = StaticIndex::new("good", &[("a.pdf", "alpha")]);
        let retriever = Retriever::new(vec![Arc::new(BrokenIndex), good]);

        let result = retriever.retrieve("q", &CategoryFilter::All).await;
        assert_eq!(result.len(), 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].index, "broken");
    }

    #[tokio::test]
    async fn test_filter_is_forwarded() {
        let index = StaticIndex::new("a", &[]);
        let retriever = Retriever::new(vec![index.clone()]);

        retriever.retrieve("q", &CategoryFilter::parse("Snacks")).await;
        retriever.retrieve("q", &CategoryFilter::parse("ALL")).await;

        let requests = index.requests.lock().unwrap();
        assert_eq!(
            requests[0].filter,
            Some(serde_json::json!({"@eq": {"category": "Snacks"}}))
        );
        assert!(requests[1].filter.is_none());
    }

    #[test]
    fn test_sources_are_distinct() {
        let chunk = |path: &str, text: &str| RetrievedChunk {
            text: text.to_string(),
            source_path: path.to_string(),
            category: String::new(),
            rank: 0,
        };
        let result = RetrievalResult {
            query: "q".to_string(),
            chunks: vec![chunk("a.pdf", "1"), chunk("b.pdf", "2"), chunk("a.pdf", "3")],
            failures: vec![],
        };
        assert_eq!(result.sources(), vec!["a.pdf", "b.pdf"]);
    }

    #[test]
    fn test_failure_messages_name_each_index() {
        let result = RetrievalResult {
            query: "revenue".to_string(),
            chunks: Vec::new(),
            failures: vec![
                RetrievalFailure {
                    index: "docs".to_string(),
                    message: "HTTP 503".to_string(),
                },
                RetrievalFailure {
                    index: "filings".to_string(),
                    message: "timed out".to_string(),
                },
            ],
        };

        let messages = result.failure_messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("'docs'") && messages[0].contains("HTTP 503"));
        assert!(messages[1].contains("'filings'") && messages[1].contains("timed out"));
        assert!(RetrievalResult::default().failure_messages().is_empty());
    }
}
