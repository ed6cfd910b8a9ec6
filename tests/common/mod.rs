//! Shared in-process fakes for the search and completion services

#![allow(dead_code)]

use askkai::completion::{CompletionService, ModelId};
use askkai::search::{SearchHit, SearchRequest, SearchResponse, SearchService};
use askkai::{KaiError, Result};
use async_trait::async_trait;
use std::sync::Mutex;

pub fn hit(text: &str, path: &str, category: &str) -> SearchHit {
    SearchHit {
        chunk: text.to_string(),
        relative_path: path.to_string(),
        category: category.to_string(),
    }
}

/// Index returning fixed hits and recording every request it receives
pub struct RecordingIndex {
    name: String,
    hits: Vec<SearchHit>,
    fail: bool,
    requests: Mutex<Vec<SearchRequest>>,
}

impl RecordingIndex {
    pub fn new(name: &str, hits: Vec<SearchHit>) -> Self {
        Self {
            name: name.to_string(),
            hits,
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(name, Vec::new())
        }
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchService for RecordingIndex {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(KaiError::external("search", "connection refused"));
        }
        Ok(SearchResponse {
            results: self.hits.clone(),
        })
    }
}

/// Which kind of call a prompt belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Rewrite,
    Answer,
    Summary,
}

pub fn classify(prompt: &str) -> CallKind {
    if prompt.starts_with("Based on the chat history") {
        CallKind::Rewrite
    } else if prompt.starts_with("Summarize the answer") {
        CallKind::Summary
    } else {
        CallKind::Answer
    }
}

/// Completion fake with one canned reply per call kind.
/// A `None` reply makes that kind of call fail.
pub struct FakeCompletion {
    rewrite: Mutex<Option<String>>,
    answer: Mutex<Option<String>>,
    summary: Mutex<Option<String>>,
    calls: Mutex<Vec<(CallKind, ModelId, String)>>,
}

impl FakeCompletion {
    pub fn new() -> Self {
        Self::with(Some("rewritten query"), Some("The answer."), Some("- point"))
    }

    pub fn with(rewrite: Option<&str>, answer: Option<&str>, summary: Option<&str>) -> Self {
        Self {
            rewrite: Mutex::new(rewrite.map(str::to_string)),
            answer: Mutex::new(answer.map(str::to_string)),
            summary: Mutex::new(summary.map(str::to_string)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_rewrite(&self, reply: Option<&str>) {
        *self.rewrite.lock().unwrap() = reply.map(str::to_string);
    }

    pub fn set_answer(&self, reply: Option<&str>) {
        *self.answer.lock().unwrap() = reply.map(str::to_string);
    }

    pub fn set_summary(&self, reply: Option<&str>) {
        *self.summary.lock().unwrap() = reply.map(str::to_string);
    }

    pub fn calls(&self) -> Vec<(CallKind, ModelId, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn prompts(&self, kind: CallKind) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|(k, _, _)| *k == kind)
            .map(|(_, _, p)| p)
            .collect()
    }
}

#[async_trait]
impl CompletionService for FakeCompletion {
    async fn complete(&self, model: ModelId, prompt: &str) -> Result<String> {
        let kind = classify(prompt);
        self.calls
            .lock()
            .unwrap()
            .push((kind, model, prompt.to_string()));

        let reply = match kind {
            CallKind::Rewrite => self.rewrite.lock().unwrap().clone(),
            CallKind::Answer => self.answer.lock().unwrap().clone(),
            CallKind::Summary => self.summary.lock().unwrap().clone(),
        };
        reply.ok_or_else(|| KaiError::external("completion", "503 Service Unavailable"))
    }
}
