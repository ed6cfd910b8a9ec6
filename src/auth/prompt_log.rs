//! Append-only log of prompts sent on behalf of each user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::errors::{KaiError, Result};

/// One logged prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptLogEntry {
    pub user_id: String,
    pub prompt: String,
    pub logged_at: DateTime<Utc>,
}

impl PromptLogEntry {
    pub fn new(user_id: &str, prompt: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            prompt: prompt.to_string(),
            logged_at: Utc::now(),
        }
    }
}

/// Write-only prompt sink. There is no read path in the pipeline.
pub trait PromptLog: Send + Sync {
    fn append(&self, user_id: &str, prompt: &str) -> Result<()>;
}

/// JSON-lines file, one entry per line
#[derive(Debug, Clone)]
pub struct JsonlPromptLog {
    path: PathBuf,
}

impl JsonlPromptLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PromptLog for JsonlPromptLog {
    fn append(&self, user_id: &str, prompt: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(&PromptLogEntry::new(user_id, prompt))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

/// In-memory log
#[derive(Debug, Default)]
pub struct MemoryPromptLog {
    entries: Mutex<Vec<PromptLogEntry>>,
}

impl MemoryPromptLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<PromptLogEntry> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }
}

impl PromptLog for MemoryPromptLog {
    fn append(&self, user_id: &str, prompt: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| KaiError::Config("prompt log lock poisoned".to_string()))?
            .push(PromptLogEntry::new(user_id, prompt));
        Ok(())
    }
}
