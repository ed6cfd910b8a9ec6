//! Conversation history with a sliding window view
//!
//! Storage is unbounded; only `window_view` limits what the model sees.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of trailing turns used as model context
pub const DEFAULT_WINDOW_SIZE: usize = 7;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in the conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
    timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Ordered log of turns for one conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryBuffer {
    turns: Vec<Turn>,
    /// No question has been asked since creation or the last `clear`
    fresh: bool,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self {
            turns: Vec::new(),
            fresh: true,
        }
    }

    /// Add a turn at the end
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
        self.fresh = false;
    }

    /// The last `min(window, len)` turns, oldest first
    pub fn window_view(&self, window: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(window);
        &self.turns[start..]
    }

    /// Drop every turn and mark the conversation fresh
    pub fn clear(&mut self) {
        self.turns.clear();
        self.fresh = true;
    }

    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Render turns as `role: content` lines
pub fn format_turns(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|t| format!("{}: {}", t.role(), t.content()))
        .collect::<Vec<_>>()
        .join("\n")
}
