//! Completion client module
//!
//! Provides the hosted LLM client and the fixed model catalog.

pub mod catalog;
pub mod client;

// Re-export commonly used types
pub use catalog::ModelId;
pub use client::{CompletionService, HttpCompletionClient, DEFAULT_REQUEST_TIMEOUT};
