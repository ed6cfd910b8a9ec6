// Assistant Integration Module
//
// Turns a loaded Config into a ready-to-use assistant: HTTP clients for
// search and completion, the credential store, the prompt log and the
// RAG pipeline that ties them together.

pub mod assistant;

// Re-export key types
pub use assistant::{Assistant, SUGGESTED_QUESTIONS};
