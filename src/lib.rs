//! AskKAI - retrieval-augmented chat assistant
//!
//! Answers questions about an indexed document corpus by rewriting each
//! follow-up into a standalone search query, retrieving matching chunks,
//! and asking a hosted completion model to answer from that context.
//!
//! # Architecture
//!
//! - **chat**: turn history and per-user conversation state
//! - **search** / **completion**: HTTP clients for the hosted services
//! - **rag**: query rewriting, retrieval, prompt assembly, orchestration
//! - **auth**: login and prompt logging
//! - **cli** / **repl** / **integration**: configuration and terminal front end

pub mod errors;
pub mod logging;

pub mod chat;
pub mod completion;
pub mod search;

pub mod rag;
pub mod auth;

pub mod cli;
pub mod integration;
pub mod repl;

// Re-export commonly used types
pub use errors::{KaiError, Result};
pub use integration::Assistant;
pub use rag::{Answer, RAGPipeline};
