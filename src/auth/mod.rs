//! Login and prompt logging collaborators
//!
//! Both sit beside the pipeline: credentials gate who may open a session,
//! and the prompt log records what was sent on their behalf.

pub mod credentials;
pub mod prompt_log;

pub use credentials::{AuthService, CredentialStore, JsonCredentialStore, MemoryCredentialStore};
pub use prompt_log::{JsonlPromptLog, MemoryPromptLog, PromptLog, PromptLogEntry};
