// RAG (Retrieval-Augmented Generation) Pipeline
//
// Components:
// - Query Rewriter: condense history + question into a search query
// - Retriever: filtered search across the configured chunk indices
// - Prompt Assembler: persona, context, history and question in one prompt
// - Post-processing: numeric cleanup and optional bullet summary
// - Pipeline: end-to-end orchestration per question

pub mod pipeline;
pub mod postprocess;
pub mod prompt;
pub mod retrieval;
pub mod rewriter;

// Re-export key types
pub use pipeline::{Answer, RAGConfig, RAGPipeline, StageTimings};
pub use prompt::{Persona, PromptAssembler, PromptRequest};
pub use retrieval::{RetrievalParams, RetrievalResult, RetrievedChunk, Retriever};
pub use rewriter::{QueryRewriter, RewriteOutcome};
