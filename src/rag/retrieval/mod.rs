// Retrieval Engine Module
pub mod engine;

pub use engine::{
    RetrievalFailure, RetrievalParams, RetrievalResult, RetrievedChunk, Retriever,
    DEFAULT_NUM_CHUNKS,
};
