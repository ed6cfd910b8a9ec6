//! Search service module
//!
//! Client and wire types for the managed document-chunk index.

pub mod client;
pub mod types;

pub use client::{HttpSearchClient, SearchService, ServiceLocation};
pub use types::{CategoryFilter, SearchHit, SearchRequest, SearchResponse, DEFAULT_COLUMNS};
