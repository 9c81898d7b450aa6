//! Retrieval-augmented question answering over the knowledge base.

pub mod context;
mod response;

pub use context::ContextBuilder;
pub use response::{RagEngine, RagResponse};

use crate::vector_store::SearchResult;
use serde::Serialize;

/// A retrieved chunk prepared for prompting and display.
#[derive(Debug, Clone, Serialize)]
pub struct ContextChunk {
    pub source_id: String,
    pub source_title: String,
    /// Position of the chunk within its source.
    pub chunk_order: i32,
    pub content: String,
    pub score: f32,
}

impl From<SearchResult> for ContextChunk {
    fn from(result: SearchResult) -> Self {
        Self {
            source_id: result.document.source_id,
            source_title: result.document.source_title,
            chunk_order: result.document.chunk_order,
            content: result.document.content,
            score: result.score,
        }
    }
}
