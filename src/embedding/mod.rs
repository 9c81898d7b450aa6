//! Embedding generation for the document knowledge base.

mod openai;

pub use openai::OpenAIEmbedder;

use crate::error::{AideError, Result};
use async_trait::async_trait;

/// Turns text into fixed-width vectors for similarity search.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed several texts. Output order matches input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text, typically a search query.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AideError::Embedding("Empty embedding response".to_string()))
    }

    /// Vector width produced by this embedder.
    fn dimensions(&self) -> usize;
}
