//! Document knowledge base: loading, chunking, embedding and indexing.
//!
//! The persisted index lives in a SQLite file at `knowledge.storage_path`,
//! so a built index is simply reopened on the next run.

mod loader;

pub use loader::{load_documents, SourceDocument};

use crate::chunking::TextChunker;
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{AideError, Result};
use crate::vector_store::{Document, IndexedSource, SearchResult, SqliteVectorStore, VectorStore};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

/// Summary of an indexing run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexReport {
    /// Documents found on disk.
    pub documents_found: usize,
    /// Documents (re)indexed in this run.
    pub documents_indexed: usize,
    /// Documents skipped because they were already indexed.
    pub documents_skipped: usize,
    /// Chunks written to the store.
    pub chunks_indexed: usize,
}

/// Vector index over a document collection.
pub struct KnowledgeBase {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    chunker: TextChunker,
}

impl KnowledgeBase {
    /// Open the persisted index described by `settings`.
    pub fn open(settings: &Settings) -> Result<Self> {
        let embedder = Arc::new(OpenAIEmbedder::from_settings(settings)?);
        let store = Arc::new(SqliteVectorStore::new(&settings.knowledge_path())?);
        let chunker = TextChunker::new(
            settings.knowledge.chunk_size,
            settings.knowledge.chunk_overlap,
        );
        Ok(Self::with_components(embedder, store, chunker))
    }

    /// Create a knowledge base from explicit components.
    pub fn with_components(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        chunker: TextChunker,
    ) -> Self {
        Self {
            embedder,
            store,
            chunker,
        }
    }

    pub fn vector_store(&self) -> Arc<dyn VectorStore> {
        self.store.clone()
    }

    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.embedder.clone()
    }

    /// Index every text document under `dir`.
    ///
    /// Sources already in the index are skipped unless `force` is set.
    #[instrument(skip(self))]
    pub async fn build_index(&self, dir: &Path, force: bool) -> Result<IndexReport> {
        let documents = load_documents(dir)?;
        let mut report = IndexReport {
            documents_found: documents.len(),
            ..Default::default()
        };

        let mut pending = Vec::new();
        for doc in documents {
            if !force && self.store.is_source_indexed(&doc.id).await? {
                info!("{} is already indexed, skipping", doc.id);
                report.documents_skipped += 1;
            } else {
                pending.push(doc);
            }
        }

        report.documents_indexed = pending.len();
        report.chunks_indexed = self.add_documents(&pending).await?;

        info!(
            "Indexed {} documents ({} chunks), skipped {}",
            report.documents_indexed, report.chunks_indexed, report.documents_skipped
        );
        Ok(report)
    }

    /// Chunk, embed and store documents, replacing any earlier chunks of the
    /// same sources. Returns the number of chunks written.
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    pub async fn add_documents(&self, documents: &[SourceDocument]) -> Result<usize> {
        let mut pieces = Vec::new();
        for doc in documents {
            for chunk in self.chunker.split(&doc.text) {
                pieces.push((doc, chunk));
            }
        }

        let texts: Vec<String> = pieces.iter().map(|(_, c)| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != pieces.len() {
            return Err(AideError::Embedding(format!(
                "Expected {} embeddings, got {}",
                pieces.len(),
                embeddings.len()
            )));
        }

        // Old chunks go only once the new ones are embedded.
        for doc in documents {
            self.store.delete_by_source(&doc.id).await?;
        }
        if pieces.is_empty() {
            return Ok(0);
        }

        let records: Vec<Document> = pieces
            .into_iter()
            .zip(embeddings)
            .map(|((doc, chunk), embedding)| {
                Document::new(
                    doc.id.clone(),
                    doc.title.clone(),
                    chunk.content,
                    embedding,
                    chunk.order,
                )
            })
            .collect();

        self.store.upsert_batch(&records).await
    }

    /// The `k` chunks most similar to `query`.
    #[instrument(skip(self))]
    pub async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        let embedding = self.embedder.embed(query).await?;
        self.store.search(&embedding, k).await
    }

    pub async fn list_sources(&self) -> Result<Vec<IndexedSource>> {
        self.store.list_sources().await
    }

    /// Remove a source from the index. Returns the number of chunks deleted.
    pub async fn delete_source(&self, source_id: &str) -> Result<usize> {
        self.store.delete_by_source(source_id).await
    }

    pub async fn clear(&self) -> Result<usize> {
        self.store.clear().await
    }

    pub async fn document_count(&self) -> Result<usize> {
        self.store.document_count().await
    }
}
