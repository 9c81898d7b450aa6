//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets.

use super::{cosine_similarity, rank, Document, IndexedSource, SearchResult, VectorStore};
use crate::error::{AideError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory vector store.
#[derive(Default)]
pub struct MemoryVectorStore {
    documents: RwLock<HashMap<String, Document>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Document>>> {
        self.documents
            .read()
            .map_err(|e| AideError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Document>>> {
        self.documents
            .write()
            .map_err(|e| AideError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(&self, doc: &Document) -> Result<()> {
        self.write()?.insert(doc.id.to_string(), doc.clone());
        Ok(())
    }

    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let mut store = self.write()?;
        for doc in docs {
            store.insert(doc.id.to_string(), doc.clone());
        }
        Ok(docs.len())
    }

    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        self.search_with_threshold(query_embedding, limit, f32::MIN).await
    }

    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let docs = self.read()?;

        let results: Vec<SearchResult> = docs
            .values()
            .map(|doc| SearchResult {
                score: cosine_similarity(query_embedding, &doc.embedding),
                document: doc.clone(),
            })
            .filter(|r| r.score >= min_score)
            .collect();

        Ok(rank(results, limit))
    }

    async fn delete_by_source(&self, source_id: &str) -> Result<usize> {
        let mut docs = self.write()?;
        let initial_len = docs.len();
        docs.retain(|_, doc| doc.source_id != source_id);
        Ok(initial_len - docs.len())
    }

    async fn list_sources(&self) -> Result<Vec<IndexedSource>> {
        let docs = self.read()?;

        let mut sources: HashMap<String, IndexedSource> = HashMap::new();
        for doc in docs.values() {
            let entry = sources
                .entry(doc.source_id.clone())
                .or_insert_with(|| IndexedSource {
                    source_id: doc.source_id.clone(),
                    source_title: doc.source_title.clone(),
                    chunk_count: 0,
                    total_chars: 0,
                    indexed_at: doc.indexed_at,
                });

            entry.chunk_count += 1;
            entry.total_chars += doc.content.chars().count() as u64;
            if doc.indexed_at > entry.indexed_at {
                entry.indexed_at = doc.indexed_at;
            }
        }

        let mut sources: Vec<IndexedSource> = sources.into_values().collect();
        sources.sort_by(|a, b| b.indexed_at.cmp(&a.indexed_at));
        Ok(sources)
    }

    async fn get_source(&self, source_id: &str) -> Result<Option<IndexedSource>> {
        let sources = self.list_sources().await?;
        Ok(sources.into_iter().find(|s| s.source_id == source_id))
    }

    async fn is_source_indexed(&self, source_id: &str) -> Result<bool> {
        Ok(self.read()?.values().any(|d| d.source_id == source_id))
    }

    async fn get_by_source(&self, source_id: &str) -> Result<Vec<Document>> {
        let mut result: Vec<Document> = self
            .read()?
            .values()
            .filter(|d| d.source_id == source_id)
            .cloned()
            .collect();
        result.sort_by_key(|d| d.chunk_order);
        Ok(result)
    }

    async fn document_count(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    async fn clear(&self) -> Result<usize> {
        let mut docs = self.write()?;
        let count = docs.len();
        docs.clear();
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(source: &str, content: &str, embedding: Vec<f32>, order: i32) -> Document {
        Document::new(
            source.to_string(),
            format!("{} title", source),
            content.to_string(),
            embedding,
            order,
        )
    }

    #[tokio::test]
    async fn test_memory_vector_store() {
        let store = MemoryVectorStore::new();

        store
            .upsert_batch(&[
                doc("notes.md", "Hello world", vec![1.0, 0.0, 0.0], 0),
                doc("notes.md", "Goodbye world", vec![0.0, 1.0, 0.0], 1),
            ])
            .await
            .unwrap();

        assert_eq!(store.document_count().await.unwrap(), 2);

        let results = store.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].score > results[1].score);

        let sources = store.list_sources().await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].chunk_count, 2);
        assert_eq!(sources[0].total_chars, 24);
    }

    #[tokio::test]
    async fn test_threshold_and_delete() {
        let store = MemoryVectorStore::new();
        store
            .upsert_batch(&[
                doc("a.txt", "alpha", vec![1.0, 0.0], 1),
                doc("a.txt", "alpha again", vec![0.9, 0.1], 0),
                doc("b.txt", "beta", vec![0.0, 1.0], 0),
            ])
            .await
            .unwrap();

        let results = store.search_with_threshold(&[1.0, 0.0], 10, 0.5).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.document.source_id == "a.txt"));

        let chunks = store.get_by_source("a.txt").await.unwrap();
        assert_eq!(chunks[0].content, "alpha again");

        assert_eq!(store.delete_by_source("a.txt").await.unwrap(), 2);
        assert!(!store.is_source_indexed("a.txt").await.unwrap());
        assert!(store.get_source("b.txt").await.unwrap().is_some());
        assert_eq!(store.clear().await.unwrap(), 1);
    }
}
