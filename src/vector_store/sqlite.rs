//! SQLite-based vector store implementation.
//!
//! Embeddings are stored as little-endian `f32` blobs and cosine similarity is
//! computed in Rust, which is plenty for a personal document collection.

use super::{cosine_similarity, rank, Document, IndexedSource, SearchResult, VectorStore};
use crate::error::{AideError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    source_id TEXT NOT NULL,
    source_title TEXT NOT NULL,
    content TEXT NOT NULL,
    embedding BLOB NOT NULL,
    chunk_order INTEGER NOT NULL,
    indexed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_source_id ON documents(source_id);
CREATE INDEX IF NOT EXISTS idx_documents_indexed_at ON documents(indexed_at);
"#;

const DOCUMENT_COLUMNS: &str =
    "id, source_id, source_title, content, embedding, chunk_order, indexed_at";

const SOURCE_SUMMARY: &str = r#"
SELECT source_id, MAX(source_title), COUNT(*) AS chunk_count,
       SUM(LENGTH(content)) AS total_chars, MAX(indexed_at) AS indexed_at
FROM documents
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Open (or create) a store at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| AideError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn parse_time(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn row_to_document(row: &Row<'_>) -> rusqlite::Result<Document> {
        let id_str: String = row.get(0)?;
        let embedding_bytes: Vec<u8> = row.get(4)?;
        let indexed_at: String = row.get(6)?;

        Ok(Document {
            id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
            source_id: row.get(1)?,
            source_title: row.get(2)?,
            content: row.get(3)?,
            embedding: Self::bytes_to_embedding(&embedding_bytes),
            chunk_order: row.get(5)?,
            indexed_at: Self::parse_time(&indexed_at),
        })
    }

    fn row_to_source(row: &Row<'_>) -> rusqlite::Result<IndexedSource> {
        let total_chars: i64 = row.get(3)?;
        let indexed_at: String = row.get(4)?;

        Ok(IndexedSource {
            source_id: row.get(0)?,
            source_title: row.get(1)?,
            chunk_count: row.get(2)?,
            total_chars: total_chars.max(0) as u64,
            indexed_at: Self::parse_time(&indexed_at),
        })
    }

    fn insert(conn: &Connection, doc: &Document) -> Result<()> {
        conn.execute(
            r#"
            INSERT OR REPLACE INTO documents
            (id, source_id, source_title, content, embedding, chunk_order, indexed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                doc.id.to_string(),
                doc.source_id,
                doc.source_title,
                doc.content,
                Self::embedding_to_bytes(&doc.embedding),
                doc.chunk_order,
                doc.indexed_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, doc))]
    async fn upsert(&self, doc: &Document) -> Result<()> {
        let conn = self.lock()?;
        Self::insert(&conn, doc)?;
        debug!("Upserted document {}", doc.id);
        Ok(())
    }

    #[instrument(skip(self, docs))]
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;
        for doc in docs {
            Self::insert(&tx, doc)?;
        }
        tx.commit()?;

        info!("Batch upserted {} documents", docs.len());
        Ok(docs.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        self.search_with_threshold(query_embedding, limit, f32::MIN).await
    }

    #[instrument(skip(self, query_embedding))]
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM documents", DOCUMENT_COLUMNS))?;

        let results: Vec<SearchResult> = stmt
            .query_map([], Self::row_to_document)?
            .filter_map(|doc| doc.ok())
            .map(|doc| SearchResult {
                score: cosine_similarity(query_embedding, &doc.embedding),
                document: doc,
            })
            .filter(|r| r.score >= min_score)
            .collect();

        let results = rank(results, limit);
        debug!("Found {} matching documents", results.len());
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn delete_by_source(&self, source_id: &str) -> Result<usize> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM documents WHERE source_id = ?1",
            params![source_id],
        )?;

        info!("Deleted {} documents for source {}", deleted, source_id);
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn list_sources(&self) -> Result<Vec<IndexedSource>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{} GROUP BY source_id ORDER BY indexed_at DESC",
            SOURCE_SUMMARY
        ))?;

        let sources = stmt
            .query_map([], Self::row_to_source)?
            .filter_map(|s| s.ok())
            .collect();
        Ok(sources)
    }

    #[instrument(skip(self))]
    async fn get_source(&self, source_id: &str) -> Result<Option<IndexedSource>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE source_id = ?1 GROUP BY source_id",
            SOURCE_SUMMARY
        ))?;

        match stmt.query_row(params![source_id], Self::row_to_source) {
            Ok(source) => Ok(Some(source)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn is_source_indexed(&self, source_id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE source_id = ?1",
            params![source_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    async fn get_by_source(&self, source_id: &str) -> Result<Vec<Document>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM documents WHERE source_id = ?1 ORDER BY chunk_order",
            DOCUMENT_COLUMNS
        ))?;

        let docs: Vec<Document> = stmt
            .query_map(params![source_id], Self::row_to_document)?
            .filter_map(|d| d.ok())
            .collect();

        debug!("Found {} documents for source {}", docs.len(), source_id);
        Ok(docs)
    }

    async fn document_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    async fn clear(&self) -> Result<usize> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM documents", [])?;
        info!("Cleared {} documents", deleted);
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_vector_store() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let doc = Document::new(
            "guide.md".to_string(),
            "Guide".to_string(),
            "This is test content".to_string(),
            vec![1.0, 0.0, 0.0],
            0,
        );

        store.upsert(&doc).await.unwrap();

        let sources = store.list_sources().await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].source_id, "guide.md");
        assert_eq!(sources[0].total_chars, 20);

        let results = store.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 0.001);
        assert_eq!(results[0].document.embedding, vec![1.0, 0.0, 0.0]);

        let deleted = store.delete_by_source("guide.md").await.unwrap();
        assert_eq!(deleted, 1);

        assert!(store.list_sources().await.unwrap().is_empty());
        assert!(store.get_source("guide.md").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index").join("knowledge.db");

        {
            let store = SqliteVectorStore::new(&path).unwrap();
            let docs = vec![
                Document::new("a.txt".into(), "a".into(), "second".into(), vec![0.0, 1.0], 1),
                Document::new("a.txt".into(), "a".into(), "first".into(), vec![1.0, 0.0], 0),
            ];
            assert_eq!(store.upsert_batch(&docs).await.unwrap(), 2);
        }

        let store = SqliteVectorStore::new(&path).unwrap();
        assert_eq!(store.document_count().await.unwrap(), 2);
        assert!(store.is_source_indexed("a.txt").await.unwrap());

        let chunks = store.get_by_source("a.txt").await.unwrap();
        assert_eq!(chunks[0].content, "first");
        assert_eq!(chunks[1].content, "second");

        let hits = store.search_with_threshold(&[1.0, 0.0], 5, 0.5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.content, "first");

        assert_eq!(store.clear().await.unwrap(), 2);
        assert_eq!(store.document_count().await.unwrap(), 0);
    }
}
