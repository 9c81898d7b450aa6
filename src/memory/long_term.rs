//! JSON-file key/value memory that survives between sessions.

use crate::error::{AideError, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A stored value and when it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub value: Value,
    pub timestamp: String,
}

/// Persistent key/value memory. Every mutation is written to disk immediately.
#[derive(Debug)]
pub struct LongTermMemory {
    storage_path: PathBuf,
    memories: BTreeMap<String, MemoryEntry>,
}

impl LongTermMemory {
    /// Open the store at `storage_path`. A missing file starts an empty store.
    pub fn open(storage_path: impl Into<PathBuf>) -> Result<Self> {
        let mut memory = Self {
            storage_path: storage_path.into(),
            memories: BTreeMap::new(),
        };
        memory.load()?;
        Ok(memory)
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn store(&mut self, key: &str, value: Value) -> Result<()> {
        self.memories.insert(
            key.to_string(),
            MemoryEntry {
                value,
                timestamp: Utc::now().to_rfc3339(),
            },
        );
        debug!("Stored memory '{}'", key);
        self.save()
    }

    pub fn retrieve(&self, key: &str) -> Option<&Value> {
        self.memories.get(key).map(|entry| &entry.value)
    }

    pub fn all(&self) -> &BTreeMap<String, MemoryEntry> {
        &self.memories
    }

    /// Remove `key`. Returns false (without touching disk) if it was absent.
    pub fn delete(&mut self, key: &str) -> Result<bool> {
        if self.memories.remove(key).is_some() {
            self.save()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Write all memories to the storage file.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.storage_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.storage_path, serde_json::to_string_pretty(&self.memories)?)?;
        Ok(())
    }

    /// Reload memories from the storage file.
    pub fn load(&mut self) -> Result<()> {
        match std::fs::read_to_string(&self.storage_path) {
            Ok(content) => {
                self.memories = serde_json::from_str(&content).map_err(|e| {
                    AideError::Memory(format!(
                        "Invalid memory file {:?}: {}",
                        self.storage_path, e
                    ))
                })?;
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "Memory file {:?} not found. Starting with empty memory.",
                    self.storage_path
                );
                self.memories.clear();
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let memory = LongTermMemory::open(dir.path().join("memory.json")).unwrap();
        assert!(memory.all().is_empty());
    }

    #[test]
    fn test_store_persists_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");

        let mut memory = LongTermMemory::open(&path).unwrap();
        memory.store("favorite_color", json!("blue")).unwrap();
        memory.store("lucky_numbers", json!([3, 7])).unwrap();

        let reopened = LongTermMemory::open(&path).unwrap();
        assert_eq!(reopened.retrieve("favorite_color"), Some(&json!("blue")));
        assert_eq!(reopened.retrieve("lucky_numbers"), Some(&json!([3, 7])));
        assert!(reopened.all()["favorite_color"].timestamp.contains('T'));

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["favorite_color"]["value"], "blue");
    }

    #[test]
    fn test_delete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");

        let mut memory = LongTermMemory::open(&path).unwrap();
        memory.store("a", json!(1)).unwrap();

        assert!(memory.delete("a").unwrap());
        assert!(!memory.delete("a").unwrap());
        assert!(memory.retrieve("a").is_none());

        let reopened = LongTermMemory::open(&path).unwrap();
        assert!(reopened.all().is_empty());
    }

    #[test]
    fn test_delete_missing_key_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");

        let mut fresh = LongTermMemory::open(&path).unwrap();
        assert!(!fresh.delete("ghost").unwrap());
        assert!(!path.exists());

        let contents = r#"{"a": {"value": 1, "timestamp": "2024-01-01T00:00:00Z"}}"#;
        std::fs::write(&path, contents).unwrap();

        let mut memory = LongTermMemory::open(&path).unwrap();
        assert!(!memory.delete("ghost").unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), contents);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            LongTermMemory::open(&path),
            Err(AideError::Memory(_))
        ));
    }
}
