//! Reading source documents from disk.

use crate::error::{AideError, Result};
use std::path::Path;
use tracing::{debug, warn};

/// File extensions treated as indexable text.
const TEXT_EXTENSIONS: [&str; 3] = ["txt", "md", "markdown"];

/// A document read from disk, before chunking.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    /// Path relative to the indexed directory, with `/` separators.
    pub id: String,
    /// Display title: the first markdown heading, or the file stem.
    pub title: String,
    /// Full text.
    pub text: String,
}

impl SourceDocument {
    pub fn new(id: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            text: text.into(),
        }
    }
}

/// Recursively load every text document under `dir`, sorted by id.
///
/// Unreadable files are skipped with a warning. A missing directory, or one
/// without any text documents, is an error.
pub fn load_documents(dir: &Path) -> Result<Vec<SourceDocument>> {
    if !dir.is_dir() {
        return Err(AideError::Knowledge(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let mut documents = Vec::new();
    visit(dir, dir, &mut documents)?;
    documents.sort_by(|a, b| a.id.cmp(&b.id));

    if documents.is_empty() {
        return Err(AideError::Knowledge(format!(
            "No .txt or .md documents found in {}",
            dir.display()
        )));
    }

    debug!("Loaded {} documents from {:?}", documents.len(), dir);
    Ok(documents)
}

fn visit(root: &Path, dir: &Path, documents: &mut Vec<SourceDocument>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'))
        {
            continue;
        }

        if path.is_dir() {
            visit(root, &path, documents)?;
            continue;
        }

        let is_text = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| TEXT_EXTENSIONS.contains(&e.to_lowercase().as_str()));
        if !is_text {
            continue;
        }

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping unreadable document {:?}: {}", path, e);
                continue;
            }
        };

        let id = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| id.clone());

        documents.push(SourceDocument {
            title: document_title(&text).unwrap_or(stem),
            id,
            text,
        });
    }

    Ok(())
}

/// The first markdown heading, if the document starts with one.
fn document_title(text: &str) -> Option<String> {
    let first = text.lines().find(|line| !line.trim().is_empty())?;
    let heading = first.trim().strip_prefix('#')?;
    let title = heading.trim_start_matches('#').trim();
    (!title.is_empty()).then(|| title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_documents_recursively() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "plain text").unwrap();
        std::fs::create_dir(dir.path().join("guides")).unwrap();
        std::fs::write(dir.path().join("guides").join("a.md"), "# Setup Guide\n\nSteps.").unwrap();
        std::fs::write(dir.path().join("image.png"), [0u8, 1, 2]).unwrap();
        std::fs::write(dir.path().join(".hidden.md"), "secret").unwrap();

        let docs = load_documents(dir.path()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "b.txt");
        assert_eq!(docs[0].title, "b");
        assert_eq!(docs[1].id, "guides/a.md");
        assert_eq!(docs[1].title, "Setup Guide");
    }

    #[test]
    fn test_empty_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_documents(dir.path()).is_err());
        assert!(load_documents(&dir.path().join("missing")).is_err());
    }
}
