//! Bounded conversation history with JSON persistence.

use crate::error::{AideError, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Default number of messages retained.
pub const DEFAULT_MAX_MESSAGES: usize = 100;

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Human,
    Ai,
    System,
}

/// A remembered message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,
}

impl Message {
    pub fn new(kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

/// Counts describing the current memory contents.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummary {
    pub total_messages: usize,
    pub human_messages: usize,
    pub ai_messages: usize,
    pub system_messages: usize,
    pub memory_usage: String,
    pub metadata: HashMap<String, Value>,
}

/// On-disk snapshot format.
#[derive(Serialize)]
struct Snapshot<'a> {
    messages: &'a [Message],
    metadata: &'a HashMap<String, Value>,
    saved_at: String,
}

/// Loaded snapshot; message types are checked one by one so unknown
/// entries can be skipped.
#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    messages: Vec<RawMessage>,
    #[serde(default)]
    metadata: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct RawMessage {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    content: String,
}

/// Conversation history that keeps only the most recent messages.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    max_messages: usize,
    messages: Vec<Message>,
    metadata: HashMap<String, Value>,
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGES)
    }
}

impl ConversationMemory {
    /// Create an empty memory holding at most `max_messages` (minimum 1).
    pub fn new(max_messages: usize) -> Self {
        Self {
            max_messages: max_messages.max(1),
            messages: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// Append a message, dropping the oldest ones past the limit.
    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
        self.trim();
    }

    pub fn add_human_message(&mut self, content: impl Into<String>) {
        self.add_message(Message::new(MessageKind::Human, content));
    }

    pub fn add_ai_message(&mut self, content: impl Into<String>) {
        self.add_message(Message::new(MessageKind::Ai, content));
    }

    pub fn add_system_message(&mut self, content: impl Into<String>) {
        self.add_message(Message::new(MessageKind::System, content));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The last `n` messages, or all of them when fewer are stored.
    pub fn recent_messages(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Remove all messages and metadata.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.metadata.clear();
        info!("Conversation memory cleared");
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: Value) {
        self.metadata.insert(key.into(), value);
    }

    pub fn metadata(&self) -> &HashMap<String, Value> {
        &self.metadata
    }

    pub fn summary(&self) -> ConversationSummary {
        let count = |kind: MessageKind| self.messages.iter().filter(|m| m.kind == kind).count();

        ConversationSummary {
            total_messages: self.messages.len(),
            human_messages: count(MessageKind::Human),
            ai_messages: count(MessageKind::Ai),
            system_messages: count(MessageKind::System),
            memory_usage: format!("{}/{}", self.messages.len(), self.max_messages),
            metadata: self.metadata.clone(),
        }
    }

    /// Write the conversation to `path` as pretty JSON.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let snapshot = Snapshot {
            messages: &self.messages,
            metadata: &self.metadata,
            saved_at: Utc::now().to_rfc3339(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;

        info!("Conversation memory saved to {:?}", path);
        Ok(())
    }

    /// Replace the current contents with a snapshot read from `path`.
    pub fn load_from_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        let raw: RawSnapshot = serde_json::from_str(&content)
            .map_err(|e| AideError::Memory(format!("Invalid conversation file {:?}: {}", path, e)))?;

        self.messages = raw
            .messages
            .into_iter()
            .filter_map(|m| {
                let kind = match m.kind.as_str() {
                    "human" => MessageKind::Human,
                    "ai" => MessageKind::Ai,
                    "system" => MessageKind::System,
                    other => {
                        warn!("Skipping message with unknown type '{}'", other);
                        return None;
                    }
                };
                Some(Message::new(kind, m.content))
            })
            .collect();
        self.metadata = raw.metadata;
        self.trim();

        info!("Conversation memory loaded from {:?}", path);
        Ok(())
    }

    fn trim(&mut self) {
        if self.messages.len() > self.max_messages {
            let excess = self.messages.len() - self.max_messages;
            self.messages.drain(..excess);
        }
    }
}
