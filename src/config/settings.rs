//! Configuration settings for Aide.

use crate::error::{AideError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the OpenAI API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable overriding the OpenAI API base URL.
pub const API_BASE_ENV: &str = "OPENAI_API_BASE";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub openai: OpenAISettings,
    pub agent: AgentSettings,
    pub embedding: EmbeddingSettings,
    pub knowledge: KnowledgeSettings,
    pub memory: MemorySettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level used when no `-v` flag is given (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.aide".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// OpenAI endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAISettings {
    /// Alternate API base URL (e.g. a proxy or compatible server).
    pub api_base: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for OpenAISettings {
    fn default() -> Self {
        Self {
            api_base: None,
            timeout_seconds: 300,
        }
    }
}

/// Which group of tools the agent is offered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToolSet {
    /// add, multiply, search_wikipedia, get_weather.
    Basic,
    /// The full utility toolkit.
    #[default]
    Full,
}

impl std::str::FromStr for ToolSet {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" | "simple" => Ok(ToolSet::Basic),
            "full" | "all" => Ok(ToolSet::Full),
            _ => Err(format!("Unknown toolset: {}", s)),
        }
    }
}

impl std::fmt::Display for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolSet::Basic => write!(f, "basic"),
            ToolSet::Full => write!(f, "full"),
        }
    }
}

/// Agent behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Chat model used by the agent.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum model round-trips per request.
    pub max_iterations: usize,
    /// Tool group offered to the model.
    pub toolset: ToolSet,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            max_iterations: 10,
            toolset: ToolSet::Full,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Document knowledge base settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeSettings {
    /// SQLite file holding the persisted index.
    pub storage_path: String,
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of chunks retrieved per query.
    pub top_k: usize,
    /// Minimum similarity for a chunk to be used as context.
    pub min_score: f32,
    /// Model used to synthesize answers.
    pub model: String,
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self {
            storage_path: "~/.aide/knowledge.db".to_string(),
            chunk_size: 1024,
            chunk_overlap: 200,
            top_k: 4,
            min_score: 0.3,
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Conversation and long-term memory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySettings {
    /// Messages kept in conversation memory.
    pub max_messages: usize,
    /// JSON file for long-term key/value memory.
    pub long_term_path: String,
    /// JSON file used by `save` / `load` in interactive mode.
    pub conversation_path: String,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            max_messages: 100,
            long_term_path: "~/.aide/agent_memory.json".to_string(),
            conversation_path: "~/.aide/conversation.json".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// A `.env` file is read first so `OPENAI_API_KEY` and `OPENAI_API_BASE`
    /// can live next to the project.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        if let Ok(env_path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {:?}", env_path);
        }

        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Settings>(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env();
        Ok(settings)
    }

    /// Apply environment overrides.
    pub fn apply_env(&mut self) {
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            if !base.trim().is_empty() {
                self.openai.api_base = Some(base);
            }
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AideError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("aide")
            .join("config.toml")
    }

    /// The configured OpenAI API key, if any.
    pub fn api_key() -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded knowledge index path.
    pub fn knowledge_path(&self) -> PathBuf {
        Self::expand_path(&self.knowledge.storage_path)
    }

    /// Get the expanded long-term memory path.
    pub fn long_term_memory_path(&self) -> PathBuf {
        Self::expand_path(&self.memory.long_term_path)
    }

    /// Get the expanded conversation snapshot path.
    pub fn conversation_path(&self) -> PathBuf {
        Self::expand_path(&self.memory.conversation_path)
    }
}
