//! Configuration module for Aide.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AgentPrompts, KnowledgePrompts, Prompts};
pub use settings::{
    AgentSettings, EmbeddingSettings, GeneralSettings, KnowledgeSettings, MemorySettings,
    OpenAISettings, PromptSettings, Settings, ToolSet, API_BASE_ENV, API_KEY_ENV,
};
