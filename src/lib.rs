//! Aide - a tool-calling assistant with memory and a document knowledge base.
//!
//! # Overview
//!
//! Aide sends a conversation and a set of tool schemas to an OpenAI-compatible
//! chat model, runs the tools the model asks for and feeds their results back
//! until the model answers. Around that loop it provides:
//!
//! - a toolkit of small utilities (math, text, JSON, time, URL checks)
//! - bounded conversation memory and a persistent key/value memory
//! - a local document index for retrieval-augmented answers
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `toolkit` - Pure tool functions
//! - `agent` - Tool schemas, dispatch and the tool-calling loop
//! - `memory` - Conversation and long-term memory
//! - `chunking` - Text splitting
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector storage and similarity search
//! - `knowledge` - Document loading and indexing
//! - `rag` - Question answering over the index
//! - `cli` - The `aide` command line and HTTP server
//!
//! # Example
//!
//! ```rust,no_run
//! use aide::agent::{Agent, ToolContext};
//! use aide::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let tools = ToolContext::new(settings.agent.toolset);
//!     let agent = Agent::from_settings(&settings, tools)?;
//!
//!     let response = agent.run("What is 42 multiplied by 7?").await?;
//!     for call in &response.tool_calls {
//!         println!("{} -> {}", call, call.result);
//!     }
//!     println!("{}", response.content);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod knowledge;
pub mod memory;
pub mod openai;
pub mod rag;
pub mod toolkit;
pub mod vector_store;

pub use error::{AideError, Result};
