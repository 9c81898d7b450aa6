//! Command-line interface for Aide.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::config::ToolSet;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Aide - a tool-calling assistant with memory and a document knowledge base
#[derive(Parser, Debug)]
#[command(name = "aide")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Chat model used by the agent
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Sampling temperature for the agent
    #[arg(long, global = true)]
    pub temperature: Option<f32>,

    /// Tools offered to the agent (basic or full)
    #[arg(long, global = true)]
    pub toolset: Option<ToolSet>,

    /// Command to run (defaults to interactive)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a single message to the agent
    Chat {
        /// The message to send
        message: String,
    },

    /// Start an interactive session
    Interactive,

    /// List the tools offered to the agent
    Tools,

    /// Run a few canned queries against the agent
    Test,

    /// Demonstrate the basic toolset
    Demo,

    /// Index a directory of text and markdown documents
    Index {
        /// Directory to index
        dir: PathBuf,

        /// Re-index documents that are already indexed
        #[arg(short, long)]
        force: bool,
    },

    /// Ask a question answered from the knowledge base
    Ask {
        /// The question to ask
        question: String,
    },

    /// Search the knowledge base for relevant passages
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Minimum similarity score (0.0-1.0)
        #[arg(short, long)]
        min_score: Option<f32>,
    },

    /// List indexed sources
    Sources,

    /// Remove a source from the knowledge base
    Forget {
        /// Source id as shown by `aide sources`
        source_id: String,
    },

    /// Inspect or edit long-term memory
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },

    /// Check configuration and environment
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[derive(Subcommand, Debug)]
pub enum MemoryAction {
    /// List all stored keys
    List,

    /// Show the value stored under a key
    Get { key: String },

    /// Store a value (parsed as JSON when possible)
    Set { key: String, value: String },

    /// Delete a key
    Delete { key: String },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
