//! Tool-calling agent.
//!
//! The agent sends the conversation and the offered tool schemas to the chat
//! model, runs whatever tools the reply asks for, feeds the results back and
//! repeats until the model answers in plain text.

mod runner;
mod tools;

pub use runner::{Agent, AgentResponse, ToolCallRecord};
pub use tools::{parse_tool_call, ToolCall, ToolContext, BASIC_TOOLS, FULL_TOOLS};
