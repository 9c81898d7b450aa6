//! Conversation and long-term memory.

mod conversation;
mod long_term;

pub use conversation::{
    ConversationMemory, ConversationSummary, Message, MessageKind, DEFAULT_MAX_MESSAGES,
};
pub use long_term::{LongTermMemory, MemoryEntry};
