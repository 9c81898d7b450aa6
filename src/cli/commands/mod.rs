//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod demo;
mod doctor;
mod index;
mod interactive;
mod memory;
mod search;
mod selftest;
mod serve;
mod session;
mod sources;
mod tools;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use demo::run_demo;
pub use doctor::run_doctor;
pub use index::run_index;
pub use interactive::run_interactive;
pub use memory::run_memory;
pub use search::run_search;
pub use selftest::run_test;
pub use serve::run_serve;
pub use sources::{run_forget, run_sources};
pub use tools::run_tools;
