//! Single-message chat command.

use super::session::{print_response, ready_agent};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Send one message to the agent and show how it was answered.
pub async fn run_chat(message: &str, settings: &Settings) -> Result<()> {
    let agent = ready_agent(settings).await?;

    Output::user(message);
    let spinner = Output::spinner("Thinking...");
    let result = agent.run(message).await;
    spinner.finish_and_clear();

    match result {
        Ok(response) => {
            print_response(&response);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Agent failed: {}", e));
            Err(e.into())
        }
    }
}
