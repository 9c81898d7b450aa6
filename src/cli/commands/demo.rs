//! Demonstration of the basic toolset.

use super::session::{print_response, ready_agent};
use crate::cli::Output;
use crate::config::{Settings, ToolSet};
use anyhow::Result;

const DEMO_QUERIES: [&str; 4] = [
    "What is 42 multiplied by 7?",
    "What is 15 plus 28, and then multiply the result by 3?",
    "What's the weather like in London?",
    "Calculate 123 multiplied by 456",
];

/// Run the demo queries with the basic toolset, whatever is configured.
pub async fn run_demo(settings: &Settings) -> Result<()> {
    let mut settings = settings.clone();
    settings.agent.toolset = ToolSet::Basic;
    let agent = ready_agent(&settings).await?;

    Output::header("Basic toolset demo");
    for query in DEMO_QUERIES {
        Output::user(query);
        let spinner = Output::spinner("Thinking...");
        let result = agent.run(query).await;
        spinner.finish_and_clear();

        match result {
            Ok(response) => print_response(&response),
            Err(e) => Output::error(&format!("Query failed: {}", e)),
        }
    }

    Ok(())
}
