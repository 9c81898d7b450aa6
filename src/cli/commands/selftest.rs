//! Canned queries that exercise the agent end to end.

use super::session::{print_response, ready_agent};
use crate::agent::Agent;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

const TEST_QUERIES: [&str; 3] = [
    "What is 15 multiplied by 23?",
    "What's the weather like in Tokyo?",
    "What time is it now?",
];

pub async fn run_test(settings: &Settings) -> Result<()> {
    let agent = ready_agent(settings).await?;
    run_test_queries(&agent).await;
    Ok(())
}

/// Run every test query, reporting failures without stopping.
pub async fn run_test_queries(agent: &Agent) {
    Output::header("Running test queries");

    let mut failures = 0;
    for query in TEST_QUERIES {
        Output::user(query);
        match agent.run(query).await {
            Ok(response) => print_response(&response),
            Err(e) => {
                failures += 1;
                Output::error(&format!("Query failed: {}", e));
            }
        }
    }

    if failures == 0 {
        Output::success("All test queries completed.");
    } else {
        Output::warning(&format!(
            "{} of {} test queries failed.",
            failures,
            TEST_QUERIES.len()
        ));
    }
}
