//! Tool listing command.

use super::session::build_tools;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Print the tools the agent would be offered.
pub async fn run_tools(settings: &Settings) -> Result<()> {
    let tools = build_tools(settings).await?;
    print_tool_list(&tools.tool_names());
    Ok(())
}

pub fn print_tool_list(names: &[&str]) {
    Output::header(&format!("Available tools ({})", names.len()));
    for (i, name) in names.iter().enumerate() {
        Output::numbered(i + 1, name);
    }
}
