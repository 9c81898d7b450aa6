//! Interactive session: a REPL around [`Agent::chat`].

use super::selftest::run_test_queries;
use super::session::{print_response, ready_agent};
use super::tools::print_tool_list;
use crate::agent::Agent;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// A line typed at the prompt.
#[derive(Debug, PartialEq)]
enum ReplCommand<'a> {
    Empty,
    Quit,
    Help,
    Tools,
    Test,
    Clear,
    Memory,
    Save,
    Load,
    Message(&'a str),
}

impl<'a> ReplCommand<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line.to_lowercase().as_str() {
            "" => ReplCommand::Empty,
            "quit" | "exit" | "q" => ReplCommand::Quit,
            "help" => ReplCommand::Help,
            "tools" => ReplCommand::Tools,
            "test" => ReplCommand::Test,
            "clear" => ReplCommand::Clear,
            "memory" => ReplCommand::Memory,
            "save" => ReplCommand::Save,
            "load" => ReplCommand::Load,
            _ => ReplCommand::Message(line),
        }
    }
}

pub async fn run_interactive(settings: &Settings) -> Result<()> {
    let mut agent = ready_agent(settings).await?;
    let conversation_path = settings.conversation_path();

    println!(
        "{}\n",
        style("Type a message, 'help' for commands, or 'quit' to leave.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            println!();
            break;
        }

        match ReplCommand::parse(&input) {
            ReplCommand::Empty => continue,
            ReplCommand::Quit => {
                Output::info("Goodbye!");
                break;
            }
            ReplCommand::Help => print_help(),
            ReplCommand::Tools => print_tool_list(&agent.tool_names()),
            ReplCommand::Test => run_test_queries(&agent).await,
            ReplCommand::Clear => {
                agent.memory_mut().clear();
                Output::info("Conversation memory cleared.");
            }
            ReplCommand::Memory => print_memory_summary(&agent),
            ReplCommand::Save => match agent.memory().save_to_file(&conversation_path) {
                Ok(()) => Output::success(&format!("Saved to {}", conversation_path.display())),
                Err(e) => Output::error(&format!("Save failed: {}", e)),
            },
            ReplCommand::Load => match agent.memory_mut().load_from_file(&conversation_path) {
                Ok(()) => Output::success(&format!(
                    "Loaded {} messages from {}",
                    agent.memory().len(),
                    conversation_path.display()
                )),
                Err(e) => Output::error(&format!("Load failed: {}", e)),
            },
            ReplCommand::Message(message) => {
                let spinner = Output::spinner("Thinking...");
                let result = agent.chat(message).await;
                spinner.finish_and_clear();

                match result {
                    Ok(response) => print_response(&response),
                    Err(e) => Output::error(&format!("Error: {}", e)),
                }
            }
        }
    }

    Ok(())
}

fn print_help() {
    Output::header("Commands");
    Output::kv("help", "show this help");
    Output::kv("tools", "list available tools");
    Output::kv("test", "run the test queries");
    Output::kv("clear", "clear conversation memory");
    Output::kv("memory", "show conversation memory summary");
    Output::kv("save", "save the conversation to disk");
    Output::kv("load", "load the saved conversation");
    Output::kv("quit", "leave (also exit, q)");
}

fn print_memory_summary(agent: &Agent) {
    let summary = agent.memory().summary();
    Output::header("Conversation memory");
    Output::kv("Messages", &summary.memory_usage);
    Output::kv("Human", &summary.human_messages.to_string());
    Output::kv("AI", &summary.ai_messages.to_string());
    Output::kv("System", &summary.system_messages.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ReplCommand::parse("  \n"), ReplCommand::Empty);
        assert_eq!(ReplCommand::parse("Q"), ReplCommand::Quit);
        assert_eq!(ReplCommand::parse("exit\n"), ReplCommand::Quit);
        assert_eq!(ReplCommand::parse("memory"), ReplCommand::Memory);
        assert_eq!(
            ReplCommand::parse(" What is 2 + 2? \n"),
            ReplCommand::Message("What is 2 + 2?")
        );
    }
}
