//! Long-term memory command.

use crate::cli::{MemoryAction, Output};
use crate::config::Settings;
use crate::memory::LongTermMemory;
use anyhow::Result;
use serde_json::Value;

pub fn run_memory(action: &MemoryAction, settings: &Settings) -> Result<()> {
    let mut memory = LongTermMemory::open(settings.long_term_memory_path())?;

    match action {
        MemoryAction::List => {
            if memory.all().is_empty() {
                Output::info("Long-term memory is empty.");
            } else {
                Output::header(&format!("Long-term memory ({})", memory.all().len()));
                for (key, entry) in memory.all() {
                    Output::kv(key, &format!("{} ({})", entry.value, entry.timestamp));
                }
            }
        }

        MemoryAction::Get { key } => match memory.retrieve(key) {
            Some(value) => println!("{}", serde_json::to_string_pretty(value)?),
            None => Output::warning(&format!("No memory stored under '{}'", key)),
        },

        MemoryAction::Set { key, value } => {
            memory.store(key, parse_value(value))?;
            Output::success(&format!("Stored '{}'", key));
        }

        MemoryAction::Delete { key } => {
            if memory.delete(key)? {
                Output::success(&format!("Deleted '{}'", key));
            } else {
                Output::warning(&format!("No memory stored under '{}'", key));
            }
        }
    }

    Ok(())
}

/// JSON when the text parses as JSON, otherwise a plain string.
fn parse_value(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("42"), json!(42));
        assert_eq!(parse_value(r#"{"a": [1]}"#), json!({"a": [1]}));
        assert_eq!(parse_value("blue"), json!("blue"));
    }
}
