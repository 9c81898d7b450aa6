//! OpenAI client configuration with sensible defaults.

use crate::config::Settings;
use crate::error::{AideError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for OpenAI API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create an OpenAI client from settings (API base and timeout).
pub fn create_client(settings: &Settings) -> Result<Client<OpenAIConfig>> {
    let timeout = match settings.openai.timeout_seconds {
        0 => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        secs => Duration::from_secs(secs),
    };
    create_client_with(settings.openai.api_base.as_deref(), timeout)
}

/// Create an OpenAI client with an optional API base and a custom timeout.
///
/// The API key is taken from `OPENAI_API_KEY`.
pub fn create_client_with(api_base: Option<&str>, timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AideError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let mut config = OpenAIConfig::default();
    if let Some(base) = api_base {
        config = config.with_api_base(base.trim_end_matches('/'));
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}

#[cfg(test)]
pub(crate) mod testing {
    //! Canned chat-completion bodies for mocked endpoints.

    use serde_json::{json, Value};

    /// A completion whose message is plain text.
    pub fn text_reply(content: &str) -> Value {
        completion(json!({"role": "assistant", "content": content}), "stop")
    }

    /// A completion requesting the given `(id, name, arguments)` tool calls.
    pub fn tool_reply(calls: &[(&str, &str, &str)]) -> Value {
        let tool_calls: Vec<Value> = calls
            .iter()
            .map(|(id, name, arguments)| {
                json!({
                    "id": id,
                    "type": "function",
                    "function": {"name": name, "arguments": arguments}
                })
            })
            .collect();

        completion(
            json!({"role": "assistant", "content": null, "tool_calls": tool_calls}),
            "tool_calls",
        )
    }

    fn completion(message: Value, finish_reason: &str) -> Value {
        json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": message,
                "finish_reason": finish_reason
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        })
    }
}
