//! Agent runner with tool calling loop.

use super::tools::{parse_tool_call, ToolContext};
use crate::config::{Prompts, Settings};
use crate::error::{AideError, Result};
use crate::memory::{ConversationMemory, MessageKind};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, instrument};

/// Default cap on model calls per request.
const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Agent that answers with the help of tools.
pub struct Agent {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    tools: ToolContext,
    max_iterations: usize,
    system_prompt: String,
    memory: ConversationMemory,
    ready: bool,
}

impl Agent {
    /// Build an agent from the `[agent]`, `[memory]` and `[prompts]` settings.
    pub fn from_settings(settings: &Settings, tools: ToolContext) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let system_prompt = prompts.agent_system(&tools.tool_names());

        Ok(Self {
            client: create_client(settings)?,
            model: settings.agent.model.clone(),
            temperature: settings.agent.temperature,
            tools,
            max_iterations: settings.agent.max_iterations,
            system_prompt,
            memory: ConversationMemory::new(settings.memory.max_messages),
            ready: Settings::api_key().is_some(),
        })
    }

    /// Create an agent around an explicit client.
    pub fn new(client: Client<OpenAIConfig>, tools: ToolContext, model: &str) -> Self {
        let system_prompt = Prompts::default().agent_system(&tools.tool_names());
        Self {
            client,
            model: model.to_string(),
            temperature: 0.0,
            tools,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            system_prompt,
            memory: ConversationMemory::default(),
            ready: true,
        }
    }

    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = prompt.to_string();
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_memory(mut self, memory: ConversationMemory) -> Self {
        self.memory = memory;
        self
    }

    /// Whether an API key was available when the agent was built.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.tool_names()
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut ConversationMemory {
        &mut self.memory
    }

    /// Answer a single task without conversation history.
    #[instrument(skip(self))]
    pub async fn run(&self, task: &str) -> Result<AgentResponse> {
        let messages = vec![self.system_message()?, user_message(task)?];
        self.run_loop(messages).await
    }

    /// Answer `input` in the context of the remembered conversation.
    ///
    /// The exchange is added to memory only when the run succeeds.
    #[instrument(skip(self))]
    pub async fn chat(&mut self, input: &str) -> Result<AgentResponse> {
        let mut messages = vec![self.system_message()?];
        for message in self.memory.messages() {
            messages.push(history_message(message.kind, &message.content)?);
        }
        messages.push(user_message(input)?);

        let response = self.run_loop(messages).await?;

        self.memory.add_human_message(input);
        self.memory.add_ai_message(response.content.clone());
        Ok(response)
    }

    async fn run_loop(
        &self,
        mut messages: Vec<ChatCompletionRequestMessage>,
    ) -> Result<AgentResponse> {
        let definitions = self.tools.definitions();
        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(AideError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Agent iteration {}", iterations);

            let mut request = CreateChatCompletionRequestArgs::default();
            request
                .model(&self.model)
                .messages(messages.clone())
                .temperature(self.temperature);
            if !definitions.is_empty() {
                request.tools(definitions.clone());
            }
            let request = request
                .build()
                .map_err(|e| AideError::Agent(e.to_string()))?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e| AideError::OpenAI(format!("Agent API error: {}", e)))?;

            let choice = response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| AideError::Agent("No response from model".to_string()))?;

            let tool_calls = match choice.message.tool_calls {
                Some(calls) if !calls.is_empty() => calls,
                _ => {
                    return Ok(AgentResponse {
                        content: choice.message.content.unwrap_or_default(),
                        tool_calls: tool_calls_made,
                        iterations,
                    });
                }
            };

            let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
                .tool_calls(tool_calls.clone())
                .build()
                .map_err(|e| AideError::Agent(e.to_string()))?;
            messages.push(assistant_msg.into());

            let records = join_all(tool_calls.iter().map(|call| self.execute_tool_call(call))).await;

            for (call, record) in tool_calls.iter().zip(records) {
                let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(&call.id)
                    .content(record.result.clone())
                    .build()
                    .map_err(|e| AideError::Agent(e.to_string()))?;
                messages.push(tool_msg.into());
                tool_calls_made.push(record);
            }
        }
    }

    /// Run one tool call. Failures become the result text so the model can react.
    async fn execute_tool_call(&self, tool_call: &ChatCompletionMessageToolCall) -> ToolCallRecord {
        let name = &tool_call.function.name;
        let arguments = &tool_call.function.arguments;

        info!("Agent calling tool: {} with args: {}", name, arguments);

        let result = match parse_tool_call(name, arguments) {
            Ok(tool) => match self.tools.execute(&tool).await {
                Ok(output) => output,
                Err(e) => format!("Tool error: {}", e),
            },
            Err(e) => format!("Tool error: {}", e),
        };

        ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result,
        }
    }

    fn system_message(&self) -> Result<ChatCompletionRequestMessage> {
        Ok(ChatCompletionRequestSystemMessageArgs::default()
            .content(self.system_prompt.clone())
            .build()
            .map_err(|e| AideError::Agent(e.to_string()))?
            .into())
    }
}

fn user_message(content: &str) -> Result<ChatCompletionRequestMessage> {
    Ok(ChatCompletionRequestUserMessageArgs::default()
        .content(content)
        .build()
        .map_err(|e| AideError::Agent(e.to_string()))?
        .into())
}

fn history_message(kind: MessageKind, content: &str) -> Result<ChatCompletionRequestMessage> {
    match kind {
        MessageKind::Human => user_message(content),
        MessageKind::Ai => Ok(ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| AideError::Agent(e.to_string()))?
            .into()),
        MessageKind::System => Ok(ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| AideError::Agent(e.to_string()))?
            .into()),
    }
}

/// Response from an agent run.
#[derive(Debug, Clone, Serialize)]
pub struct AgentResponse {
    /// Final answer text.
    pub content: String,
    /// Every tool call made, in order.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Model calls used.
    pub iterations: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCallRecord {
    pub name: String,
    /// Raw JSON arguments from the model.
    pub arguments: String,
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolSet;
    use crate::openai::create_client_with;
    use crate::openai::testing::{text_reply, tool_reply};
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn agent(server: &MockServer, toolset: ToolSet) -> Agent {
        let client = create_client_with(Some(&server.uri()), Duration::from_secs(5)).unwrap();
        Agent::new(client, ToolContext::new(toolset), "gpt-4o-mini")
    }

    #[test]
    fn test_tool_call_record_display() {
        let record = ToolCallRecord {
            name: "multiply".to_string(),
            arguments: r#"{"a": 42, "b": 7}"#.to_string(),
            result: "294".to_string(),
        };
        assert_eq!(format!("{}", record), r#"multiply({"a": 42, "b": 7})"#);
    }

    #[tokio::test]
    async fn test_run_without_tools() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("Hello!")))
            .mount(&server)
            .await;

        let response = agent(&server, ToolSet::Full).run("Say hello").await.unwrap();
        assert_eq!(response.content, "Hello!");
        assert!(response.tool_calls.is_empty());
        assert_eq!(response.iterations, 1);
    }

    #[tokio::test]
    async fn test_run_executes_tool_calls_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tool_reply(&[
                ("call_1", "add", r#"{"a": 15, "b": 28}"#),
                ("call_2", "multiply", r#"{"a": 43, "b": 3}"#),
                ("call_3", "teleport", "{}"),
            ])))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("call_3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("The answer is 129.")))
            .mount(&server)
            .await;

        let response = agent(&server, ToolSet::Basic)
            .run("What is 15 plus 28, and then multiply the result by 3?")
            .await
            .unwrap();

        assert_eq!(response.content, "The answer is 129.");
        assert_eq!(response.iterations, 2);
        let results: Vec<&str> = response.tool_calls.iter().map(|r| r.result.as_str()).collect();
        assert_eq!(results[0], "43");
        assert_eq!(results[1], "129");
        assert!(results[2].starts_with("Tool error: "));
    }

    #[tokio::test]
    async fn test_run_stops_at_max_iterations() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tool_reply(&[(
                "call_1",
                "get_current_time",
                "{}",
            )])))
            .mount(&server)
            .await;

        let result = agent(&server, ToolSet::Full)
            .with_max_iterations(2)
            .run("loop forever")
            .await;

        assert!(matches!(result, Err(AideError::Agent(_))));
    }

    #[tokio::test]
    async fn test_chat_remembers_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("My name is Sam"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("Your name is Sam.")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("Nice to meet you.")))
            .mount(&server)
            .await;

        let mut agent = agent(&server, ToolSet::Basic);
        agent.chat("Hi, I am Sam").await.unwrap();
        assert_eq!(agent.memory().len(), 2);

        agent.memory_mut().add_human_message("My name is Sam");
        let response = agent.chat("What is my name?").await.unwrap();
        assert_eq!(response.content, "Your name is Sam.");
        assert_eq!(agent.memory().len(), 5);
        assert_eq!(agent.memory().messages()[4].kind, MessageKind::Ai);
    }

    #[tokio::test]
    async fn test_failed_chat_leaves_memory_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut agent = agent(&server, ToolSet::Basic);
        assert!(agent.chat("hello").await.is_err());
        assert!(agent.memory().is_empty());
    }
}
