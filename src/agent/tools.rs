//! Tool schemas, argument parsing and dispatch for the agent.

use crate::config::ToolSet;
use crate::error::{AideError, Result};
use crate::memory::LongTermMemory;
use crate::rag::RagEngine;
use crate::toolkit::{
    advanced_calculator, analyze_text, calculator, check_url, current_time, fixed_weather,
    format_number, list_operation, string_operation, validate_json, weather_report,
    wikipedia_brief, wikipedia_mock,
};
use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// Tools offered by the basic toolset.
pub const BASIC_TOOLS: [&str; 4] = ["add", "multiply", "search_wikipedia", "get_weather"];

/// Tools offered by the full toolset.
pub const FULL_TOOLS: [&str; 10] = [
    "calculator",
    "advanced_calculator",
    "get_current_time",
    "get_weather_mock",
    "search_wikipedia_mock",
    "text_analyzer",
    "url_checker",
    "json_validator",
    "list_operations",
    "string_operations",
];

const KNOWLEDGE_TOOL: &str = "query_knowledge_base";
const MEMORY_TOOLS: [&str; 2] = ["store_memory", "retrieve_memory"];

/// A parsed tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    Add {
        #[serde(deserialize_with = "whole_number")]
        a: i64,
        #[serde(deserialize_with = "whole_number")]
        b: i64,
    },
    Multiply {
        #[serde(deserialize_with = "whole_number")]
        a: i64,
        #[serde(deserialize_with = "whole_number")]
        b: i64,
    },
    SearchWikipedia {
        query: String,
    },
    GetWeather {
        location: String,
        #[serde(default = "default_unit")]
        unit: String,
    },

    Calculator {
        operation: String,
        a: f64,
        b: f64,
    },
    AdvancedCalculator {
        expression: String,
    },
    GetCurrentTime,
    GetWeatherMock {
        location: String,
        #[serde(default = "default_unit")]
        unit: String,
    },
    SearchWikipediaMock {
        query: String,
    },
    TextAnalyzer {
        text: String,
    },
    UrlChecker {
        url: String,
    },
    JsonValidator {
        json_string: String,
    },
    ListOperations {
        operation: String,
        items: Vec<String>,
        #[serde(default)]
        filter_keyword: String,
    },
    StringOperations {
        operation: String,
        text: String,
        #[serde(default)]
        old_text: String,
        #[serde(default)]
        new_text: String,
    },

    QueryKnowledgeBase {
        query: String,
    },
    StoreMemory {
        key: String,
        value: Value,
    },
    RetrieveMemory {
        key: String,
    },
}

fn default_unit() -> String {
    "celsius".to_string()
}

impl ToolCall {
    /// The wire name of the tool.
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::Add { .. } => "add",
            ToolCall::Multiply { .. } => "multiply",
            ToolCall::SearchWikipedia { .. } => "search_wikipedia",
            ToolCall::GetWeather { .. } => "get_weather",
            ToolCall::Calculator { .. } => "calculator",
            ToolCall::AdvancedCalculator { .. } => "advanced_calculator",
            ToolCall::GetCurrentTime => "get_current_time",
            ToolCall::GetWeatherMock { .. } => "get_weather_mock",
            ToolCall::SearchWikipediaMock { .. } => "search_wikipedia_mock",
            ToolCall::TextAnalyzer { .. } => "text_analyzer",
            ToolCall::UrlChecker { .. } => "url_checker",
            ToolCall::JsonValidator { .. } => "json_validator",
            ToolCall::ListOperations { .. } => "list_operations",
            ToolCall::StringOperations { .. } => "string_operations",
            ToolCall::QueryKnowledgeBase { .. } => KNOWLEDGE_TOOL,
            ToolCall::StoreMemory { .. } => MEMORY_TOOLS[0],
            ToolCall::RetrieveMemory { .. } => MEMORY_TOOLS[1],
        }
    }
}

/// Integers, or floats with no fractional part such as `15.0`.
fn whole_number<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(n) = number.as_i64() {
        return Ok(n);
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
        _ => Err(de::Error::custom(format!("expected an integer, got {}", number))),
    }
}

fn is_known_tool(name: &str) -> bool {
    BASIC_TOOLS.contains(&name)
        || FULL_TOOLS.contains(&name)
        || MEMORY_TOOLS.contains(&name)
        || name == KNOWLEDGE_TOOL
}

/// Parse a tool call from the name and JSON arguments sent by the model.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    if !is_known_tool(name) {
        return Err(AideError::Tool(format!("Unknown tool: {}", name)));
    }

    let mut args = if arguments.trim().is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_str(arguments)
            .map_err(|e| AideError::InvalidInput(format!("Invalid tool arguments: {}", e)))?
    };

    let fields = args.as_object_mut().ok_or_else(|| {
        AideError::InvalidInput(format!("Arguments for {} must be a JSON object", name))
    })?;
    fields.insert("name".to_string(), Value::String(name.to_string()));

    serde_json::from_value(args)
        .map_err(|e| AideError::InvalidInput(format!("Invalid arguments for {}: {}", name, e)))
}

/// Everything tool execution needs beyond the arguments themselves.
pub struct ToolContext {
    toolset: ToolSet,
    http: reqwest::Client,
    knowledge: Option<Arc<RagEngine>>,
    long_term: Option<Arc<Mutex<LongTermMemory>>>,
}

impl ToolContext {
    pub fn new(toolset: ToolSet) -> Self {
        Self {
            toolset,
            http: reqwest::Client::new(),
            knowledge: None,
            long_term: None,
        }
    }

    /// Offer `query_knowledge_base`, answered by `engine`.
    pub fn with_knowledge(mut self, engine: Arc<RagEngine>) -> Self {
        self.knowledge = Some(engine);
        self
    }

    /// Offer `store_memory` and `retrieve_memory`, backed by `memory`.
    pub fn with_long_term_memory(mut self, memory: Arc<Mutex<LongTermMemory>>) -> Self {
        self.long_term = Some(memory);
        self
    }

    pub fn toolset(&self) -> ToolSet {
        self.toolset
    }

    /// Names of every tool currently offered, in schema order.
    pub fn tool_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = match self.toolset {
            ToolSet::Basic => BASIC_TOOLS.to_vec(),
            ToolSet::Full => FULL_TOOLS.to_vec(),
        };
        if self.knowledge.is_some() {
            names.push(KNOWLEDGE_TOOL);
        }
        if self.long_term.is_some() {
            names.extend(MEMORY_TOOLS);
        }
        names
    }

    /// OpenAI function schemas for the offered tools.
    pub fn definitions(&self) -> Vec<ChatCompletionTool> {
        self.tool_names()
            .into_iter()
            .filter_map(|name| {
                schema(name).map(|(description, parameters)| ChatCompletionTool {
                    r#type: ChatCompletionToolType::Function,
                    function: FunctionObject {
                        name: name.to_string(),
                        description: Some(description.to_string()),
                        parameters: Some(parameters),
                        strict: None,
                    },
                })
            })
            .collect()
    }

    /// Run a tool and return its result as text.
    ///
    /// Structured results are serialized to JSON.
    #[instrument(skip(self), fields(tool = tool.name()))]
    pub async fn execute(&self, tool: &ToolCall) -> Result<String> {
        if !self.tool_names().contains(&tool.name()) {
            return Err(AideError::Tool(format!(
                "Tool '{}' is not available",
                tool.name()
            )));
        }

        let output = match tool {
            ToolCall::Add { a, b } => a
                .checked_add(*b)
                .ok_or_else(|| AideError::Tool("Integer overflow".to_string()))?
                .to_string(),
            ToolCall::Multiply { a, b } => a
                .checked_mul(*b)
                .ok_or_else(|| AideError::Tool("Integer overflow".to_string()))?
                .to_string(),
            ToolCall::SearchWikipedia { query } => wikipedia_brief(query),
            ToolCall::GetWeather { location, unit } => fixed_weather(location, unit),

            ToolCall::Calculator { operation, a, b } => format_number(calculator(operation, *a, *b)),
            ToolCall::AdvancedCalculator { expression } => {
                format_number(advanced_calculator(expression))
            }
            ToolCall::GetCurrentTime => current_time(),
            ToolCall::GetWeatherMock { location, unit } => {
                let mut rng = rand::rng();
                weather_report(location, unit, &mut rng)
            }
            ToolCall::SearchWikipediaMock { query } => wikipedia_mock(query),
            ToolCall::TextAnalyzer { text } => serde_json::to_string(&analyze_text(text))?,
            ToolCall::UrlChecker { url } => {
                serde_json::to_string(&check_url(&self.http, url).await)?
            }
            ToolCall::JsonValidator { json_string } => {
                serde_json::to_string(&validate_json(json_string))?
            }
            ToolCall::ListOperations {
                operation,
                items,
                filter_keyword,
            } => serde_json::to_string(&list_operation(operation, items, filter_keyword))?,
            ToolCall::StringOperations {
                operation,
                text,
                old_text,
                new_text,
            } => string_operation(operation, text, old_text, new_text),

            ToolCall::QueryKnowledgeBase { query } => self.query_knowledge(query).await?,
            ToolCall::StoreMemory { key, value } => {
                let memory = self.long_term_memory()?;
                memory.lock().await.store(key, value.clone())?;
                format!("Stored memory '{}'", key)
            }
            ToolCall::RetrieveMemory { key } => {
                let memory = self.long_term_memory()?;
                let guard = memory.lock().await;
                match guard.retrieve(key) {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => format!("No memory found for key '{}'", key),
                }
            }
        };

        debug!("{} returned {} chars", tool.name(), output.len());
        Ok(output)
    }

    async fn query_knowledge(&self, query: &str) -> Result<String> {
        let engine = self
            .knowledge
            .as_ref()
            .ok_or_else(|| AideError::Tool("No knowledge base attached".to_string()))?;
        Ok(engine.ask(query).await?.format_for_tool())
    }

    fn long_term_memory(&self) -> Result<&Arc<Mutex<LongTermMemory>>> {
        self.long_term
            .as_ref()
            .ok_or_else(|| AideError::Tool("No long-term memory attached".to_string()))
    }
}

/// Description and JSON parameter schema for a tool.
fn schema(name: &str) -> Option<(&'static str, Value)> {
    let two_integers = json!({
        "type": "object",
        "properties": {
            "a": {"type": "integer", "description": "First number"},
            "b": {"type": "integer", "description": "Second number"}
        },
        "required": ["a", "b"]
    });
    let weather = json!({
        "type": "object",
        "properties": {
            "location": {"type": "string", "description": "The city or location name"},
            "unit": {
                "type": "string",
                "description": "Temperature unit (celsius or fahrenheit)",
                "default": "celsius"
            }
        },
        "required": ["location"]
    });
    let query = |description: &str| {
        json!({
            "type": "object",
            "properties": {"query": {"type": "string", "description": description}},
            "required": ["query"]
        })
    };

    let entry = match name {
        "add" => ("Add two numbers together.", two_integers),
        "multiply" => ("Multiply two numbers together.", two_integers),
        "search_wikipedia" => (
            "Search Wikipedia for information about a topic.",
            query("The search query"),
        ),
        "get_weather" => ("Get the current weather for a location.", weather),
        "calculator" => (
            "Perform basic mathematical operations.",
            json!({
                "type": "object",
                "properties": {
                    "operation": {
                        "type": "string",
                        "enum": ["add", "subtract", "multiply", "divide", "power", "modulo"]
                    },
                    "a": {"type": "number", "description": "First number"},
                    "b": {"type": "number", "description": "Second number"}
                },
                "required": ["operation", "a", "b"]
            }),
        ),
        "advanced_calculator" => (
            "Evaluate a mathematical expression such as \"2 + 3 * 4\". Supports + - * / // ** and parentheses.",
            json!({
                "type": "object",
                "properties": {
                    "expression": {"type": "string", "description": "Expression to evaluate"}
                },
                "required": ["expression"]
            }),
        ),
        "get_current_time" => (
            "Get the current date and time.",
            json!({"type": "object", "properties": {}}),
        ),
        "get_weather_mock" => ("Get mock weather information for a location.", weather),
        "search_wikipedia_mock" => (
            "Search Wikipedia for information about a topic (mock implementation).",
            query("The search query"),
        ),
        "text_analyzer" => (
            "Analyze text and return character, word, sentence and paragraph statistics.",
            json!({
                "type": "object",
                "properties": {"text": {"type": "string", "description": "Text to analyze"}},
                "required": ["text"]
            }),
        ),
        "url_checker" => (
            "Check if a URL is accessible and return status information.",
            json!({
                "type": "object",
                "properties": {"url": {"type": "string", "description": "URL to check"}},
                "required": ["url"]
            }),
        ),
        "json_validator" => (
            "Validate and parse a JSON string.",
            json!({
                "type": "object",
                "properties": {
                    "json_string": {"type": "string", "description": "JSON text to validate"}
                },
                "required": ["json_string"]
            }),
        ),
        "list_operations" => (
            "Perform operations on a list of items.",
            json!({
                "type": "object",
                "properties": {
                    "operation": {"type": "string", "enum": ["sort", "reverse", "unique", "filter"]},
                    "items": {"type": "array", "items": {"type": "string"}},
                    "filter_keyword": {
                        "type": "string",
                        "description": "Keyword for the filter operation"
                    }
                },
                "required": ["operation", "items"]
            }),
        ),
        "string_operations" => (
            "Perform string operations.",
            json!({
                "type": "object",
                "properties": {
                    "operation": {
                        "type": "string",
                        "enum": ["upper", "lower", "title", "reverse", "replace"]
                    },
                    "text": {"type": "string", "description": "Input text"},
                    "old_text": {"type": "string", "description": "Text to replace"},
                    "new_text": {"type": "string", "description": "Replacement text"}
                },
                "required": ["operation", "text"]
            }),
        ),
        "query_knowledge_base" => (
            "Answer a question from the user's indexed documents, citing sources.",
            query("The question to answer"),
        ),
        "store_memory" => (
            "Remember a value under a key across sessions.",
            json!({
                "type": "object",
                "properties": {
                    "key": {"type": "string", "description": "Memory key"},
                    "value": {"description": "Value to remember"}
                },
                "required": ["key", "value"]
            }),
        ),
        "retrieve_memory" => (
            "Recall a value previously stored with store_memory.",
            json!({
                "type": "object",
                "properties": {"key": {"type": "string", "description": "Memory key"}},
                "required": ["key"]
            }),
        ),
        _ => return None,
    };

    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fills_defaults() {
        let tool = parse_tool_call("get_weather", r#"{"location": "London"}"#).unwrap();
        assert_eq!(
            tool,
            ToolCall::GetWeather {
                location: "London".to_string(),
                unit: "celsius".to_string()
            }
        );

        let tool = parse_tool_call(
            "string_operations",
            r#"{"operation": "upper", "text": "hi"}"#,
        )
        .unwrap();
        match tool {
            ToolCall::StringOperations {
                old_text, new_text, ..
            } => {
                assert!(old_text.is_empty());
                assert!(new_text.is_empty());
            }
            other => panic!("Expected StringOperations, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_no_argument_tool() {
        assert_eq!(
            parse_tool_call("get_current_time", "").unwrap(),
            ToolCall::GetCurrentTime
        );
        assert_eq!(
            parse_tool_call("get_current_time", "{}").unwrap(),
            ToolCall::GetCurrentTime
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        let err = parse_tool_call("launch_rocket", "{}").unwrap_err();
        assert!(err.to_string().contains("Unknown tool"));

        assert!(matches!(
            parse_tool_call("add", "[1, 2]"),
            Err(AideError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_tool_call("add", r#"{"a": 1}"#),
            Err(AideError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_parse_accepts_whole_floats() {
        assert_eq!(
            parse_tool_call("add", r#"{"a": 15.0, "b": 28}"#).unwrap(),
            ToolCall::Add { a: 15, b: 28 }
        );
        assert!(matches!(
            parse_tool_call("multiply", r#"{"a": 1.5, "b": 2}"#),
            Err(AideError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_tool_names_per_toolset() {
        assert_eq!(ToolContext::new(ToolSet::Basic).tool_names(), BASIC_TOOLS.to_vec());

        let full = ToolContext::new(ToolSet::Full);
        assert_eq!(full.tool_names(), FULL_TOOLS.to_vec());

        let names: Vec<String> = full
            .definitions()
            .into_iter()
            .map(|d| d.function.name)
            .collect();
        assert_eq!(names, FULL_TOOLS.to_vec());
    }

    #[tokio::test]
    async fn test_execute_basic_tools() {
        let tools = ToolContext::new(ToolSet::Basic);

        let product = tools
            .execute(&parse_tool_call("multiply", r#"{"a": 42, "b": 7}"#).unwrap())
            .await
            .unwrap();
        assert_eq!(product, "294");

        let overflow = tools
            .execute(&ToolCall::Add { a: i64::MAX, b: 1 })
            .await;
        assert!(matches!(overflow, Err(AideError::Tool(_))));

        let weather = tools
            .execute(&parse_tool_call("get_weather", r#"{"location": "London"}"#).unwrap())
            .await
            .unwrap();
        assert_eq!(
            weather,
            "The weather in London is currently sunny, 22 degrees celsius."
        );
    }

    #[tokio::test]
    async fn test_execute_full_tools() {
        let tools = ToolContext::new(ToolSet::Full);

        let result = tools
            .execute(&ToolCall::Calculator {
                operation: "divide".to_string(),
                a: 10.0,
                b: 4.0,
            })
            .await
            .unwrap();
        assert_eq!(result, "2.5");

        let result = tools
            .execute(&ToolCall::AdvancedCalculator {
                expression: "2 + 3 * 4".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(result, "14.0");

        let result = tools
            .execute(&ToolCall::ListOperations {
                operation: "sort".to_string(),
                items: vec!["b".to_string(), "a".to_string()],
                filter_keyword: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(result, r#"["a","b"]"#);

        let result = tools
            .execute(&ToolCall::JsonValidator {
                json_string: "[1]".to_string(),
            })
            .await
            .unwrap();
        let parsed: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["data_type"], "list");
    }

    #[tokio::test]
    async fn test_execute_rejects_tools_outside_toolset() {
        let tools = ToolContext::new(ToolSet::Full);
        let result = tools.execute(&ToolCall::Add { a: 1, b: 2 }).await;
        assert!(matches!(result, Err(AideError::Tool(_))));

        let result = tools
            .execute(&ToolCall::RetrieveMemory {
                key: "k".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AideError::Tool(_))));
    }

    #[tokio::test]
    async fn test_memory_tools() {
        let dir = tempfile::tempdir().unwrap();
        let memory = LongTermMemory::open(dir.path().join("memory.json")).unwrap();
        let tools = ToolContext::new(ToolSet::Basic)
            .with_long_term_memory(Arc::new(Mutex::new(memory)));

        assert!(tools.tool_names().contains(&"store_memory"));
        assert!(tools.tool_names().contains(&"retrieve_memory"));

        let stored = tools
            .execute(
                &parse_tool_call("store_memory", r#"{"key": "color", "value": "blue"}"#).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(stored, "Stored memory 'color'");

        let recalled = tools
            .execute(&parse_tool_call("retrieve_memory", r#"{"key": "color"}"#).unwrap())
            .await
            .unwrap();
        assert_eq!(recalled, "blue");

        let missing = tools
            .execute(&parse_tool_call("retrieve_memory", r#"{"key": "size"}"#).unwrap())
            .await
            .unwrap();
        assert_eq!(missing, "No memory found for key 'size'");
    }

    #[tokio::test]
    async fn test_query_knowledge_base() {
        use crate::chunking::TextChunker;
        use crate::knowledge::testing::KeywordEmbedder;
        use crate::knowledge::{KnowledgeBase, SourceDocument};
        use crate::openai::create_client_with;
        use crate::openai::testing::text_reply;
        use crate::vector_store::MemoryVectorStore;
        use std::time::Duration;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(text_reply("Coffee is brewed from roasted beans.")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let kb = KnowledgeBase::with_components(
            Arc::new(KeywordEmbedder),
            Arc::new(MemoryVectorStore::new()),
            TextChunker::new(500, 0),
        );
        kb.add_documents(&[
            SourceDocument::new("coffee.md", "Coffee", "Coffee is brewed from roasted beans."),
            SourceDocument::new("rust.md", "Rust", "Rust is a systems language."),
        ])
        .await
        .unwrap();

        let client = create_client_with(Some(&server.uri()), Duration::from_secs(5)).unwrap();
        let engine = RagEngine::new(client, kb.vector_store(), kb.embedder(), "gpt-4o-mini", 4, 0.3);
        let tools = ToolContext::new(ToolSet::Basic).with_knowledge(Arc::new(engine));

        assert!(tools.tool_names().contains(&"query_knowledge_base"));

        let result = tools
            .execute(&parse_tool_call("query_knowledge_base", r#"{"query": "coffee"}"#).unwrap())
            .await
            .unwrap();

        assert_eq!(result, "Coffee is brewed from roasted beans.\n\nSources: Coffee");
    }
}
