//! RAG response generation.

use super::{context::format_context_for_prompt, ContextBuilder, ContextChunk};
use crate::config::{Prompts, Settings};
use crate::embedding::Embedder;
use crate::error::{AideError, Result};
use crate::openai::create_client;
use crate::vector_store::VectorStore;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Answer returned when nothing relevant is indexed.
pub const NO_CONTEXT_ANSWER: &str =
    "I couldn't find any relevant information in the knowledge base for this question.";

/// Question answering over the knowledge base.
pub struct RagEngine {
    client: Client<OpenAIConfig>,
    model: String,
    context_builder: ContextBuilder,
    prompts: Prompts,
}

impl RagEngine {
    pub fn new(
        client: Client<OpenAIConfig>,
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        model: &str,
        max_chunks: usize,
        min_score: f32,
    ) -> Self {
        let context_builder = ContextBuilder::new(vector_store, embedder)
            .with_max_chunks(max_chunks)
            .with_min_score(min_score);

        Self {
            client,
            model: model.to_string(),
            context_builder,
            prompts: Prompts::default(),
        }
    }

    /// Build an engine using the `[knowledge]` settings.
    pub fn from_settings(
        settings: &Settings,
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        Ok(Self::new(
            create_client(settings)?,
            vector_store,
            embedder,
            &settings.knowledge.model,
            settings.knowledge.top_k,
            settings.knowledge.min_score,
        )
        .with_prompts(prompts))
    }

    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Answer a question from the indexed documents.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn ask(&self, question: &str) -> Result<RagResponse> {
        info!("Processing question: {}", question);

        let context_chunks = self.context_builder.build(question).await?;

        if context_chunks.is_empty() {
            return Ok(RagResponse {
                answer: NO_CONTEXT_ANSWER.to_string(),
                sources: Vec::new(),
            });
        }

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert(
            "context".to_string(),
            format_context_for_prompt(&context_chunks),
        );

        let system_prompt = self
            .prompts
            .render_with_custom(&self.prompts.knowledge.system, &HashMap::new());
        let user_prompt = self
            .prompts
            .render_with_custom(&self.prompts.knowledge.user, &vars);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()
                .map_err(|e| AideError::Knowledge(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| AideError::Knowledge(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.0)
            .build()
            .map_err(|e| AideError::Knowledge(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AideError::OpenAI(format!("Failed to generate answer: {}", e)))?;

        let answer = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AideError::Knowledge("Empty response from LLM".to_string()))?;

        debug!("Generated answer with {} sources", context_chunks.len());

        Ok(RagResponse {
            answer,
            sources: context_chunks,
        })
    }
}

/// An answer and the chunks it was grounded on.
#[derive(Debug, Clone, Serialize)]
pub struct RagResponse {
    pub answer: String,
    pub sources: Vec<ContextChunk>,
}

impl RagResponse {
    /// Compact text handed back to the agent as a tool result.
    pub fn format_for_tool(&self) -> String {
        if self.sources.is_empty() {
            return self.answer.clone();
        }

        let mut titles: Vec<&str> = Vec::new();
        for source in &self.sources {
            if !titles.contains(&source.source_title.as_str()) {
                titles.push(&source.source_title);
            }
        }

        format!("{}\n\nSources: {}", self.answer, titles.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::testing::KeywordEmbedder;
    use crate::openai::create_client_with;
    use crate::openai::testing::text_reply;
    use crate::vector_store::{Document, MemoryVectorStore};
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn engine(server_uri: &str, with_docs: bool) -> RagEngine {
        let store = Arc::new(MemoryVectorStore::new());
        if with_docs {
            store
                .upsert(&Document::new(
                    "rust.md".to_string(),
                    "Rust".to_string(),
                    "Rust guarantees memory safety.".to_string(),
                    vec![1.0, 0.0, 0.0, 0.0],
                    0,
                ))
                .await
                .unwrap();
        }

        let client = create_client_with(Some(server_uri), Duration::from_secs(5)).unwrap();
        RagEngine::new(client, store, Arc::new(KeywordEmbedder), "gpt-4o-mini", 4, 0.3)
    }

    #[tokio::test]
    async fn test_ask_without_context_skips_llm() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let response = engine(&server.uri(), false).await.ask("rust?").await.unwrap();
        assert_eq!(response.answer, NO_CONTEXT_ANSWER);
        assert!(response.sources.is_empty());
    }

    #[tokio::test]
    async fn test_ask_sends_context_to_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("Rust guarantees memory safety."))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply(
                "Rust is memory safe [Rust].",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let response = engine(&server.uri(), true)
            .await
            .ask("Is rust safe?")
            .await
            .unwrap();

        assert_eq!(response.answer, "Rust is memory safe [Rust].");
        assert_eq!(response.sources.len(), 1);
        assert_eq!(
            response.format_for_tool(),
            "Rust is memory safe [Rust].\n\nSources: Rust"
        );
    }
}
