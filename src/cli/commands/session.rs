//! Agent construction and response display shared by the agent commands.

use crate::agent::{Agent, AgentResponse, ToolContext};
use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use crate::knowledge::KnowledgeBase;
use crate::memory::LongTermMemory;
use crate::rag::RagEngine;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Tools for `settings`, with long-term memory and, when an index holds
/// documents, the knowledge base attached.
pub async fn build_tools(settings: &Settings) -> Result<ToolContext> {
    // Opening the store creates the index file, so check for it first.
    if settings.knowledge_path().exists() {
        let kb = KnowledgeBase::open(settings)?;
        tools_with_knowledge(settings, &kb).await
    } else {
        debug!("No knowledge index at {:?}", settings.knowledge_path());
        Ok(with_memory(settings, ToolContext::new(settings.agent.toolset)))
    }
}

/// Tools for `settings` backed by an already opened knowledge base.
pub async fn tools_with_knowledge(settings: &Settings, kb: &KnowledgeBase) -> Result<ToolContext> {
    let tools = with_memory(settings, ToolContext::new(settings.agent.toolset));
    let engine = RagEngine::from_settings(settings, kb.vector_store(), kb.embedder())?;
    offer_knowledge(tools, kb, engine).await
}

/// Attach `engine` only when `kb` has indexed documents.
async fn offer_knowledge(
    tools: ToolContext,
    kb: &KnowledgeBase,
    engine: RagEngine,
) -> Result<ToolContext> {
    if kb.document_count().await? == 0 {
        debug!("Knowledge index is empty; not offering query_knowledge_base");
        return Ok(tools);
    }
    Ok(tools.with_knowledge(Arc::new(engine)))
}

fn with_memory(settings: &Settings, tools: ToolContext) -> ToolContext {
    match LongTermMemory::open(settings.long_term_memory_path()) {
        Ok(memory) => tools.with_long_term_memory(Arc::new(Mutex::new(memory))),
        Err(e) => {
            warn!("Long-term memory unavailable: {}", e);
            tools
        }
    }
}

/// Build the agent, show the banner and stop with exit code 1 when no API
/// key is configured.
pub async fn ready_agent(settings: &Settings) -> Result<Agent> {
    let agent = Agent::from_settings(settings, build_tools(settings).await?)?;

    Output::banner(agent.model(), &settings.agent.toolset.to_string());

    if !agent.is_ready() || preflight::check().is_err() {
        Output::error("Agent is not ready.");
        Output::info(&preflight::api_key_hint());
        std::process::exit(1);
    }

    Ok(agent)
}

/// Print each tool call and its result, then the final answer.
pub fn print_response(response: &AgentResponse) {
    for record in &response.tool_calls {
        Output::tool_call(&record.to_string());
        Output::tool_result(&record.result);
    }
    Output::assistant(&response.content);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::TextChunker;
    use crate::config::ToolSet;
    use crate::knowledge::testing::KeywordEmbedder;
    use crate::knowledge::SourceDocument;
    use crate::openai::create_client_with;
    use crate::vector_store::MemoryVectorStore;
    use std::time::Duration;

    fn engine_for(kb: &KnowledgeBase) -> RagEngine {
        let client = create_client_with(None, Duration::from_secs(5)).unwrap();
        RagEngine::new(client, kb.vector_store(), kb.embedder(), "gpt-4o-mini", 4, 0.3)
    }

    #[tokio::test]
    async fn test_knowledge_tool_needs_indexed_documents() {
        let kb = KnowledgeBase::with_components(
            Arc::new(KeywordEmbedder),
            Arc::new(MemoryVectorStore::new()),
            TextChunker::new(500, 0),
        );

        let tools = offer_knowledge(ToolContext::new(ToolSet::Full), &kb, engine_for(&kb))
            .await
            .unwrap();
        assert!(!tools.tool_names().contains(&"query_knowledge_base"));

        kb.add_documents(&[SourceDocument::new("rust.md", "Rust", "Rust is a language.")])
            .await
            .unwrap();

        let tools = offer_knowledge(ToolContext::new(ToolSet::Full), &kb, engine_for(&kb))
            .await
            .unwrap();
        assert!(tools.tool_names().contains(&"query_knowledge_base"));
    }

    #[tokio::test]
    async fn test_build_tools_leaves_missing_index_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.knowledge.storage_path = dir.path().join("knowledge.db").to_string_lossy().to_string();
        settings.memory.long_term_path = dir.path().join("memory.json").to_string_lossy().to_string();

        let tools = build_tools(&settings).await.unwrap();

        assert!(!tools.tool_names().contains(&"query_knowledge_base"));
        assert!(!settings.knowledge_path().exists());
    }
}
