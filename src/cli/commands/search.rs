//! Search command implementation.

use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use crate::knowledge::KnowledgeBase;
use crate::rag::ContextBuilder;
use anyhow::Result;

pub async fn run_search(
    query: &str,
    limit: usize,
    min_score: Option<f32>,
    settings: &Settings,
) -> Result<()> {
    if let Err(e) = preflight::check() {
        Output::error(&e.to_string());
        return Err(e.into());
    }

    let kb = KnowledgeBase::open(settings)?;
    let context_builder = ContextBuilder::new(kb.vector_store(), kb.embedder())
        .with_max_chunks(limit)
        .with_min_score(min_score.unwrap_or(settings.knowledge.min_score));

    let spinner = Output::spinner("Searching...");
    let results = context_builder.build(query).await;
    spinner.finish_and_clear();

    match results {
        Ok(chunks) if chunks.is_empty() => {
            Output::warning("No results found matching your query.");
            Ok(())
        }
        Ok(chunks) => {
            Output::success(&format!("Found {} results", chunks.len()));
            for chunk in &chunks {
                Output::search_result(
                    &chunk.source_title,
                    &chunk.source_id,
                    chunk.score,
                    &chunk.content,
                );
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            Err(e.into())
        }
    }
}
