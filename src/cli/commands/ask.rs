//! Ask command implementation.

use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use crate::knowledge::KnowledgeBase;
use crate::rag::RagEngine;
use anyhow::Result;

pub async fn run_ask(question: &str, settings: &Settings) -> Result<()> {
    if let Err(e) = preflight::check() {
        Output::error(&e.to_string());
        Output::info("Run 'aide doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let kb = KnowledgeBase::open(settings)?;
    let engine = RagEngine::from_settings(settings, kb.vector_store(), kb.embedder())?;

    let spinner = Output::spinner("Searching knowledge base...");
    let result = engine.ask(question).await;
    spinner.finish_and_clear();

    match result {
        Ok(response) => {
            println!("\n{}\n", response.answer);

            if !response.sources.is_empty() {
                Output::header("Sources");
                for source in &response.sources {
                    Output::search_result(
                        &source.source_title,
                        &source.source_id,
                        source.score,
                        &source.content,
                    );
                }
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            Err(e.into())
        }
    }
}
