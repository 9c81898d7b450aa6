//! Listing and removing indexed sources.

use crate::cli::Output;
use crate::config::Settings;
use crate::knowledge::KnowledgeBase;
use anyhow::Result;

pub async fn run_sources(settings: &Settings) -> Result<()> {
    let kb = KnowledgeBase::open(settings)?;

    match kb.list_sources().await {
        Ok(sources) if sources.is_empty() => {
            Output::info("Nothing indexed yet. Use 'aide index <dir>' to add documents.");
        }
        Ok(sources) => {
            Output::header(&format!("Indexed sources ({})", sources.len()));
            println!();

            for source in &sources {
                Output::source_info(
                    &source.source_title,
                    &source.source_id,
                    source.chunk_count,
                    source.total_chars,
                );
            }

            let total_chunks: u32 = sources.iter().map(|s| s.chunk_count).sum();
            println!();
            Output::kv("Total sources", &sources.len().to_string());
            Output::kv("Total chunks", &total_chunks.to_string());
        }
        Err(e) => {
            Output::error(&format!("Failed to list sources: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn run_forget(source_id: &str, settings: &Settings) -> Result<()> {
    let kb = KnowledgeBase::open(settings)?;

    match kb.delete_source(source_id).await? {
        0 => Output::warning(&format!("No indexed source named '{}'", source_id)),
        n => Output::success(&format!("Removed {} ({} chunks)", source_id, n)),
    }

    Ok(())
}
