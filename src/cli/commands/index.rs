//! Index command implementation.

use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use crate::knowledge::KnowledgeBase;
use anyhow::Result;
use std::path::Path;

/// Load, chunk and embed every document under `dir`.
pub async fn run_index(dir: &Path, force: bool, settings: &Settings) -> Result<()> {
    if let Err(e) = preflight::check() {
        Output::error(&e.to_string());
        Output::info("Run 'aide doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let kb = KnowledgeBase::open(settings)?;

    let spinner = Output::spinner(&format!("Indexing {}...", dir.display()));
    let result = kb.build_index(dir, force).await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => {
            Output::success(&format!(
                "Indexed {} of {} documents ({} chunks)",
                report.documents_indexed, report.documents_found, report.chunks_indexed
            ));
            if report.documents_skipped > 0 {
                Output::info(&format!(
                    "Skipped {} already indexed documents (use --force to re-index)",
                    report.documents_skipped
                ));
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Indexing failed: {}", e));
            Err(e.into())
        }
    }
}
