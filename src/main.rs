//! Aide CLI entry point.

use aide::cli::{commands, Cli, Commands};
use aide::config::Settings;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("aide={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Some(model) = &cli.model {
        settings.agent.model = model.clone();
    }
    if let Some(temperature) = cli.temperature {
        settings.agent.temperature = temperature;
    }
    if let Some(toolset) = cli.toolset {
        settings.agent.toolset = toolset;
    }

    std::fs::create_dir_all(settings.data_dir())?;

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Chat { message } => commands::run_chat(&message, &settings).await?,
        Commands::Interactive => commands::run_interactive(&settings).await?,
        Commands::Tools => commands::run_tools(&settings).await?,
        Commands::Test => commands::run_test(&settings).await?,
        Commands::Demo => commands::run_demo(&settings).await?,
        Commands::Index { dir, force } => commands::run_index(&dir, force, &settings).await?,
        Commands::Ask { question } => commands::run_ask(&question, &settings).await?,
        Commands::Search {
            query,
            limit,
            min_score,
        } => commands::run_search(&query, limit, min_score, &settings).await?,
        Commands::Sources => commands::run_sources(&settings).await?,
        Commands::Forget { source_id } => commands::run_forget(&source_id, &settings).await?,
        Commands::Memory { action } => commands::run_memory(&action, &settings)?,
        Commands::Doctor => commands::run_doctor(&settings)?,
        Commands::Config { action } => commands::run_config(&action, &settings)?,
        Commands::Serve { host, port } => commands::run_serve(&host, port, &settings).await?,
    }

    Ok(())
}
