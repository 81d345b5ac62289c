//! paperchat CLI
//!
//! Front end for the paper question-answering workflow. All answer output
//! goes to stdout; stage progress and logs go to stderr.

mod commands;

use clap::{Parser, Subcommand};
use commands::AskCommand;
use paperchat_core::{config::AppConfig, logging};
use std::path::PathBuf;

/// Ask natural-language questions about an academic paper corpus
#[derive(Parser, Debug)]
#[command(name = "paperchat")]
#[command(about = "Ask natural-language questions about an academic paper corpus", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file (default: paperchat.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Generation service provider (ollama, openai)
    #[arg(short, long, global = true)]
    provider: Option<String>,

    /// Completion model identifier
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question (enters an interactive loop when none is given)
    Ask(AskCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(cli.config)?.with_overrides(
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("paperchat starting");
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);
    tracing::debug!("Index: {} ({})", config.index_endpoint, config.collection);

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result?;
    Ok(())
}
