//! codefix CLI - patch, run and explain Python snippets
//!
//! Usage:
//!   codefix init                Write default config and create the history database
//!   codefix correct [FILE]      Correct code from FILE (or stdin) and explain the result
//!   codefix history [-n N]      Show the most recent correction attempts
//!   codefix serve [--bind ADDR] Run the HTTP API

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codefix_core::{CodefixConfig, CorrectionOutcome};
use codefix_orchestrator::Corrector;
use codefix_server::AppState;
use codefix_storage::HistoryStore;
use colored::Colorize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "codefix")]
#[command(author, version, about = "Patch, run and explain Python snippets")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding `.codefix/` (defaults to current directory)
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write default configuration and create the history database
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Correct code, run it and explain the outcome
    Correct {
        /// Source file (reads stdin when omitted)
        file: Option<PathBuf>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recent correction attempts, newest first
    History {
        /// Number of records to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Serve the HTTP API
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so corrected code on stdout stays clean
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();

    let config = CodefixConfig::load_or_default(&cli.root).context("Failed to load config")?;

    match cli.command {
        Commands::Init { force } => cmd_init(&cli.root, &config, force).await,
        Commands::Correct { file, json } => cmd_correct(&cli.root, &config, file, json).await,
        Commands::History { limit } => cmd_history(&cli.root, &config, limit).await,
        Commands::Serve { bind } => cmd_serve(&cli.root, &config, bind).await,
    }
}

async fn open_history(root: &Path, config: &CodefixConfig) -> Result<Arc<HistoryStore>> {
    let db_path = config.database_path(root);
    let store = HistoryStore::open_and_init(&db_path)
        .await
        .with_context(|| format!("could not open history database {}", db_path.display()))?;
    Ok(Arc::new(store))
}

async fn cmd_init(root: &Path, config: &CodefixConfig, force: bool) -> Result<()> {
    let config_path = CodefixConfig::path_in(root);
    if config_path.exists() && !force {
        println!("Config already exists: {}", config_path.display());
    } else {
        CodefixConfig::write_default(root)?;
        println!("{}", "✓ Wrote default config".green().bold());
        println!("  Config:   {}", config_path.display());
    }

    let history = open_history(root, config).await?;
    println!("  Database: {}", history.path());

    Ok(())
}

fn read_source(file: Option<&Path>) -> Result<String> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };
    Ok(raw.trim_end().to_string())
}

async fn cmd_correct(
    root: &Path,
    config: &CodefixConfig,
    file: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let source = read_source(file.as_deref())?;
    let history = open_history(root, config).await?;
    let corrector = Corrector::from_config(config, history);

    let outcome = corrector.correct(&source).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    Ok(())
}

fn print_outcome(outcome: &CorrectionOutcome) {
    println!("{}", "Corrected Code:".bold());
    println!("{}", outcome.corrected);
    println!();

    let summary = outcome.summary();
    if outcome.succeeded() {
        println!("{}", summary.green());
    } else {
        println!("{}", summary.red());
        if let Some(failure) = &outcome.failure {
            println!("  {}", failure.detail.dimmed());
        }
    }
    println!("{}", format!("Saved as #{}", outcome.id).dimmed());
}

async fn cmd_history(root: &Path, config: &CodefixConfig, limit: usize) -> Result<()> {
    let history = open_history(root, config).await?;
    let records = history.recent(limit).await?;

    if records.is_empty() {
        println!("No correction history yet");
        return Ok(());
    }

    for record in records {
        println!(
            "{}",
            format!(
                "#{} | {}",
                record.id,
                record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            )
            .blue()
        );
        println!("Original Code:");
        println!("{}", record.original);
        println!("Corrected Code:");
        println!("{}", record.corrected);
        println!("Error Explanation: {}", record.explanation);
        if !record.failure_detail.is_empty() {
            println!("Error Message: {}", record.failure_detail);
        }
        println!();
    }

    Ok(())
}

async fn cmd_serve(root: &Path, config: &CodefixConfig, bind: Option<String>) -> Result<()> {
    let history = open_history(root, config).await?;
    let corrector = Corrector::from_config(config, history);
    let state = Arc::new(AppState::new(corrector, config.server.history_limit));

    let addr = bind.unwrap_or_else(|| config.server.bind.clone());
    info!("Starting codefix API on {}", addr);
    println!("codefix API running at http://{}", addr);
    println!("Press Ctrl+C to stop");

    codefix_server::serve(state, &addr).await
}
