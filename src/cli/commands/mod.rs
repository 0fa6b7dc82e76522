//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod analyze;
mod config_cmd;
mod tools;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};
use crate::services::ReconcilePolicy;

/// Output format for analysis results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain-text analysis report
    #[default]
    Text,
    /// Full extraction result as JSON
    Json,
}

#[derive(Parser)]
#[command(name = "huurscan")]
#[command(about = "Field extraction for Dutch rental contracts")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Extract contract fields from a PDF and report on them
    Analyze {
        /// PDF file to analyze
        file: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
        /// Use only the embedded text layer
        #[arg(long)]
        no_ocr: bool,
        /// Conflict resolution between candidates (confidence, source-priority)
        #[arg(long)]
        policy: Option<ReconcilePolicy>,
        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Check if required OCR tools are installed
    CheckTools,

    /// Print the effective settings as JSON
    Config,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
    };
    let (mut settings, config) = load_settings_with_options(options).await?;
    if let Some(ref path) = config.source_path {
        tracing::info!("Using config {}", path.display());
    }

    match cli.command {
        Commands::Analyze {
            file,
            format,
            no_ocr,
            policy,
            timeout,
        } => {
            if no_ocr {
                settings.ocr_enabled = false;
            }
            if let Some(policy) = policy {
                settings.reconcile_policy = policy;
            }
            if let Some(timeout) = timeout {
                settings.timeout_secs = timeout;
            }
            analyze::cmd_analyze(&settings, &file, format).await
        }
        Commands::CheckTools => tools::cmd_check_tools(&settings).await,
        Commands::Config => config_cmd::cmd_config(&settings, &config).await,
    }
}
