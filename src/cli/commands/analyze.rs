//! Contract analysis command.

use std::path::Path;
use std::time::Duration;

use console::style;

use crate::cli::icons::{error, success, warning};
use crate::config::Settings;
use crate::services::{Extraction, ExtractionPipeline};

use super::OutputFormat;

/// Analyze one PDF and print the report or JSON result.
pub async fn cmd_analyze(settings: &Settings, file: &Path, format: OutputFormat) -> anyhow::Result<()> {
    if !file.exists() {
        anyhow::bail!("File not found: {}", file.display());
    }

    let bytes = tokio::fs::read(file).await?;
    let pipeline = ExtractionPipeline::from_settings(settings);
    if settings.ocr_enabled && !pipeline.has_ocr() {
        eprintln!("{} OCR unavailable, using embedded text only", warning());
    }

    // OCR has no deadline of its own; bound the whole document instead.
    let deadline = Duration::from_secs(settings.timeout_secs);
    let task = tokio::task::spawn_blocking(move || pipeline.process_bytes(&bytes));
    let extraction = match tokio::time::timeout(deadline, task).await {
        Ok(joined) => joined??,
        Err(_) => anyhow::bail!(
            "Analysis of {} timed out after {}s",
            file.display(),
            settings.timeout_secs
        ),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&extraction)?),
        OutputFormat::Text => print_text(&extraction),
    }
    Ok(())
}

fn print_text(extraction: &Extraction) {
    print!("{}", extraction.report());

    if extraction.issues.is_empty() {
        eprintln!("{} No issues found", success());
    } else {
        eprintln!(
            "{} {} issue(s) need review:",
            error(),
            style(extraction.issues.len()).bold()
        );
        for issue in &extraction.issues {
            eprintln!("  {} {}", style(issue.kind.as_str()).yellow(), issue.message);
        }
    }

    if !extraction.diagnostics.is_empty() {
        eprintln!(
            "{} {} processing warning(s); rerun with --verbose for details",
            warning(),
            extraction.diagnostics.len()
        );
    }
}
