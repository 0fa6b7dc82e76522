//! Configuration inspection command.

use console::style;

use crate::config::{Config, Settings};

/// Print effective settings as JSON; the config source goes to stderr.
pub async fn cmd_config(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    let source = config
        .source_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults (no config file found)".to_string());
    eprintln!("{} Source: {}", style("→").dim(), source);

    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}
