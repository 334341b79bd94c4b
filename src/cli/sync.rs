use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::OutputConfig;
use crate::codex;

#[derive(Args)]
pub struct SyncCodexArgs {
    /// Source config (defaults to ~/.dotfiles/openai-codex/config.toml)
    #[arg(long)]
    source: Option<PathBuf>,

    /// Destination config (defaults to ~/.codex/config.toml)
    #[arg(long)]
    dest: Option<PathBuf>,
}

pub async fn run(args: SyncCodexArgs, output: OutputConfig) -> Result<()> {
    let home = home_dir()?;
    let source = args
        .source
        .unwrap_or_else(|| home.join(".dotfiles").join("openai-codex").join("config.toml"));
    let dest = args
        .dest
        .unwrap_or_else(|| home.join(".codex").join("config.toml"));

    if !output.quiet && !output.json {
        println!(
            "Syncing Codex config from {} to {}",
            source.display().to_string().cyan(),
            dest.display().to_string().cyan()
        );
    }

    // Unlike the hooks, this propagates: a missing source is a fatal,
    // user-visible error.
    let outcome = codex::sync(&source, &dest)?;

    if output.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }
    if output.quiet {
        return Ok(());
    }

    if let Some(backup) = &outcome.backup {
        println!("Backup created: {}", backup.display().to_string().dimmed());
    }
    if outcome.preserved_projects > 0 {
        println!(
            "Preserved {} project trust setting(s)",
            outcome.preserved_projects.to_string().cyan()
        );
    }
    if outcome.used_fallback_writer {
        println!("{} wrote with the fallback serializer", "!".yellow());
    }
    println!(
        "{} Config synced to {}",
        "✓".green(),
        outcome.dest.display()
    );
    if output.verbose && !outcome.synced_sections.is_empty() {
        println!("Synced sections:");
        for section in &outcome.synced_sections {
            println!("  - {section}");
        }
    }

    Ok(())
}

fn home_dir() -> Result<PathBuf> {
    let dirs = directories::UserDirs::new().context("Failed to determine home directory")?;
    Ok(dirs.home_dir().to_path_buf())
}
