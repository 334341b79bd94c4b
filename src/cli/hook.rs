use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

use super::OutputConfig;
use crate::config::Config;
use crate::hooks::{self, HookEvent, HookPayload};

#[derive(Args)]
pub struct HookArgs {
    #[command(subcommand)]
    command: HookCommands,
}

#[derive(Subcommand)]
enum HookCommands {
    /// Install chime hooks into Claude Code settings.json
    Install(InstallArgs),

    /// Remove chime hooks from Claude Code settings
    Uninstall(UninstallArgs),

    /// Show installed hooks and current config values
    Status(StatusArgs),

    /// Handle SessionStart events (internal, called by Claude Code)
    SessionStart,

    /// Handle UserPromptSubmit events (internal, called by Claude Code)
    UserPromptSubmit,

    /// Handle PreToolUse events (internal, called by Claude Code)
    PreToolUse,

    /// Handle Notification events (internal, called by Claude Code)
    Notification,

    /// Handle Stop events (internal, called by Claude Code)
    Stop,
}

#[derive(Args)]
struct InstallArgs {
    /// Install globally (~/.claude/settings.json) instead of project-local
    #[arg(long)]
    global: bool,
}

#[derive(Args)]
struct UninstallArgs {
    /// Uninstall from global settings instead of project-local
    #[arg(long)]
    global: bool,
}

#[derive(Args)]
struct StatusArgs {}

#[derive(Serialize)]
struct HookStatusOutput {
    global_installed: bool,
    project_installed: Option<bool>,
    config_path: String,
    soundtrack_dir: String,
    notifications_enabled: bool,
    sounds: Vec<SoundStatusOutput>,
}

#[derive(Serialize)]
struct SoundStatusOutput {
    event: String,
    file: String,
    present: bool,
}

pub async fn run(args: HookArgs, output: OutputConfig) -> Result<()> {
    match args.command {
        HookCommands::Install(a) => run_install(a, output).await,
        HookCommands::Uninstall(a) => run_uninstall(a, output).await,
        HookCommands::Status(a) => run_status(a, output).await,
        HookCommands::SessionStart => run_event(HookEvent::SessionStart).await,
        HookCommands::UserPromptSubmit => run_event(HookEvent::UserPromptSubmit).await,
        HookCommands::PreToolUse => run_event(HookEvent::PreToolUse).await,
        HookCommands::Notification => run_event(HookEvent::Notification).await,
        HookCommands::Stop => run_event(HookEvent::Stop).await,
    }
}

/// Handle one lifecycle event. Never fails: any internal error becomes a
/// stderr line and a successful exit, so the host CLI is never blocked.
async fn run_event(event: HookEvent) -> Result<()> {
    match run_event_inner(event) {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("chime hook {event}: {e:#}");
            Ok(())
        }
    }
}

fn run_event_inner(event: HookEvent) -> Result<()> {
    let raw = hooks::payload::read_raw_stdin();
    let payload = HookPayload::parse(&raw);

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "falling back to default config");
        Config::default()
    });

    let outcome = hooks::dispatch(event, &payload, &raw, &config);
    debug!(
        triggered = outcome.triggered,
        sound = outcome.sound_played,
        notified = outcome.notified,
        "dispatch complete"
    );
    if let Some(confirmation) = outcome.confirmation {
        println!("{confirmation}");
    }
    Ok(())
}

/// Resolve the target settings.json path.
/// --global → ~/.claude/settings.json
/// otherwise → <git-root>/.claude/settings.json
fn resolve_settings_path(global: bool) -> Result<PathBuf> {
    if global {
        let home = std::env::var("HOME").context("HOME not set")?;
        Ok(PathBuf::from(home).join(".claude").join("settings.json"))
    } else {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .output()
            .context("Failed to run git rev-parse")?;
        if !output.status.success() {
            anyhow::bail!("Not in a git repository. Use --global or run from a git repo.");
        }
        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(PathBuf::from(root).join(".claude").join("settings.json"))
    }
}

/// Build the chime hook entries for Claude Code settings.json: one command
/// per lifecycle event.
fn chime_hook_entries() -> serde_json::Value {
    let mut events = serde_json::Map::new();
    for event in HookEvent::all() {
        events.insert(
            event.settings_name().to_string(),
            json!([
                {
                    "hooks": [
                        {
                            "type": "command",
                            "command": format!("chime hook {}", event.subcommand()),
                        }
                    ]
                }
            ]),
        );
    }
    serde_json::Value::Object(events)
}

/// Check if a hook group entry contains a chime command.
fn is_chime_hook_group(group: &serde_json::Value) -> bool {
    if let Some(hooks) = group.get("hooks").and_then(|h| h.as_array()) {
        hooks.iter().any(|h| {
            h.get("command")
                .and_then(|c| c.as_str())
                .map(|c| c.starts_with("chime hook "))
                .unwrap_or(false)
        })
    } else {
        false
    }
}

/// Merge chime hooks into an existing settings object.
/// Preserves non-chime hooks in each event array.
fn merge_hooks(settings: &mut serde_json::Value) {
    let entries = chime_hook_entries();
    let entries = entries.as_object().unwrap();

    // Ensure settings.hooks exists as an object
    if settings.get("hooks").is_none() || !settings["hooks"].is_object() {
        settings["hooks"] = json!({});
    }

    for (event_name, chime_entries) in entries {
        let chime_arr = chime_entries.as_array().unwrap();

        if let Some(existing) = settings["hooks"].get_mut(event_name) {
            if let Some(arr) = existing.as_array_mut() {
                // Remove old chime entries, then append new ones
                arr.retain(|entry| !is_chime_hook_group(entry));
                arr.extend(chime_arr.iter().cloned());
            } else {
                // Event key exists but isn't an array — replace
                settings["hooks"][event_name] = serde_json::Value::Array(chime_arr.clone());
            }
        } else {
            settings["hooks"][event_name] = serde_json::Value::Array(chime_arr.clone());
        }
    }
}

/// Remove chime hooks from a settings object.
/// Returns true if any hooks were removed.
fn remove_chime_hooks(settings: &mut serde_json::Value) -> bool {
    let mut removed = false;
    if let Some(hooks) = settings.get_mut("hooks").and_then(|h| h.as_object_mut()) {
        for (_event, entries) in hooks.iter_mut() {
            if let Some(arr) = entries.as_array_mut() {
                let before = arr.len();
                arr.retain(|entry| !is_chime_hook_group(entry));
                if arr.len() < before {
                    removed = true;
                }
            }
        }
        // Clean up empty event arrays
        hooks.retain(|_, v| v.as_array().map(|a| !a.is_empty()).unwrap_or(true));
    }
    // Remove empty hooks object
    if let Some(hooks) = settings.get("hooks").and_then(|h| h.as_object()) {
        if hooks.is_empty() {
            settings.as_object_mut().unwrap().remove("hooks");
        }
    }
    removed
}

/// Check whether chime hooks are present in a settings.json Value.
fn has_chime_hooks(settings: &serde_json::Value) -> bool {
    if let Some(hooks) = settings.get("hooks").and_then(|h| h.as_object()) {
        for (_event, entries) in hooks {
            if let Some(arr) = entries.as_array() {
                if arr.iter().any(is_chime_hook_group) {
                    return true;
                }
            }
        }
    }
    false
}

/// Read a settings.json file, returning empty object if missing.
fn read_settings(path: &Path) -> Result<serde_json::Value> {
    if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(json!({}));
        }
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    } else {
        Ok(json!({}))
    }
}

/// Write settings.json, creating parent directories as needed.
fn write_settings(path: &Path, settings: &serde_json::Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

async fn run_install(args: InstallArgs, output: OutputConfig) -> Result<()> {
    let settings_path = resolve_settings_path(args.global)?;

    let mut settings = read_settings(&settings_path)?;
    merge_hooks(&mut settings);
    write_settings(&settings_path, &settings)?;

    if output.json {
        let result = json!({
            "status": "installed",
            "path": settings_path.display().to_string(),
            "global": args.global,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if !output.quiet {
        let scope = if args.global { "global" } else { "project" };
        println!("{} Chime hooks installed ({})", "✓".green(), scope.cyan());
        println!(
            "  Location: {}",
            settings_path.display().to_string().dimmed()
        );
        for event in HookEvent::all() {
            println!(
                "  {:18} {}",
                format!("{}:", event.settings_name()),
                event.subcommand().cyan()
            );
        }
    }

    Ok(())
}

async fn run_uninstall(args: UninstallArgs, output: OutputConfig) -> Result<()> {
    let settings_path = resolve_settings_path(args.global)?;

    if !settings_path.exists() {
        if output.json {
            let result = json!({
                "status": "not_installed",
                "path": settings_path.display().to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else if !output.quiet {
            println!("No hooks to remove ({})", settings_path.display());
        }
        return Ok(());
    }

    let mut settings = read_settings(&settings_path)?;
    let removed = remove_chime_hooks(&mut settings);
    write_settings(&settings_path, &settings)?;

    if output.json {
        let result = json!({
            "status": if removed { "uninstalled" } else { "not_installed" },
            "path": settings_path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if !output.quiet {
        if removed {
            println!(
                "{} Chime hooks removed from {}",
                "✓".green(),
                settings_path.display()
            );
        } else {
            println!("No chime hooks found in {}", settings_path.display());
        }
    }

    Ok(())
}

async fn run_status(_args: StatusArgs, output: OutputConfig) -> Result<()> {
    let config = Config::load().unwrap_or_default();
    let config_path = Config::config_path()?;
    let soundtrack_dir = config.soundtrack_dir()?;

    let global_installed = resolve_settings_path(true)
        .and_then(|p| read_settings(&p))
        .map(|s| has_chime_hooks(&s))
        .unwrap_or(false);

    // Project-local state only exists inside a git repository
    let project_installed = resolve_settings_path(false)
        .ok()
        .map(|p| read_settings(&p).map(|s| has_chime_hooks(&s)).unwrap_or(false));

    let sounds: Vec<SoundStatusOutput> = HookEvent::all()
        .iter()
        .map(|&event| {
            let path = config
                .sound_path(event)
                .unwrap_or_else(|_| PathBuf::from("?"));
            SoundStatusOutput {
                event: event.settings_name().to_string(),
                file: path.display().to_string(),
                present: path.exists(),
            }
        })
        .collect();

    if output.json {
        let status = HookStatusOutput {
            global_installed,
            project_installed,
            config_path: config_path.display().to_string(),
            soundtrack_dir: soundtrack_dir.display().to_string(),
            notifications_enabled: config.notification.enabled,
            sounds,
        };
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else if !output.quiet {
        println!("{} Chime configuration", "🔔".bold());
        println!();
        println!("  Config file:      {}", config_path.display().to_string().cyan());
        println!("  Soundtrack dir:   {}", soundtrack_dir.display().to_string().cyan());
        println!(
            "  Notifications:    {}",
            if config.notification.enabled {
                "enabled".green()
            } else {
                "disabled".yellow()
            }
        );
        println!();
        let global_str = if global_installed {
            "installed".green()
        } else {
            "not installed".yellow()
        };
        println!("  Global hooks:     {global_str}");
        match project_installed {
            Some(true) => println!("  Project hooks:    {}", "installed".green()),
            Some(false) => println!("  Project hooks:    {}", "not installed".yellow()),
            None => println!("  Project hooks:    {}", "n/a (not in a git repo)".dimmed()),
        }
        println!();
        println!("{} Sounds", "🎵".bold());
        println!();
        for sound in &sounds {
            let marker = if sound.present {
                "✓".green()
            } else {
                "✗".yellow()
            };
            println!("  {marker} {:18} {}", sound.event, sound.file.dimmed());
        }
    }

    Ok(())
}
