//! Prompt cache and debug dumps.
//!
//! The prompt cache lets the stop hook recall the most recent user prompt
//! for a richer completion message. UserPromptSubmit writes it, Stop reads
//! it. One file per session plus a global fallback; last writer wins, no
//! locking — writes are infrequent and sequential within a session.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::config::Config;

/// Filename of the session-independent fallback cache.
const GLOBAL_PROMPT_FILE: &str = "last-prompt.txt";

/// Directory holding per-session prompt files.
pub fn prompts_dir() -> Result<PathBuf> {
    Ok(Config::cache_dir()?.join("prompts"))
}

/// Directory where raw hook payloads are dumped for diagnostics.
pub fn debug_dir() -> Result<PathBuf> {
    Ok(Config::cache_dir()?.join("debug"))
}

/// Store the latest user prompt for `session_id`.
///
/// Writes both the per-session file and the global fallback so the stop
/// hook still finds something when the session id is absent from its
/// payload.
pub fn store_prompt(session_id: &str, prompt: &str) -> Result<()> {
    let dir = prompts_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    if !session_id.is_empty() {
        let path = dir.join(session_file_name(session_id));
        std::fs::write(&path, prompt)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let global = dir.join(GLOBAL_PROMPT_FILE);
    std::fs::write(&global, prompt)
        .with_context(|| format!("Failed to write {}", global.display()))?;
    Ok(())
}

/// Recall the most recent prompt for `session_id`, falling back to the
/// global file. Returns `None` when neither exists or both are empty.
pub fn recall_prompt(session_id: &str) -> Option<String> {
    let dir = prompts_dir().ok()?;

    let mut candidates = Vec::new();
    if !session_id.is_empty() {
        candidates.push(dir.join(session_file_name(session_id)));
    }
    candidates.push(dir.join(GLOBAL_PROMPT_FILE));

    for path in candidates {
        if let Ok(content) = std::fs::read_to_string(&path) {
            let trimmed = content.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// Dump a raw hook payload to the debug directory for later inspection.
/// Returns the path written.
pub fn dump_payload(event_name: &str, raw: &str) -> Result<PathBuf> {
    let dir = debug_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let timestamp = Utc::now().format("%Y%m%d_%H%M%S_%3f");
    let path = dir.join(format!("{event_name}-{timestamp}.json"));
    let content = if raw.trim().is_empty() { "{}" } else { raw };
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Session ids come from an external payload; keep only filename-safe
/// characters so they can't escape the cache directory.
fn session_file_name(session_id: &str) -> String {
    let safe: String = session_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{safe}.txt")
}
