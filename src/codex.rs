//! Codex CLI configuration sync.
//!
//! One-shot merge of a dotfiles-managed Codex config into the active
//! `~/.codex/config.toml`: the source document wins everywhere except the
//! `projects` table, which records per-machine trust decisions and is
//! preserved from the destination. The destination is backed up before it
//! is rewritten.
//!
//! This is the only chime operation that fails loudly: without a readable
//! source document the sync has no purpose, so those errors abort with a
//! non-zero exit instead of degrading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use toml::value::Table;
use toml::Value;
use tracing::warn;

/// The nested table preserved from the destination during a merge.
const PRESERVED_TABLE: &str = "projects";

/// Fatal sync failures, all on the source-document path.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("source config not found: {0}")]
    SourceMissing(PathBuf),
    #[error("failed to read source config {path}: {reason}")]
    SourceUnreadable { path: PathBuf, reason: String },
    #[error("failed to parse source config {path}: {reason}")]
    SourceInvalid { path: PathBuf, reason: String },
}

/// What a sync run did, for reporting.
#[derive(Debug, Serialize)]
pub struct SyncOutcome {
    pub source: PathBuf,
    pub dest: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<PathBuf>,
    pub preserved_projects: usize,
    pub synced_sections: Vec<String>,
    pub used_fallback_writer: bool,
}

/// Sync `source` over `dest`, preserving the destination's `projects` table.
pub fn sync(source: &Path, dest: &Path) -> Result<SyncOutcome> {
    let source_doc = load_source(source)?;
    let dest_doc = load_dest(dest);

    // Back up the destination before touching it. The copy preserves the
    // original bytes even when the document didn't parse.
    let backup = if dest.exists() {
        let backup_path = backup_path(dest);
        std::fs::copy(dest, &backup_path)
            .with_context(|| format!("Failed to back up {}", dest.display()))?;
        Some(backup_path)
    } else {
        None
    };

    let (merged, preserved_projects) = merge(&source_doc, &dest_doc);

    let (content, used_fallback_writer) = render_document(&merged);
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(dest, content)
        .with_context(|| format!("Failed to write {}", dest.display()))?;

    let synced_sections = source_doc.keys().cloned().collect();

    Ok(SyncOutcome {
        source: source.to_path_buf(),
        dest: dest.to_path_buf(),
        backup,
        preserved_projects,
        synced_sections,
        used_fallback_writer,
    })
}

fn load_source(path: &Path) -> Result<Table> {
    if !path.exists() {
        return Err(SyncError::SourceMissing(path.to_path_buf()).into());
    }
    let content = std::fs::read_to_string(path).map_err(|e| SyncError::SourceUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    toml::from_str(&content)
        .map_err(|e| {
            SyncError::SourceInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
            .into()
        })
}

/// Load the destination document, treating a missing or unparseable file
/// as empty. The backup keeps the original bytes around either way.
fn load_dest(path: &Path) -> Table {
    if !path.exists() {
        return Table::new();
    }
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(table) => table,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "destination config unparseable, treating as empty");
                Table::new()
            }
        },
        Err(e) => {
            warn!(path = %path.display(), error = %e, "destination config unreadable, treating as empty");
            Table::new()
        }
    }
}

/// Overlay the source onto the destination: the source provides every
/// section, then the destination's `projects` table (if any) replaces the
/// source's. Returns the merged document and how many project entries were
/// preserved.
fn merge(source: &Table, dest: &Table) -> (Table, usize) {
    let mut merged = source.clone();
    let mut preserved = 0;
    if let Some(Value::Table(projects)) = dest.get(PRESERVED_TABLE) {
        preserved = projects.len();
        merged.insert(PRESERVED_TABLE.to_string(), Value::Table(projects.clone()));
    }
    (merged, preserved)
}

fn backup_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "config.toml".to_string());
    name.push_str(".backup");
    dest.with_file_name(name)
}

/// Serialize the merged document: full-fidelity serializer first, manual
/// writer only when the serializer rejects the value ordering.
fn render_document(doc: &Table) -> (String, bool) {
    match toml::to_string_pretty(&Value::Table(doc.clone())) {
        Ok(content) => (content, false),
        Err(e) => {
            warn!(error = %e, "toml serializer rejected document, using fallback writer");
            (render_fallback(doc), true)
        }
    }
}

/// Minimal TOML writer: ordered top-level scalars followed by named tables
/// one nesting level deep. Generic over section names so no table is
/// silently dropped; anything nested deeper than `[section.sub]` is
/// reported and skipped.
fn render_fallback(doc: &Table) -> String {
    let mut out = String::from("# Codex CLI configuration\n# Synced by chime; edit the dotfiles source instead.\n\n");

    let mut wrote_scalar = false;
    for (key, value) in doc {
        if !value.is_table() {
            out.push_str(&format!("{} = {}\n", format_key(key), value));
            wrote_scalar = true;
        }
    }
    if wrote_scalar {
        out.push('\n');
    }

    for (name, value) in doc {
        let Some(table) = value.as_table() else { continue };

        let has_scalars = table.values().any(|v| !v.is_table());
        if has_scalars || table.is_empty() {
            out.push_str(&format!("[{}]\n", format_key(name)));
            for (key, value) in table.iter().filter(|(_, v)| !v.is_table()) {
                out.push_str(&format!("{} = {}\n", format_key(key), value));
            }
            out.push('\n');
        }

        for (sub_name, sub_value) in table {
            let Some(sub_table) = sub_value.as_table() else { continue };
            out.push_str(&format!("[{}.{}]\n", format_key(name), format_key(sub_name)));
            for (key, value) in sub_table {
                if value.is_table() {
                    warn!(section = %name, entry = %sub_name, key = %key, "fallback writer cannot represent deeper nesting, skipping");
                    continue;
                }
                out.push_str(&format!("{} = {}\n", format_key(key), value));
            }
            out.push('\n');
        }
    }

    out
}

/// Quote a key unless it is bare (letters, digits, `-`, `_`).
fn format_key(key: &str) -> String {
    let bare = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if bare {
        key.to_string()
    } else {
        format!("\"{}\"", key.replace('\\', "\\\\").replace('"', "\\\""))
    }
}
