use std::io::{IsTerminal, Read};

use serde::Deserialize;
use tracing::debug;

/// Event payload Claude Code pipes to a hook on stdin.
///
/// Every field is optional; the schema varies by event type and absent
/// fields default to empty strings. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HookPayload {
    /// Notification message text (Notification events)
    pub message: String,
    /// Name of the tool about to run (PreToolUse events)
    pub tool_name: String,
    /// The user's prompt text (UserPromptSubmit events)
    pub prompt: String,
    /// Claude Code session ID
    pub session_id: String,
}

impl HookPayload {
    /// Parse a payload from raw stdin content.
    ///
    /// Malformed or empty input yields the default payload rather than an
    /// error; a hook invocation must never fail on bad input.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str(raw) {
            Ok(payload) => payload,
            Err(e) => {
                debug!(error = %e, "unparseable hook payload, substituting empty");
                Self::default()
            }
        }
    }
}

/// Read raw stdin, returning an empty string when stdin is an interactive
/// terminal (so a hand-run hook doesn't block waiting for input) or unreadable.
pub fn read_raw_stdin() -> String {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return String::new();
    }
    let mut raw = String::new();
    if let Err(e) = stdin.lock().read_to_string(&mut raw) {
        debug!(error = %e, "failed to read stdin");
        return String::new();
    }
    raw
}
