//! The best-effort side-effect dispatcher.
//!
//! One invocation = one event: evaluate the event's trigger predicate, then
//! attempt the configured side effects (sound, desktop notification) and
//! report what happened. Failures degrade to logged no-ops; the caller
//! decides nothing based on them.

use tracing::{debug, warn};

use crate::audio;
use crate::cache;
use crate::config::Config;
use crate::hooks::event::HookEvent;
use crate::hooks::payload::HookPayload;
use crate::notify::{self, Notification};

/// Display limit for the recalled prompt in the completion message.
const PROMPT_DISPLAY_CHARS: usize = 50;

/// Display limit for message text in desktop notifications.
const NOTIFICATION_BODY_CHARS: usize = 100;

/// What a dispatch attempt did.
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    /// Whether the trigger predicate matched
    pub triggered: bool,
    /// Whether an audio backend was started
    pub sound_played: bool,
    /// Whether a desktop notifier was started
    pub notified: bool,
    /// Confirmation line to print, present only if a side effect succeeded
    pub confirmation: Option<String>,
}

/// Run the dispatcher for one hook invocation.
///
/// `raw` is the unparsed stdin content, kept around so the stop event can
/// dump it for diagnostics.
pub fn dispatch(event: HookEvent, payload: &HookPayload, raw: &str, config: &Config) -> Outcome {
    if !event.triggered_by(payload) {
        debug!(%event, "trigger predicate did not match");
        return Outcome::default();
    }

    // Bookkeeping runs before the side effects so a failed playback can't
    // lose the prompt cache write or the debug dump.
    if event == HookEvent::UserPromptSubmit && !payload.prompt.is_empty() {
        if let Err(e) = cache::store_prompt(&payload.session_id, &payload.prompt) {
            warn!(error = %e, "failed to store prompt cache");
        }
    }

    let cached_prompt = if event == HookEvent::Stop {
        match cache::dump_payload(event.subcommand(), raw) {
            Ok(path) => debug!(path = %path.display(), "dumped stop payload"),
            Err(e) => debug!(error = %e, "failed to dump stop payload"),
        }
        cache::recall_prompt(&payload.session_id)
    } else {
        None
    };

    let sound_played = match config.sound_path(event) {
        Ok(path) => audio::attempt_playback(&path),
        Err(e) => {
            warn!(error = %e, "could not resolve sound path");
            false
        }
    };

    let notified = match desktop_notification(event, payload, cached_prompt.as_deref(), config) {
        Some(notification) => notify::send(&notification),
        None => false,
    };

    let confirmation = (sound_played || notified)
        .then(|| confirmation_line(event, cached_prompt.as_deref()));

    Outcome {
        triggered: true,
        sound_played,
        notified,
        confirmation,
    }
}

/// Events that carry a desktop notification alongside the sound.
fn desktop_notification(
    event: HookEvent,
    payload: &HookPayload,
    cached_prompt: Option<&str>,
    config: &Config,
) -> Option<Notification> {
    if !config.notification.enabled {
        return None;
    }
    let title = &config.notification.title;
    match event {
        HookEvent::Notification => Some(
            Notification::new(title, truncate_chars(&payload.message, NOTIFICATION_BODY_CHARS))
                .with_subtitle("Waiting"),
        ),
        HookEvent::Stop => Some(
            Notification::new(title, completion_message(cached_prompt)).with_subtitle("Stopped"),
        ),
        HookEvent::SessionStart | HookEvent::UserPromptSubmit | HookEvent::PreToolUse => None,
    }
}

fn confirmation_line(event: HookEvent, cached_prompt: Option<&str>) -> String {
    match event {
        HookEvent::SessionStart => "Session ready".into(),
        HookEvent::UserPromptSubmit => "Work started".into(),
        HookEvent::PreToolUse => "Subagent starting".into(),
        HookEvent::Notification => "Permission needed".into(),
        HookEvent::Stop => completion_message(cached_prompt),
    }
}

/// Completion message for the stop event: the recalled prompt truncated for
/// display, or a generic line when nothing was cached.
pub fn completion_message(cached_prompt: Option<&str>) -> String {
    match cached_prompt {
        Some(prompt) => format!("Completed: {}", truncate_chars(prompt, PROMPT_DISPLAY_CHARS)),
        None => "Task completed".into(),
    }
}

/// Truncate to `max` characters, appending an ellipsis if anything was cut.
fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{head}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_message_short_prompt_unmodified() {
        assert_eq!(
            completion_message(Some("fix the login bug")),
            "Completed: fix the login bug"
        );
    }

    #[test]
    fn test_completion_message_boundary_50_chars() {
        let prompt = "a".repeat(50);
        assert_eq!(completion_message(Some(&prompt)), format!("Completed: {prompt}"));
    }

    #[test]
    fn test_completion_message_truncates_to_50_plus_ellipsis() {
        let prompt = "x".repeat(80);
        let message = completion_message(Some(&prompt));
        let expected: String = "x".repeat(50);
        assert_eq!(message, format!("Completed: {expected}…"));
    }

    #[test]
    fn test_completion_message_counts_chars_not_bytes() {
        let prompt = "é".repeat(51);
        let message = completion_message(Some(&prompt));
        assert_eq!(message, format!("Completed: {}…", "é".repeat(50)));
    }

    #[test]
    fn test_completion_message_without_cache() {
        assert_eq!(completion_message(None), "Task completed");
    }

    #[test]
    fn test_dispatch_skips_untriggered_event() {
        let payload =
            serde_json::from_str::<HookPayload>(r#"{"tool_name":"Bash"}"#).unwrap();
        let outcome = dispatch(HookEvent::PreToolUse, &payload, "{}", &Config::default());
        assert!(!outcome.triggered);
        assert!(!outcome.sound_played);
        assert!(outcome.confirmation.is_none());
    }

    #[test]
    fn test_dispatch_triggered_but_all_side_effects_fail() {
        let tmp = tempfile::tempdir().unwrap();
        let config: Config = toml::from_str(&format!(
            r#"
[sounds]
dir = "{}"

[notification]
enabled = false
"#,
            tmp.path().display()
        ))
        .unwrap();

        let payload =
            serde_json::from_str::<HookPayload>(r#"{"message":"please approve"}"#).unwrap();
        let outcome = dispatch(HookEvent::Notification, &payload, "{}", &config);
        assert!(outcome.triggered);
        // No sound file in the directory and notifications disabled: the
        // invocation still succeeds, it just has nothing to confirm.
        assert!(!outcome.sound_played);
        assert!(!outcome.notified);
        assert!(outcome.confirmation.is_none());
    }

    #[test]
    fn test_dispatch_confirms_when_sound_starts() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("subagent.mp3"), b"fake").unwrap();
        let config: Config = toml::from_str(&format!(
            r#"
[sounds]
dir = "{}"

[notification]
enabled = false
"#,
            tmp.path().display()
        ))
        .unwrap();

        let payload = serde_json::from_str::<HookPayload>(r#"{"tool_name":"Task"}"#).unwrap();
        let outcome = dispatch(HookEvent::PreToolUse, &payload, "{}", &config);
        assert!(outcome.triggered);
        assert!(outcome.sound_played);
        assert_eq!(outcome.confirmation.as_deref(), Some("Subagent starting"));
    }
}
