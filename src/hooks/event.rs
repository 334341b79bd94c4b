use crate::hooks::payload::HookPayload;

/// Tool name that marks a subagent launch in `PreToolUse` payloads.
pub const SUBAGENT_TOOL: &str = "Task";

/// Substrings that mark a notification message as a permission request.
/// Matched case-insensitively.
const PERMISSION_KEYWORDS: &[&str] = &[
    "permission",
    "approve",
    "allow",
    "confirm",
    "waiting for",
    "awaiting",
    "input",
];

/// Claude Code lifecycle events chime handles.
///
/// The event is determined by which subcommand the host CLI invokes, not by
/// anything in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    SessionStart,
    UserPromptSubmit,
    PreToolUse,
    Notification,
    Stop,
}

impl HookEvent {
    /// The event name as it appears in Claude Code's settings.json.
    pub fn settings_name(self) -> &'static str {
        match self {
            HookEvent::SessionStart => "SessionStart",
            HookEvent::UserPromptSubmit => "UserPromptSubmit",
            HookEvent::PreToolUse => "PreToolUse",
            HookEvent::Notification => "Notification",
            HookEvent::Stop => "Stop",
        }
    }

    /// The chime subcommand that handles this event.
    pub fn subcommand(self) -> &'static str {
        match self {
            HookEvent::SessionStart => "session-start",
            HookEvent::UserPromptSubmit => "user-prompt-submit",
            HookEvent::PreToolUse => "pre-tool-use",
            HookEvent::Notification => "notification",
            HookEvent::Stop => "stop",
        }
    }

    /// All events, in lifecycle order.
    pub fn all() -> [HookEvent; 5] {
        [
            HookEvent::SessionStart,
            HookEvent::UserPromptSubmit,
            HookEvent::PreToolUse,
            HookEvent::Notification,
            HookEvent::Stop,
        ]
    }

    /// Evaluate this event's trigger predicate against a payload.
    ///
    /// SessionStart, UserPromptSubmit and Stop fire unconditionally.
    /// PreToolUse fires only for subagent launches, Notification only for
    /// permission-style messages.
    pub fn triggered_by(self, payload: &HookPayload) -> bool {
        match self {
            HookEvent::SessionStart | HookEvent::UserPromptSubmit | HookEvent::Stop => true,
            HookEvent::PreToolUse => payload.tool_name == SUBAGENT_TOOL,
            HookEvent::Notification => is_permission_request(&payload.message),
        }
    }
}

impl std::fmt::Display for HookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.subcommand())
    }
}

/// Whether a notification message indicates a permission request or that
/// Claude is waiting for input.
fn is_permission_request(message: &str) -> bool {
    if message.is_empty() {
        return false;
    }
    let lower = message.to_lowercase();
    PERMISSION_KEYWORDS.iter().any(|kw| lower.contains(kw))
}
