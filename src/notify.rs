//! Best-effort desktop notifications.
//!
//! Notifications are delivered by spawning a platform notifier process and
//! not waiting for it. A missing notifier chains to the next candidate;
//! nothing here returns an error to the caller.

use std::process::{Command, Stdio};

use tracing::debug;

/// A desktop notification: title, body, optional subtitle.
#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub subtitle: Option<String>,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            subtitle: None,
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }
}

/// Show the notification through the first notifier that spawns.
/// Returns `true` if one was started.
pub fn send(notification: &Notification) -> bool {
    for mut cmd in notifier_commands(notification) {
        match cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(_child) => {
                debug!(program = ?cmd.get_program(), "spawned notifier");
                return true;
            }
            Err(e) => {
                debug!(program = ?cmd.get_program(), error = %e, "notifier unavailable");
            }
        }
    }
    eprintln!("chime: no usable desktop notifier");
    false
}

#[cfg(target_os = "macos")]
fn notifier_commands(notification: &Notification) -> Vec<Command> {
    let mut commands = Vec::new();

    let mut tn = Command::new("terminal-notifier");
    tn.args(["-title", &notification.title, "-message", &notification.body]);
    if let Some(subtitle) = &notification.subtitle {
        tn.args(["-subtitle", subtitle]);
    }
    commands.push(tn);

    let mut osa = Command::new("osascript");
    osa.args(["-e", &applescript(notification)]);
    commands.push(osa);

    commands
}

#[cfg(not(target_os = "macos"))]
fn notifier_commands(notification: &Notification) -> Vec<Command> {
    // notify-send has no subtitle; fold it into the body.
    let body = match &notification.subtitle {
        Some(subtitle) => format!("{subtitle}\n{}", notification.body),
        None => notification.body.clone(),
    };
    let mut cmd = Command::new("notify-send");
    cmd.arg(&notification.title).arg(body);
    vec![cmd]
}

#[cfg(target_os = "macos")]
fn applescript(notification: &Notification) -> String {
    let mut script = format!(
        "display notification \"{}\" with title \"{}\"",
        escape_applescript(&notification.body),
        escape_applescript(&notification.title),
    );
    if let Some(subtitle) = &notification.subtitle {
        script.push_str(&format!(" subtitle \"{}\"", escape_applescript(subtitle)));
    }
    script
}

#[cfg(target_os = "macos")]
fn escape_applescript(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
