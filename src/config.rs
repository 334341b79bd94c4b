use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::hooks::HookEvent;

/// Main configuration for chime
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub sounds: SoundsConfig,
    pub notification: NotificationConfig,
}

/// Configuration for sound assets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundsConfig {
    /// Directory containing the sound files. Defaults to `<config dir>/sounds`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Played when a session starts or resumes
    pub session_start: String,
    /// Played when the user submits a prompt
    pub prompt_submit: String,
    /// Played when a subagent (Task tool) is about to run
    pub subagent: String,
    /// Played when Claude asks for permission or waits for input
    pub permission: String,
    /// Played when Claude finishes responding
    pub complete: String,
}

impl Default for SoundsConfig {
    fn default() -> Self {
        Self {
            dir: None,
            session_start: "session-start.mp3".into(),
            prompt_submit: "work-start.mp3".into(),
            subagent: "subagent.mp3".into(),
            permission: "permission.mp3".into(),
            complete: "work-complete.mp3".into(),
        }
    }
}

/// Configuration for desktop notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Whether to show desktop notifications at all
    pub enabled: bool,
    /// Notification title
    pub title: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: "Claude Code".into(),
        }
    }
}

impl Config {
    /// Load the config file, falling back to defaults if it doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// The user-level config directory.
    ///
    /// `CHIME_CONFIG_DIR` takes precedence so tests and unusual setups can
    /// redirect it; otherwise the platform config dir is used.
    pub fn config_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("CHIME_CONFIG_DIR") {
            if !dir.is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }
        let project_dirs = directories::ProjectDirs::from("dev", "chime", "chime")
            .context("Failed to determine user directories")?;
        Ok(project_dirs.config_dir().to_path_buf())
    }

    /// Path to `config.toml` inside the config directory.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// The user-level cache directory (prompt cache, debug dumps).
    ///
    /// `CHIME_CACHE_DIR` takes precedence, mirroring `CHIME_CONFIG_DIR`.
    pub fn cache_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("CHIME_CACHE_DIR") {
            if !dir.is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }
        let project_dirs = directories::ProjectDirs::from("dev", "chime", "chime")
            .context("Failed to determine user directories")?;
        Ok(project_dirs.cache_dir().to_path_buf())
    }

    /// Directory holding the sound files.
    pub fn soundtrack_dir(&self) -> Result<PathBuf> {
        match &self.sounds.dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::config_dir()?.join("sounds")),
        }
    }

    /// Resolve the sound file for an event.
    pub fn sound_path(&self, event: HookEvent) -> Result<PathBuf> {
        let filename = match event {
            HookEvent::SessionStart => &self.sounds.session_start,
            HookEvent::UserPromptSubmit => &self.sounds.prompt_submit,
            HookEvent::PreToolUse => &self.sounds.subagent,
            HookEvent::Notification => &self.sounds.permission,
            HookEvent::Stop => &self.sounds.complete,
        };
        Ok(self.soundtrack_dir()?.join(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.sounds.dir.is_none());
        assert_eq!(config.sounds.session_start, "session-start.mp3");
        assert_eq!(config.sounds.complete, "work-complete.mp3");
        assert!(config.notification.enabled);
        assert_eq!(config.notification.title, "Claude Code");
    }

    #[test]
    fn test_parse_partial_config() {
        // Absent sections and fields fall back to defaults
        let toml_str = r#"
[sounds]
complete = "tada.mp3"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sounds.complete, "tada.mp3");
        assert_eq!(config.sounds.session_start, "session-start.mp3");
        assert!(config.notification.enabled);
    }

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[sounds]
dir = "/tmp/sounds"
session_start = "a.mp3"
prompt_submit = "b.mp3"
subagent = "c.mp3"
permission = "d.mp3"
complete = "e.mp3"

[notification]
enabled = false
title = "My Agent"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sounds.dir, Some(PathBuf::from("/tmp/sounds")));
        assert_eq!(config.sounds.subagent, "c.mp3");
        assert!(!config.notification.enabled);
        assert_eq!(config.notification.title, "My Agent");
    }

    #[test]
    fn test_sound_path_uses_configured_dir() {
        let config: Config = toml::from_str(
            r#"
[sounds]
dir = "/tmp/sounds"
permission = "alert.mp3"
"#,
        )
        .unwrap();
        let path = config.sound_path(HookEvent::Notification).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/sounds/alert.mp3"));
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.sounds.prompt_submit, config.sounds.prompt_submit);
        assert_eq!(deserialized.notification.enabled, config.notification.enabled);
    }
}
