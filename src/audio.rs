//! Best-effort audio playback.
//!
//! Playback is fire-and-forget: a platform player is spawned as a detached
//! child process, or failing that a rodio thread is started. Nothing waits
//! for playback to finish and nothing here returns an error to the caller.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

#[cfg(target_os = "macos")]
const PLAYERS: &[&str] = &["afplay"];
#[cfg(not(target_os = "macos"))]
const PLAYERS: &[&str] = &["paplay", "aplay", "mpg123"];

/// Attempt to play a sound file through the first backend that accepts it.
///
/// Returns `true` if a backend was started, `false` if the file is missing
/// or no backend is available. Diagnostics go to stderr only.
pub fn attempt_playback(path: &Path) -> bool {
    if !path.exists() {
        eprintln!("chime: sound file not found: {}", path.display());
        return false;
    }

    if spawn_native_player(path) {
        return true;
    }
    if spawn_fallback_thread(path.to_path_buf()) {
        return true;
    }

    eprintln!("chime: no usable audio backend for {}", path.display());
    false
}

/// Try the platform players in order, detaching the first one that spawns.
fn spawn_native_player(path: &Path) -> bool {
    for player in PLAYERS {
        match Command::new(player)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(_child) => {
                debug!(player, path = %path.display(), "spawned native player");
                return true;
            }
            Err(e) => {
                debug!(player, error = %e, "player unavailable");
            }
        }
    }
    false
}

/// Start rodio playback on a detached thread. The thread is never joined;
/// playback simply stops if the process exits first.
fn spawn_fallback_thread(path: PathBuf) -> bool {
    let spawned = std::thread::Builder::new()
        .name("chime-playback".into())
        .spawn(move || {
            if let Err(e) = play_with_rodio(&path) {
                debug!(error = %e, "fallback playback failed");
            }
        });
    match spawned {
        Ok(_handle) => true,
        Err(e) => {
            debug!(error = %e, "failed to start playback thread");
            false
        }
    }
}

fn play_with_rodio(path: &Path) -> anyhow::Result<()> {
    let (_stream, handle) = rodio::OutputStream::try_default()?;
    let sink = rodio::Sink::try_new(&handle)?;
    let file = std::fs::File::open(path)?;
    let source = rodio::Decoder::new(std::io::BufReader::new(file))?;
    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}
