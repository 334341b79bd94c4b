use std::path::PathBuf;
use tempfile::TempDir;

/// Sound filenames matching the default chime config.
pub const DEFAULT_SOUNDS: &[&str] = &[
    "session-start.mp3",
    "work-start.mp3",
    "subagent.mp3",
    "permission.mp3",
    "work-complete.mp3",
];

/// An isolated chime environment: temp config, cache and home directories
/// wired up through `CHIME_CONFIG_DIR` / `CHIME_CACHE_DIR` / `HOME`.
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        for sub in ["config/sounds", "cache", "home"] {
            std::fs::create_dir_all(dir.path().join(sub)).expect("failed to create env dirs");
        }
        let env = Self { dir };
        // Point the soundtrack dir at the temp sounds dir and disable
        // desktop notifications so confirmations depend only on playback.
        env.write_config(&format!(
            "[sounds]\ndir = \"{}\"\n\n[notification]\nenabled = false\n",
            env.sounds_dir().display()
        ));
        env
    }

    pub fn config_dir(&self) -> PathBuf {
        self.dir.path().join("config")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.dir.path().join("cache")
    }

    pub fn home_dir(&self) -> PathBuf {
        self.dir.path().join("home")
    }

    pub fn sounds_dir(&self) -> PathBuf {
        self.config_dir().join("sounds")
    }

    pub fn write_config(&self, content: &str) {
        std::fs::write(self.config_dir().join("config.toml"), content)
            .expect("failed to write config");
    }

    /// Create a dummy sound file. Playback backends only need the file to
    /// exist to accept the job.
    pub fn write_sound(&self, name: &str) {
        std::fs::write(self.sounds_dir().join(name), b"fake audio")
            .expect("failed to write sound");
    }

    pub fn write_all_sounds(&self) {
        for name in DEFAULT_SOUNDS {
            self.write_sound(name);
        }
    }

    /// A `chime` command with this environment's directories applied.
    pub fn chime(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::new(Self::chime_bin());
        cmd.env("CHIME_CONFIG_DIR", self.config_dir())
            .env("CHIME_CACHE_DIR", self.cache_dir())
            .env("HOME", self.home_dir());
        cmd
    }

    /// Return the path to the chime binary (built via cargo).
    pub fn chime_bin() -> PathBuf {
        PathBuf::from(env!("CARGO_BIN_EXE_chime"))
    }
}
