//! Configuration management (`config.toml` in the platform config directory)
//!
//! Handles loading, saving, and providing defaults for pipeline settings.
//! Every section and field is optional in the file; missing values fall back
//! to the defaults below.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::reconcile::AssemblyConfig;

const CONFIG_FILE: &str = "config.toml";

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Game window automation
    #[serde(default)]
    pub capture: CaptureConfig,
    /// Classifier worker pool
    #[serde(default)]
    pub classify: ClassifyConfig,
    /// Piece assembly
    #[serde(default)]
    pub assembly: AssemblyConfig,
}

/// Capture settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Give up waiting for the game window after this long (default: 30)
    #[serde(default = "default_ready_timeout_secs")]
    pub ready_timeout_secs: u64,
    /// Delay between window readiness checks (default: 250)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// Classifier pool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyConfig {
    /// Number of classifier threads (default: 4, minimum 1)
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Screenshots buffered before capture blocks (default: 16, minimum 1)
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_ready_timeout_secs() -> u64 {
    30
}
fn default_poll_interval_ms() -> u64 {
    250
}
fn default_workers() -> usize {
    4
}
fn default_queue_capacity() -> usize {
    16
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            ready_timeout_secs: default_ready_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl CaptureConfig {
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\Spyglass\config`
/// On macOS: `~/Library/Application Support/io.spyglass.Spyglass`
/// On Linux: `~/.config/Spyglass`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.spyglass", "", "Spyglass")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Path of the default config file, if a config directory exists
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Loads the configuration from the platform config directory.
///
/// Returns defaults if the file doesn't exist. A file that exists but cannot
/// be parsed is logged and also yields defaults.
pub fn load() -> Config {
    let Some(path) = config_path().filter(|path| path.exists()) else {
        return Config::default();
    };
    load_from(&path).unwrap_or_else(|err| {
        warn!("ignoring config file: {err:#}");
        Config::default()
    })
}

/// Loads the configuration from a specific file.
///
/// # Errors
///
/// Returns an error naming the file if it cannot be read or parsed.
pub fn load_from(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// Saves the configuration to the platform config directory.
///
/// Creates the directory if it doesn't exist. Returns the written path, or
/// `None` if there is no config directory on this platform.
pub fn save(config: &Config) -> Result<Option<PathBuf>> {
    let Some(path) = config_path() else {
        return Ok(None);
    };
    save_to(config, &path)?;
    Ok(Some(path))
}

/// Saves the configuration to a specific file, creating parent directories.
pub fn save_to(config: &Config, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let content = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}
