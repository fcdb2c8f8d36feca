use crate::app_dirs::AppDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Tuning knobs for a timer session. Built once at startup and passed by
/// reference; nothing reads these values from global state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// tick interval for targets under one minute
    pub tick_fast_ms: u64,
    /// tick interval for targets between one and ten minutes
    pub tick_medium_ms: u64,
    /// tick interval for long targets and stopwatch mode
    pub tick_slow_ms: u64,
    /// remaining time below which a countdown is highlighted
    pub warning_threshold_secs: u64,
    pub key_buffer_size: usize,
    pub escape_timeout_ms: u64,
    pub default_width: u16,
    pub default_height: u16,
    pub notify: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_fast_ms: 100,
            tick_medium_ms: 500,
            tick_slow_ms: 1000,
            warning_threshold_secs: 5 * 60,
            key_buffer_size: 10,
            escape_timeout_ms: 50,
            default_width: 80,
            default_height: 24,
            notify: true,
        }
    }
}

impl Config {
    pub fn warning_threshold(&self) -> Duration {
        Duration::from_secs(self.warning_threshold_secs)
    }

    pub fn escape_timeout(&self) -> Duration {
        Duration::from_millis(self.escape_timeout_ms)
    }

    pub fn default_viewport(&self) -> (u16, u16) {
        (self.default_width, self.default_height)
    }

    /// Bounded queues need room for at least one key.
    pub fn key_capacity(&self) -> usize {
        self.key_buffer_size.max(1)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("tock_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            log::debug!("no config at {}, using defaults", self.path.display());
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("ignoring malformed config {}: {e}", self.path.display());
                Config::default()
            }
        }
    }
}
