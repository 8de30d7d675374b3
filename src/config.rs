use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::probe::tasks::DEFAULT_TASK_COUNT;
use crate::probe::timers::{DEFAULT_TIMER_COUNT, DEFAULT_TIMER_DELAY};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tasks: TasksConfig,
    pub timers: TimersConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TasksConfig {
    pub count: usize,
}

impl Default for TasksConfig {
    fn default() -> Self {
        TasksConfig {
            count: DEFAULT_TASK_COUNT,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TimersConfig {
    pub count: usize,
    pub delay_secs: u64,
}

impl Default for TimersConfig {
    fn default() -> Self {
        TimersConfig {
            count: DEFAULT_TIMER_COUNT,
            delay_secs: DEFAULT_TIMER_DELAY.as_secs(),
        }
    }
}

impl TimersConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("memprobe").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}

/// Explicit `--config` path wins; otherwise the per-user config file, if any.
pub fn load_config_for(path: Option<&Path>) -> Config {
    match path {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    }
}
