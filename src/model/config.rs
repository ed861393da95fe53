use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Configuration from taskhero.toml. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Path to the tasks document, relative to the working directory
    #[serde(default)]
    pub tasks_file: Option<PathBuf>,
    #[serde(default)]
    pub board: BoardSettings,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSettings {
    /// How long transient status-bar messages stay visible
    #[serde(default = "default_status_message_secs")]
    pub status_message_secs: u64,
    /// Popup size as a percentage of the terminal
    #[serde(default = "default_popup_percent")]
    pub popup_percent: u16,
}

impl Default for BoardSettings {
    fn default() -> Self {
        BoardSettings {
            status_message_secs: default_status_message_secs(),
            popup_percent: default_popup_percent(),
        }
    }
}

fn default_status_message_secs() -> u64 {
    3
}

fn default_popup_percent() -> u16 {
    75
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Directory for the rolling log file. Defaults to `$TMPDIR/taskhero`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Default filter directive level when RUST_LOG is unset
    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiConfig {
    /// Theme colour overrides, e.g. `highlight = "#FB4196"`
    #[serde(default)]
    pub colors: HashMap<String, String>,
    /// Priority colour overrides keyed by priority name
    #[serde(default)]
    pub priority_colors: HashMap<String, String>,
}

impl BoardConfig {
    /// Tasks file to open: CLI override, then config, then `tasks/tasks.json`
    pub fn resolve_tasks_file(&self, cli_override: Option<PathBuf>) -> PathBuf {
        cli_override
            .or_else(|| self.tasks_file.clone())
            .unwrap_or_else(|| PathBuf::from("tasks/tasks.json"))
    }
}
