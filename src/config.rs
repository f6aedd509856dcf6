use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub last_index_url: Option<String>,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
    #[serde(default)]
    pub color: ColorMode,
}

fn default_locale() -> String {
    "auto".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_preview_rows() -> usize {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            last_index_url: None,
            locale: default_locale(),
            request_timeout_secs: default_timeout_secs(),
            preview_rows: default_preview_rows(),
            color: ColorMode::default(),
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

pub struct ConfigState {
    pub config: Config,
    pub path: PathBuf,
}

impl ConfigState {
    pub fn load(path: PathBuf) -> Self {
        let config = load_config(&path);
        Self { config, path }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.config)?;
        std::fs::write(&self.path, content)?;
        info!("Config saved to {:?}", self.path);
        Ok(())
    }

    /// Stores the last index URL that loaded. Saving is best effort.
    pub fn remember_index(&mut self, url: &str) {
        if self.config.last_index_url.as_deref() == Some(url) {
            return;
        }
        self.config.last_index_url = Some(url.to_string());
        if let Err(e) = self.save() {
            warn!("could not persist index url: {}", e);
        }
    }
}

pub fn get_app_data_dir() -> PathBuf {
    app_data_dir(cfg!(windows), |key| std::env::var(key).ok())
}

/// `%APPDATA%` on Windows only; elsewhere `$XDG_DATA_HOME`, then `~/.local/share`.
fn app_data_dir(windows: bool, var: impl Fn(&str) -> Option<String>) -> PathBuf {
    let base = windows
        .then(|| var("APPDATA"))
        .flatten()
        .or_else(|| var("XDG_DATA_HOME"))
        .unwrap_or_else(|| {
            let home = var("HOME").unwrap_or_else(|| ".".to_string());
            format!("{}/.local/share", home)
        });
    PathBuf::from(base).join("opendata-browser")
}

pub fn default_config_path() -> PathBuf {
    get_app_data_dir().join("config.json")
}

/// Reads the config file. A missing file yields defaults; an unreadable one is
/// reported and replaced by defaults, keeping whatever index URL can be salvaged.
pub fn load_config(config_path: &Path) -> Config {
    if !config_path.exists() {
        info!("No config found at {:?}, using defaults", config_path);
        return Config::default();
    }
    let content = std::fs::read_to_string(config_path).unwrap_or_default();
    match serde_json::from_str::<Config>(&content) {
        Ok(c) => {
            info!("Config loaded from {:?}", config_path);
            c
        }
        Err(e) => {
            warn!("Config parse failed ({}), attempting recovery", e);
            #[derive(Deserialize)]
            struct Salvage {
                last_index_url: Option<String>,
            }
            let last_index_url = serde_json::from_str::<Salvage>(&content)
                .ok()
                .and_then(|s| s.last_index_url);
            Config {
                last_index_url,
                ..Config::default()
            }
        }
    }
}
