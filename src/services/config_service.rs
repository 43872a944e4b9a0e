use std::fs;
use std::path::PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

fn default_backend_url() -> String {
    "http://127.0.0.1:5001/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_selection_quiet_ms() -> u64 {
    crate::editor::DEFAULT_QUIET_PERIOD_MS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the REST backend, including the `/api` prefix.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Quiet period of the selection tracker, in milliseconds.
    #[serde(default = "default_selection_quiet_ms")]
    pub selection_quiet_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            request_timeout_secs: default_request_timeout_secs(),
            selection_quiet_ms: default_selection_quiet_ms(),
        }
    }
}

pub fn get_app_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| Error::Config("could not find data directory".to_string()))?
        .join("Novelkit");

    if !data_dir.exists() {
        fs::create_dir_all(&data_dir).map_err(|e| Error::Config(e.to_string()))?;
    }

    Ok(data_dir)
}

fn get_config_path() -> Result<PathBuf> {
    Ok(get_app_data_dir()?.join("config.json"))
}

pub fn load_config() -> Result<Config> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&config_path)
        .map_err(|e| Error::Config(format!("failed to read config: {e}")))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse config: {e}")))
}

pub fn save_config(config: &Config) -> Result<()> {
    let config_path = get_config_path()?;
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))?;
    fs::write(&config_path, content)
        .map_err(|e| Error::Config(format!("failed to write config: {e}")))?;
    Ok(())
}

pub fn set_backend_url(backend_url: &str) -> Result<()> {
    url::Url::parse(backend_url)
        .map_err(|e| Error::Config(format!("invalid backend URL: {e}")))?;
    let mut config = load_config().unwrap_or_default();
    config.backend_url = backend_url.to_string();
    save_config(&config)
}
