//! Configuration loading.
//!
//! Settings live in `~/.aitx/config.toml`; a missing file means defaults.
//! The API key can come from the config file or the `GEMINI_API_KEY`
//! environment variable, with the environment taking precedence.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Terminal emulator used for viewer and one-shot windows. Must support
    /// the -T, -e and --hold flags.
    pub visual_terminal: String,
    /// Scrollback history kept in the persistent viewer session.
    pub history_limit: u32,
    /// Gemini model name.
    pub model: String,
    /// API key; `GEMINI_API_KEY` in the environment overrides this.
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            visual_terminal: "xfce4-terminal".to_string(),
            history_limit: 30000,
            model: "gemini-1.5-flash-latest".to_string(),
            api_key: None,
        }
    }
}

impl Config {
    /// Get the global config directory path (~/.aitx/)
    pub fn global_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".aitx")
    }

    /// Get the global config file path (~/.aitx/config.toml)
    pub fn global_config_path() -> PathBuf {
        Self::global_config_dir().join("config.toml")
    }

    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load from an explicit path (must exist) or from the global path
    /// (defaults when absent).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let global = Self::global_config_path();
                if global.exists() {
                    Self::from_file(&global)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Resolve the API key: environment first, then config file.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone())
    }
}
