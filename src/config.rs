//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::Result;
use crate::error::Error;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Knowledge base (Wikipedia) settings
    #[serde(default)]
    pub wiki: WikiConfig,

    /// Maximum agent steps per request
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Model override; the provider default is used when unset
    #[serde(default)]
    pub model: Option<String>,
}

/// Wikipedia client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiConfig {
    /// Wikipedia language code (subdomain)
    #[serde(default = "default_language")]
    pub language: String,

    /// User-Agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum summary length in characters before truncation
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// HTTP request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_user_agent() -> String {
    "AI-Term-Explainer/1.0".to_string()
}

fn default_max_length() -> usize {
    500
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_steps() -> usize {
    5
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            user_agent: default_user_agent(),
            max_length: default_max_length(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wiki: WikiConfig::default(),
            max_steps: default_max_steps(),
            model: None,
        }
    }
}

impl Config {
    /// Apply `TERM_EXPLAINER_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(language) = lookup("TERM_EXPLAINER_LANGUAGE").filter(|v| !v.is_empty()) {
            self.wiki.language = language;
        }

        if let Some(raw) = lookup("TERM_EXPLAINER_MAX_LENGTH").filter(|v| !v.is_empty()) {
            self.wiki.max_length = raw.trim().parse().map_err(|_| {
                Error::Config(format!("TERM_EXPLAINER_MAX_LENGTH is not a number: {}", raw))
            })?;
        }

        Ok(())
    }
}

/// Get the config directory path
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".term-explainer")
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Load configuration from the default path, then the environment.
///
/// A missing config file is not an error: every field has a default.
pub fn load() -> Result<Config> {
    dotenvy::dotenv().ok();

    let mut config = load_from(&config_path())?;
    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    Ok(config)
}

/// Load configuration from a specific file
pub fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!("No config at {:?}, using defaults", path);
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}

/// Save configuration to a specific file
pub fn save_to(config: &Config, path: &Path) -> Result<()> {
    // Create parent directory
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Write a default config to the default path. See [`init_at`].
pub fn init(force: bool) -> Result<(PathBuf, bool)> {
    let path = config_path();
    let written = init_at(&path, force)?;
    Ok((path, written))
}

/// Write a default config unless one exists and `force` is off.
///
/// The existing file is never parsed, so a broken config can be replaced.
/// Returns whether the file was written.
pub fn init_at(path: &Path, force: bool) -> Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    save_to(&Config::default(), path)?;
    Ok(true)
}
