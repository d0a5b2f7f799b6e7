//! Configuration
//!
//! Defaults, then `config.toml` from the platform config directory, then
//! `FEELIEN_*` environment variables.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{FeelienError, Result};

const DEFAULT_SYSTEM_PROMPT: &str = r"You are Feelien, a small alien who has just landed on Earth and lives inside a shell.
You do not fully understand human customs yet. Answer in one or two short sentences,
in character, letting your current mood show in how you speak.";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeelienConfig {
    /// Base URL of the alien backend
    pub backend_url: String,
    /// Interval between state polls
    pub poll_interval_ms: u64,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Prompt sent with every chat request
    pub system_prompt: String,
    /// Client identifier sent to `/api/alien`
    pub source: String,
    /// Talk to the backend at all; `false` keeps every command local
    pub backend_enabled: bool,
}

impl Default for FeelienConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:3001".to_string(),
            poll_interval_ms: 1000,
            timeout_seconds: 30,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            source: "web".to_string(),
            backend_enabled: true,
        }
    }
}

impl FeelienConfig {
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "feelien", "feelien").map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Read a TOML file; missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| FeelienError::configuration(format!("Failed to read config: {e}")))?;
        toml::from_str(&content)
            .map_err(|e| FeelienError::configuration(format!("Invalid TOML config: {e}")))
    }

    /// Override fields from `FEELIEN_*` variables looked up through `var`.
    ///
    /// Unparseable numbers keep the current value.
    pub fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = var("FEELIEN_BACKEND_URL") {
            self.backend_url = url;
        }
        if let Some(interval) = var("FEELIEN_POLL_INTERVAL_MS") {
            self.poll_interval_ms = interval.parse().unwrap_or(self.poll_interval_ms);
        }
        if let Some(timeout) = var("FEELIEN_TIMEOUT_SECONDS") {
            self.timeout_seconds = timeout.parse().unwrap_or(self.timeout_seconds);
        }
        if let Some(enabled) = var("FEELIEN_BACKEND_ENABLED") {
            self.backend_enabled = enabled.parse().unwrap_or(self.backend_enabled);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend_url.trim().is_empty() {
            return Err(FeelienError::configuration("Backend URL cannot be empty"));
        }
        if !self.backend_url.starts_with("http://") && !self.backend_url.starts_with("https://") {
            return Err(FeelienError::configuration(format!(
                "Backend URL must start with http:// or https://, got {}",
                self.backend_url
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(FeelienError::configuration(
                "Poll interval must be greater than 0",
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(FeelienError::configuration(
                "Timeout must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Load the configuration from `path`, or the default location when `None`.
pub fn load_config(path: Option<&Path>) -> Result<FeelienConfig> {
    let path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => FeelienConfig::config_path(),
    };

    let mut config = match path {
        Some(p) if p.exists() => {
            debug!("Loading config from {}", p.display());
            FeelienConfig::from_file(&p)?
        }
        _ => FeelienConfig::default(),
    };

    config.apply_overrides(|key| env::var(key).ok());
    config.validate()?;
    Ok(config)
}

pub fn save_config(config: &FeelienConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| FeelienError::configuration(format!("Failed to create config dir: {e}")))?;
    }

    let content = toml::to_string_pretty(config)
        .map_err(|e| FeelienError::configuration(format!("Failed to serialize config: {e}")))?;

    fs::write(path, content)
        .map_err(|e| FeelienError::configuration(format!("Failed to write config: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = FeelienConfig::default();
        assert_eq!(config.backend_url, "http://localhost:3001");
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.source, "web");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "backend_url = \"http://alien.local:8080\"\n").unwrap();

        let config = FeelienConfig::from_file(&path).unwrap();
        assert_eq!(config.backend_url, "http://alien.local:8080");
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = FeelienConfig {
            poll_interval_ms: 250,
            ..FeelienConfig::default()
        };
        save_config(&config, &path).unwrap();
        assert_eq!(FeelienConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "poll_interval_ms = \"soon\"").unwrap();
        assert!(matches!(
            FeelienConfig::from_file(&path),
            Err(FeelienError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("FEELIEN_BACKEND_URL", "https://example.org"),
            ("FEELIEN_POLL_INTERVAL_MS", "500"),
            ("FEELIEN_TIMEOUT_SECONDS", "not a number"),
            ("FEELIEN_BACKEND_ENABLED", "false"),
        ]
        .into_iter()
        .collect();

        let mut config = FeelienConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| (*v).to_string()));
        assert_eq!(config.backend_url, "https://example.org");
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.timeout_seconds, 30);
        assert!(!config.backend_enabled);
    }

    #[test]
    fn test_backend_switch_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "backend_enabled = false\n").unwrap();

        let config = FeelienConfig::from_file(&path).unwrap();
        assert!(!config.backend_enabled);
        assert!(FeelienConfig::default().backend_enabled);
    }

    #[test]
    fn test_validation() {
        let zero_interval = FeelienConfig {
            poll_interval_ms: 0,
            ..FeelienConfig::default()
        };
        assert!(zero_interval.validate().is_err());

        let bad_scheme = FeelienConfig {
            backend_url: "localhost:3001".to_string(),
            ..FeelienConfig::default()
        };
        assert!(bad_scheme.validate().is_err());
    }
}
