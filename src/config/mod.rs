//! Configuration
//!
//! Backend endpoint and polling settings, loadable from YAML or JSON files
//! with environment variable overrides.

pub mod env;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use self::env::EnvConfig;

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./suite-sync.yaml",
    "./suite-sync.yml",
    "./.suite-sync.yaml",
];

/// Application configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the test-execution backend
    pub base_url: String,

    /// Bearer token for authenticated backends
    pub api_token: Option<String>,

    /// HTTP timeout in seconds
    pub timeout_secs: u64,

    /// Interval between job status polls in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9000".to_string(),
            api_token: None,
            timeout_secs: 30,
            poll_interval_ms: 1000,
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Find a configuration file in the standard locations
    pub fn find() -> Option<PathBuf> {
        for location in CONFIG_LOCATIONS {
            let path = PathBuf::from(location);
            if path.exists() {
                return Some(path);
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("suite-sync").join("config.yaml");
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    /// Load configuration from the default location, falling back to defaults
    pub fn load_default() -> Result<Self> {
        match Self::find() {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    pub fn apply_env(&mut self, env: &EnvConfig) {
        if let Some(base_url) = &env.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(api_token) = &env.api_token {
            self.api_token = Some(api_token.clone());
        }
        if let Some(timeout_secs) = env.timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        if let Some(poll_interval_ms) = env.poll_interval_ms {
            self.poll_interval_ms = poll_interval_ms;
        }
    }

    /// Poll interval as a duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
