//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "SUITE_SYNC";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Backend base URL from SUITE_SYNC_URL
    pub base_url: Option<String>,
    /// API token from SUITE_SYNC_TOKEN
    pub api_token: Option<String>,
    /// Timeout from SUITE_SYNC_TIMEOUT
    pub timeout_secs: Option<u64>,
    /// Poll interval from SUITE_SYNC_POLL_INTERVAL_MS
    pub poll_interval_ms: Option<u64>,
    /// Config file from SUITE_SYNC_CONFIG
    pub config_file: Option<String>,
    /// Verbose from SUITE_SYNC_VERBOSE
    pub verbose: Option<bool>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            base_url: get_env("URL"),
            api_token: get_env("TOKEN"),
            timeout_secs: get_env_parse("TIMEOUT"),
            poll_interval_ms: get_env_parse("POLL_INTERVAL_MS"),
            config_file: get_env("CONFIG"),
            verbose: get_env_bool("VERBOSE"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.base_url.is_some()
            || self.api_token.is_some()
            || self.timeout_secs.is_some()
            || self.poll_interval_ms.is_some()
            || self.config_file.is_some()
            || self.verbose.is_some()
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Builder for setting environment variables (useful for testing)
pub struct EnvBuilder {
    vars: Vec<(String, String)>,
}

impl EnvBuilder {
    /// Create a new environment builder
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    /// Set backend base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_URL"), url.into()));
        self
    }

    /// Set API token
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_TOKEN"), token.into()));
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: u64) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_TIMEOUT"), timeout.to_string()));
        self
    }

    /// Set verbose
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_VERBOSE"), verbose.to_string()));
        self
    }

    /// Apply environment variables
    pub fn apply(self) {
        for (key, value) in self.vars {
            env::set_var(key, value);
        }
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        self.apply();

        EnvGuard { previous }
    }
}

impl Default for EnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that restores environment variables on drop
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}
