//! User settings
//!
//! Settings come from a JSON file (by default `config.json` in the XDG config
//! directory, e.g. `~/.config/persona-router/` on Linux) and are then
//! overridden by command-line flags.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::cli::Cli;
use crate::debounce::{MAX_DEBOUNCE, MIN_DEBOUNCE};

/// Application name used for XDG directories
pub const APP_NAME: &str = "persona-router";

/// Name of the settings file inside the config directory
const CONFIG_FILE: &str = "config.json";

/// Errors that can occur while loading settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid JSON for `Settings`
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A setting has an unusable value
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Runtime settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Lifetime of routing cache entries, in seconds
    pub cache_ttl_secs: u64,
    /// Typing inactivity before a question is routed, in milliseconds
    pub debounce_ms: u64,
    /// Base URL of the routing backend; keyword classification when unset
    pub api_url: Option<String>,
    /// Timeout for backend requests, in seconds
    pub request_timeout_secs: u64,
    /// Default log filter when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300,
            debounce_ms: 500,
            api_url: None,
            request_timeout_secs: 10,
            log_level: "info".to_string(),
        }
    }
}

/// Returns the XDG project directories for the application
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}

impl Settings {
    /// Path of the default settings file, if a home directory exists
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Loads settings from `path`, or from the default location
    ///
    /// An explicit path must exist. A missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::read_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::read_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Reads and parses one settings file
    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads settings for a parsed command line, applying its overrides and
    /// validating the result
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut settings = Self::load(cli.config.as_deref())?;
        settings.apply_cli(cli);
        settings.validate()?;
        Ok(settings)
    }

    /// Overrides file values with flags given on the command line
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(ttl) = cli.ttl_secs {
            self.cache_ttl_secs = ttl;
        }
        if let Some(debounce) = cli.debounce_ms {
            self.debounce_ms = debounce;
        }
        if let Some(url) = &cli.api_url {
            self.api_url = Some(url.clone());
        }
        if let Some(timeout) = cli.timeout_secs {
            self.request_timeout_secs = timeout;
        }
    }

    /// Rejects values the application cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "cache_ttl_secs must be greater than 0".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        let debounce = self.debounce();
        if debounce < MIN_DEBOUNCE || debounce > MAX_DEBOUNCE {
            return Err(ConfigError::Invalid(format!(
                "debounce_ms must be between {} and {}, got {}",
                MIN_DEBOUNCE.as_millis(),
                MAX_DEBOUNCE.as_millis(),
                self.debounce_ms
            )));
        }

        if let Some(url) = &self.api_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "api_url must start with http:// or https://, got '{}'",
                    url
                )));
            }
        }

        Ok(())
    }

    /// Cache TTL as a duration
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Debounce delay as a duration
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Backend request timeout as a duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
