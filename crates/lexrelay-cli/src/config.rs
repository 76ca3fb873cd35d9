//! CLI configuration file support
//!
//! Loads configuration from ~/.config/lexrelay/config.toml

use lexrelay_core::DEFAULT_MODEL;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cli::Cli;

/// Relay used when neither a flag nor the config file names one.
pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:8080";

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Relay connection settings
    #[serde(default)]
    pub relay: RelayConfig,
}

/// Relay connection settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Relay base URL
    pub url: Option<String>,
    /// Bearer key presented to the relay
    pub api_key: Option<String>,
    /// Model requested for every reply
    pub model: Option<String>,
}

/// Effective connection settings after flags, environment and file are merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub relay_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl CliConfig {
    /// Load configuration from default path
    pub fn load() -> Self {
        Self::load_from_path(Self::default_path())
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: Option<PathBuf>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), error = %err, "Ignoring unreadable config");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Get the default configuration file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("lexrelay").join("config.toml"))
    }

    /// Merge with command-line values, which win over the file.
    pub fn resolve(&self, cli: &Cli) -> Settings {
        self.resolve_with(
            cli.relay_url.as_deref(),
            cli.api_key.as_deref(),
            cli.model.as_deref(),
        )
    }

    fn resolve_with(
        &self,
        relay_url: Option<&str>,
        api_key: Option<&str>,
        model: Option<&str>,
    ) -> Settings {
        let pick = |flag: Option<&str>, file: &Option<String>| {
            flag.or(file.as_deref())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        Settings {
            relay_url: pick(relay_url, &self.relay.url)
                .unwrap_or_else(|| DEFAULT_RELAY_URL.to_string()),
            api_key: pick(api_key, &self.relay.api_key),
            model: pick(model, &self.relay.model).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }
}
