//! Client configuration.
//!
//! Loads the client configuration from `~/.config/sheetchat/config.toml`,
//! falling back to defaults when the file is absent. A malformed file is a
//! configuration error rather than a silent fallback.

use serde::{Deserialize, Serialize};
use sheetchat_core::error::{Result, SheetchatError};
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = "sheetchat";
const CONFIG_FILE: &str = "config.toml";

/// Connection settings for the analysis backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the backend, without a trailing slash.
    pub base_url: String,
    /// Overall request timeout. Streaming turns can legitimately run for
    /// minutes, so this is deliberately generous; it is the only bound on
    /// stream duration.
    pub request_timeout_secs: u64,
    /// Connection establishment timeout.
    pub connect_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 300,
            connect_timeout_secs: 10,
        }
    }
}

impl ClientConfig {
    /// Loads the configuration from the default location, returning
    /// defaults when no file exists.
    pub fn load_or_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Loads the configuration from an explicit path.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SheetchatError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config = toml::from_str(&raw)?;
        Ok(config)
    }

    /// Default config file location under the user config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Base URL with any trailing slash removed.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
