//! Configuration management for odrive
//!
//! Loads optional overrides from ~/.odrive/config.json; every field has a
//! working default so the tool runs without any configuration step.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::{OdriveError, Result};

/// Well-known public client id used by the device-code flow
const DEFAULT_CLIENT_ID: &str = "d3590ed6-52b3-4102-aeff-aad2292ab01c";
const DEFAULT_AUTHORITY_URL: &str = "https://login.microsoftonline.com/common/oauth2/v2.0";
const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";
const DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Tool configuration, all fields overridable via the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub client_id: String,
    pub authority_url: String,
    pub graph_base_url: String,
    pub scope: String,
    /// Seconds between device-code token polls (provider may override)
    pub poll_interval_secs: u64,
    /// Upper bound on device-code token polls before giving up
    pub max_poll_attempts: u32,
    /// Token file location; defaults to ~/.odrive/tokens.txt
    pub token_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            authority_url: DEFAULT_AUTHORITY_URL.to_string(),
            graph_base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            poll_interval_secs: 3,
            max_poll_attempts: 100,
            token_file: None,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|h| h.join(".odrive"))
            .ok_or_else(|| OdriveError::Config("Could not find home directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load configuration from file, or defaults when no file exists
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Resolve the token file path
    pub fn token_path(&self) -> Result<PathBuf> {
        match &self.token_file {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("tokens.txt")),
        }
    }

    /// Scope requested during device-code login (adds offline_access so a
    /// refresh token is issued)
    pub fn login_scope(&self) -> String {
        format!("{} offline_access", self.scope)
    }
}
