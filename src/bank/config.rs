//! Registry policy knobs, loadable from a JSON file.
use std::{fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

/// What closing an account does once its close rule holds.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClosePolicy {
    /// Stamp the close date, making the account inactive.
    #[default]
    SetCloseDate,
    /// Only report whether the account could be closed.
    CheckOnly,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RegistryConfig {
    pub max_current_accounts_per_bank: usize,
    pub max_deposit_accounts_per_bank: usize,
    pub close_policy: ClosePolicy,
    /// How many account numbers to try before giving up on a collision.
    pub account_number_attempts: u32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_current_accounts_per_bank: 3,
            max_deposit_accounts_per_bank: 1,
            close_policy: ClosePolicy::default(),
            account_number_attempts: 8,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl RegistryConfig {
    /// Reads the configuration from a JSON file. Missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(data)?)
    }
}
