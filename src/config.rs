//! Registry Configuration

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuncConfig {
    /// Leave out every function that reads the clock, the environment or
    /// an entropy source.
    #[serde(default)]
    pub hermetic: bool,
    /// Fixed seed for random strings. Unset means OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Only these variables are visible to `env`/`expandenv` when set.
    #[serde(default)]
    pub env_allowlist: Option<Vec<String>>,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl Default for FuncConfig {
    fn default() -> Self {
        Self {
            hermetic: false,
            seed: None,
            env_allowlist: None,
            date_format: default_date_format(),
        }
    }
}

impl FuncConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn env_visible(&self, name: &str) -> bool {
        self.env_allowlist
            .as_ref()
            .map_or(true, |allowed| allowed.iter().any(|a| a == name))
    }
}
