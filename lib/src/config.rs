use crate::Result;
use serde::Deserialize;
use std::path::Path;

/// Settings for talking to the FPL API, loaded from an optional TOML file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Attempts per request, including the first
    pub max_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: "https://fantasy.premierleague.com/api".to_string(),
            timeout_secs: 30,
            user_agent: concat!("fplh/", env!("CARGO_PKG_VERSION")).to_string(),
            max_attempts: 3,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config = toml::from_str(content)?;
        Ok(config)
    }
}
