//! Vote configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use mapvote_utils::LogFormat;

use crate::VoteError;

/// Configuration for the map vote.
///
/// Loaded from TOML via [`VoteConfig::from_toml_file`] or built in code.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoteConfig {
    /// Chat prefix that addresses the vote.
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,

    /// JSON rule file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_rules_path: Option<PathBuf>,

    /// Layer list (one id per line, or a JSON array).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,

    /// Players needed before a vote opens on its own.
    #[serde(default = "default_min_players")]
    pub min_players_for_vote: usize,

    /// Delay between round start and the first attempt to open the vote.
    #[serde(default = "default_start_delay_secs")]
    pub start_delay_secs: u64,

    /// How often the candidate list is re-broadcast while collecting.
    #[serde(default = "default_broadcast_interval_secs")]
    pub broadcast_interval_secs: u64,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_command_prefix() -> String {
    "!vote".to_string()
}

fn default_min_players() -> usize {
    50
}

fn default_start_delay_secs() -> u64 {
    20 * 60
}

fn default_broadcast_interval_secs() -> u64 {
    15 * 60
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl VoteConfig {
    pub fn from_toml_file(path: &str) -> Result<Self, VoteError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| VoteError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, VoteError> {
        let config: Self = toml::from_str(s).map_err(|e| VoteError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, VoteError> {
        toml::to_string_pretty(self).map_err(|e| VoteError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), VoteError> {
        if self.command_prefix.trim().is_empty() {
            return Err(VoteError::Config("command_prefix must not be empty".into()));
        }
        if self.command_prefix.contains(char::is_whitespace) {
            return Err(VoteError::Config("command_prefix must be a single word".into()));
        }
        if self.broadcast_interval_secs == 0 {
            return Err(VoteError::Config("broadcast_interval_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_secs(self.start_delay_secs)
    }

    pub fn broadcast_interval(&self) -> Duration {
        Duration::from_secs(self.broadcast_interval_secs)
    }
}

impl Default for VoteConfig {
    fn default() -> Self {
        Self {
            command_prefix: default_command_prefix(),
            vote_rules_path: None,
            catalog_path: None,
            min_players_for_vote: default_min_players(),
            start_delay_secs: default_start_delay_secs(),
            broadcast_interval_secs: default_broadcast_interval_secs(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}
