//! Engine configuration model.
//!
//! The configuration is stored as TOML. Every section and field has a default,
//! so a partial (or missing) file still yields a usable configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Leaderboard query settings
    #[serde(default)]
    pub leaderboard: LeaderboardSettings,
    /// Turn processing settings
    #[serde(default)]
    pub turn: TurnSettings,
}

/// Settings for leaderboard queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardSettings {
    /// Number of rows returned when the caller supplies no limit
    #[serde(default = "default_leaderboard_limit")]
    pub default_limit: usize,
    /// Largest limit a caller may request
    #[serde(default = "default_leaderboard_max_limit")]
    pub max_limit: usize,
}

impl Default for LeaderboardSettings {
    fn default() -> Self {
        Self {
            default_limit: default_leaderboard_limit(),
            max_limit: default_leaderboard_max_limit(),
        }
    }
}

/// Settings for the turn processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSettings {
    /// Upper bound on a single evaluator call, in seconds
    #[serde(default = "default_evaluator_timeout_secs")]
    pub evaluator_timeout_secs: u64,
    /// Longest accepted player message, in characters
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
    /// Re-fetch attempts after a version conflict before giving up
    #[serde(default = "default_conflict_retries")]
    pub conflict_retries: u32,
    /// Number of sessions returned by the game history query
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self {
            evaluator_timeout_secs: default_evaluator_timeout_secs(),
            max_message_chars: default_max_message_chars(),
            conflict_retries: default_conflict_retries(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_leaderboard_limit() -> usize {
    15
}

fn default_leaderboard_max_limit() -> usize {
    100
}

fn default_evaluator_timeout_secs() -> u64 {
    30
}

fn default_max_message_chars() -> usize {
    2000
}

fn default_conflict_retries() -> u32 {
    3
}

fn default_history_limit() -> usize {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.leaderboard.default_limit, 15);
        assert_eq!(config.turn.evaluator_timeout_secs, 30);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [turn]
            evaluator_timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.turn.evaluator_timeout_secs, 5);
        assert_eq!(config.turn.max_message_chars, 2000);
        assert_eq!(config.leaderboard.max_limit, 100);
    }
}
