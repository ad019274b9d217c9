//! Player account and game result models.
//!
//! An account holds the aggregate scores the leaderboard and profile views
//! read. The engine updates them after every persisted turn and whenever a
//! session ends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EscapeError, Result};

/// Minimum username length in characters.
pub const USERNAME_MIN_LEN: usize = 3;
/// Maximum username length in characters.
pub const USERNAME_MAX_LEN: usize = 32;

/// A registered player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier (UUID format)
    pub id: String,
    /// Unique display name, also the lookup key
    pub username: String,
    /// Highest session score ever reached
    #[serde(default)]
    pub best_score: u32,
    /// Score of the open session, 0 when none is open
    #[serde(default)]
    pub current_score: u32,
    /// Sum of final scores of successfully completed games
    #[serde(default)]
    pub total_score: u64,
    /// Number of successfully completed games
    #[serde(default)]
    pub games_played: u32,
    /// Registration time
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Creates a new account for `username`.
    ///
    /// # Errors
    ///
    /// Returns `EscapeError::InvalidInput` if the username is not 3-32
    /// characters of ASCII letters, digits, `_` or `-`.
    pub fn new(username: &str) -> Result<Self> {
        validate_username(username)?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            best_score: 0,
            current_score: 0,
            total_score: 0,
            games_played: 0,
            created_at: Utc::now(),
        })
    }

    /// Records the score of a turn that was just persisted.
    pub fn record_turn_score(&mut self, score: u32) {
        self.best_score = self.best_score.max(score);
        self.current_score = score;
    }

    /// Records a successfully completed game.
    pub fn record_success(&mut self, final_score: u32) {
        self.best_score = self.best_score.max(final_score);
        self.total_score = self.total_score.saturating_add(u64::from(final_score));
        self.games_played += 1;
        self.current_score = 0;
    }

    /// Records a game that ended without clearing every stage.
    pub fn record_unsuccessful_end(&mut self) {
        self.current_score = 0;
    }
}

/// Checks the username rules applied at registration.
///
/// # Errors
///
/// Returns `EscapeError::InvalidInput` describing the first violated rule.
pub fn validate_username(username: &str) -> Result<()> {
    let length = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&length) {
        return Err(EscapeError::invalid_input(format!(
            "Username must be {}-{} characters long",
            USERNAME_MIN_LEN, USERNAME_MAX_LEN
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(EscapeError::invalid_input(
            "Username may only contain letters, digits, '_' and '-'",
        ));
    }
    Ok(())
}

/// Final record of a successfully completed game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// Account id of the player
    pub owner_id: String,
    /// Session that produced this result
    pub session_id: String,
    /// Stored score at completion
    pub final_score: u32,
    /// Number of stages cleared
    pub stages_completed: u32,
    /// Evaluated turns taken
    pub total_attempts: u32,
    /// Completion time
    pub completed_at: DateTime<Utc>,
}
