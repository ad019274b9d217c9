//! Leaderboard models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::session::{CompletionStatus, GameSession};

/// What the ranker knows about one player.
#[derive(Debug, Clone)]
pub struct PlayerSnapshot {
    /// The player's account
    pub account: Account,
    /// Most recently updated session, if the player ever started one
    pub latest_session: Option<GameSession>,
}

/// One row of the leaderboard. Derived per query, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Player name
    pub username: String,
    /// Display score (depends on `completion_status`)
    pub score: u64,
    /// Stage the latest session is in
    pub current_stage: u32,
    /// Stages whose full key set was extracted
    pub stages_completed: u32,
    /// Keys found: all keys for completed runs, current stage keys otherwise
    pub keys_found: usize,
    /// Denominator for `keys_found`
    pub total_keys_possible: usize,
    /// Status of the latest session
    pub completion_status: CompletionStatus,
    /// Last update of the latest session, or account creation time
    pub last_active: DateTime<Utc>,
    #[serde(skip)]
    pub(crate) rank_key: u64,
}

impl LeaderboardEntry {
    /// Composite key the leaderboard is sorted by, descending.
    pub fn rank_key(&self) -> u64 {
        self.rank_key
    }
}
