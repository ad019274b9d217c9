//! Aggregate statistics and player-facing summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::{Account, GameResult};
use crate::session::{CompletionStatus, GameSession};

/// Service-wide statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    /// Registered players
    pub total_users: usize,
    /// Sessions that reached `game_over`
    pub total_games: usize,
    /// Sessions that ended with every stage cleared
    pub successful_games: usize,
    /// `successful_games / total_games` in percent, 2 decimals
    pub success_rate: f64,
    /// Mean final score of recorded results, 2 decimals
    pub average_score: f64,
    /// Highest recorded final score
    pub highest_score: u32,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl GlobalStats {
    /// Computes the statistics over every stored session and result.
    pub fn compute(total_users: usize, sessions: &[GameSession], results: &[GameResult]) -> Self {
        let total_games = sessions.iter().filter(|s| s.game_over).count();
        let successful_games = sessions.iter().filter(|s| s.game_over && s.success).count();
        let success_rate = if total_games == 0 {
            0.0
        } else {
            round2(successful_games as f64 / total_games as f64 * 100.0)
        };

        let average_score = if results.is_empty() {
            0.0
        } else {
            let sum: u64 = results.iter().map(|r| u64::from(r.final_score)).sum();
            round2(sum as f64 / results.len() as f64)
        };
        let highest_score = results.iter().map(|r| r.final_score).max().unwrap_or(0);

        Self {
            total_users,
            total_games,
            successful_games,
            success_rate,
            average_score,
            highest_score,
        }
    }
}

/// Public profile of one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub username: String,
    /// Current score while a game is open, best score otherwise
    pub score: u32,
    pub best_score: u32,
    pub total_score: u64,
    pub games_played: u32,
    /// Whether the player has an open session
    pub in_game: bool,
    pub created_at: DateTime<Utc>,
}

impl PlayerProfile {
    pub fn new(account: &Account, open_session: Option<&GameSession>) -> Self {
        let in_game = open_session.is_some();
        Self {
            username: account.username.clone(),
            score: if in_game {
                account.current_score
            } else {
                account.best_score
            },
            best_score: account.best_score,
            total_score: account.total_score,
            games_played: account.games_played,
            in_game,
            created_at: account.created_at,
        }
    }
}

/// One row of a player's game history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameHistoryEntry {
    pub session_id: String,
    pub stage: u32,
    pub score: u32,
    pub attempts: u32,
    pub keys_extracted: usize,
    pub status: CompletionStatus,
    pub started_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl From<&GameSession> for GameHistoryEntry {
    fn from(session: &GameSession) -> Self {
        Self {
            session_id: session.id.clone(),
            stage: session.stage,
            score: session.score,
            attempts: session.attempts,
            keys_extracted: session.extracted_keys.len(),
            status: session.completion_status(),
            started_at: session.created_at,
            last_active: session.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished(success: bool) -> GameSession {
        let mut session = GameSession::new("p");
        session.game_over = true;
        session.success = success;
        session
    }

    fn result(score: u32) -> GameResult {
        GameResult {
            owner_id: "p".to_string(),
            session_id: "s".to_string(),
            final_score: score,
            stages_completed: 5,
            total_attempts: 10,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_stats_are_zero() {
        let stats = GlobalStats::compute(0, &[], &[]);
        assert_eq!(stats.total_games, 0);
        assert_eq!(stats.success_rate, 0.0);
        assert_eq!(stats.average_score, 0.0);
        assert_eq!(stats.highest_score, 0);
    }

    #[test]
    fn test_rates_are_rounded_to_two_decimals() {
        let sessions = vec![
            finished(true),
            finished(false),
            finished(false),
            GameSession::new("active"),
        ];
        let results = vec![result(100), result(201), result(50)];
        let stats = GlobalStats::compute(4, &sessions, &results);
        assert_eq!(stats.total_users, 4);
        assert_eq!(stats.total_games, 3);
        assert_eq!(stats.successful_games, 1);
        assert_eq!(stats.success_rate, 33.33);
        assert_eq!(stats.average_score, 117.0);
        assert_eq!(stats.highest_score, 201);
    }

    #[test]
    fn test_profile_score_depends_on_open_session() {
        let mut account = Account::new("player").unwrap();
        account.best_score = 900;
        account.current_score = 120;

        let session = GameSession::new(&account.id);
        assert_eq!(PlayerProfile::new(&account, Some(&session)).score, 120);
        assert_eq!(PlayerProfile::new(&account, None).score, 900);
    }

    #[test]
    fn test_history_entry_reflects_status() {
        let entry = GameHistoryEntry::from(&finished(true));
        assert_eq!(entry.status, CompletionStatus::Completed);
    }
}
