//! Leaderboard and global statistics queries.
//!
//! Both queries read a snapshot of the stores without taking session locks;
//! a turn landing concurrently may or may not be reflected.

use escape_core::account::{AccountRepository, GameResultRepository};
use escape_core::config::LeaderboardSettings;
use escape_core::error::{EscapeError, Result};
use escape_core::leaderboard::{LeaderboardEntry, PlayerSnapshot, rank};
use escape_core::session::{GameSession, SessionRepository};
use escape_core::stage::StageCatalog;
use escape_core::stats::GlobalStats;
use std::collections::HashMap;
use std::sync::Arc;

/// Service answering leaderboard and statistics queries.
pub struct LeaderboardService {
    sessions: Arc<dyn SessionRepository>,
    accounts: Arc<dyn AccountRepository>,
    results: Arc<dyn GameResultRepository>,
    catalog: Arc<StageCatalog>,
    settings: LeaderboardSettings,
}

impl LeaderboardService {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        accounts: Arc<dyn AccountRepository>,
        results: Arc<dyn GameResultRepository>,
        catalog: Arc<StageCatalog>,
        settings: LeaderboardSettings,
    ) -> Self {
        Self {
            sessions,
            accounts,
            results,
            catalog,
            settings,
        }
    }

    /// Resolves the caller-supplied limit.
    ///
    /// # Errors
    ///
    /// Returns `EscapeError::InvalidInput` for 0 or a limit above the maximum.
    fn resolve_limit(&self, limit: Option<usize>) -> Result<usize> {
        match limit {
            None => Ok(self.settings.default_limit),
            Some(0) => Err(EscapeError::invalid_input("Leaderboard limit must be at least 1")),
            Some(limit) if limit > self.settings.max_limit => Err(EscapeError::invalid_input(format!(
                "Leaderboard limit {} exceeds the maximum of {}",
                limit, self.settings.max_limit
            ))),
            Some(limit) => Ok(limit),
        }
    }

    /// Ranks every registered player by their latest session.
    ///
    /// # Arguments
    ///
    /// * `limit` - Number of rows, `None` for the configured default
    pub async fn leaderboard(&self, limit: Option<usize>) -> Result<Vec<LeaderboardEntry>> {
        let limit = self.resolve_limit(limit)?;

        let mut latest: HashMap<String, GameSession> = HashMap::new();
        for session in self.sessions.list_all().await? {
            let newer = latest
                .get(&session.owner_id)
                .map(|current| GameSession::recency_order(&session, current).is_lt())
                .unwrap_or(true);
            if newer {
                latest.insert(session.owner_id.clone(), session);
            }
        }

        let snapshots: Vec<PlayerSnapshot> = self
            .accounts
            .list_all()
            .await?
            .into_iter()
            .map(|account| {
                let latest_session = latest.remove(&account.id);
                PlayerSnapshot {
                    account,
                    latest_session,
                }
            })
            .collect();

        let entries = rank(&snapshots, &self.catalog, limit);
        tracing::debug!(
            "[LeaderboardService] Ranked {} players, returning {}",
            snapshots.len(),
            entries.len()
        );
        Ok(entries)
    }

    /// Service-wide statistics.
    pub async fn global_stats(&self) -> Result<GlobalStats> {
        let total_users = self.accounts.list_all().await?.len();
        let sessions = self.sessions.list_all().await?;
        let results = self.results.list_all().await?;
        Ok(GlobalStats::compute(total_users, &sessions, &results))
    }
}
