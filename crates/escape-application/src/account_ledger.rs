//! Account bookkeeping after session changes.

use chrono::Utc;
use escape_core::account::{Account, AccountRepository, GameResult, GameResultRepository};
use escape_core::error::{EscapeError, Result};
use escape_core::session::GameSession;
use std::sync::Arc;

/// Keeps account aggregates in step with the sessions they own.
pub struct AccountLedger {
    accounts: Arc<dyn AccountRepository>,
    results: Arc<dyn GameResultRepository>,
}

impl AccountLedger {
    pub fn new(accounts: Arc<dyn AccountRepository>, results: Arc<dyn GameResultRepository>) -> Self {
        Self { accounts, results }
    }

    async fn load(&self, account_id: &str) -> Result<Account> {
        self.accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| EscapeError::not_found("Account", account_id))
    }

    /// Records a persisted turn of `session`.
    ///
    /// Tracks the running and best score, and settles the game if the turn
    /// ended it: a win adds to the totals and records a [`GameResult`], a
    /// loss only clears the running score.
    pub async fn record_turn(&self, session: &GameSession, stages_completed: u32) -> Result<Account> {
        let mut account = self.load(&session.owner_id).await?;
        account.record_turn_score(session.score);

        if session.game_over && session.success {
            account.record_success(session.score);
            let result = GameResult {
                owner_id: account.id.clone(),
                session_id: session.id.clone(),
                final_score: session.score,
                stages_completed,
                total_attempts: session.attempts,
                completed_at: Utc::now(),
            };
            self.results.record(&result).await?;
            tracing::info!(
                "[AccountLedger] '{}' completed session {} with {} points",
                account.username,
                session.id,
                session.score
            );
        } else if session.game_over {
            account.record_unsuccessful_end();
        }

        self.accounts.save(&account).await?;
        Ok(account)
    }

    /// Records that a session of `account_id` was ended without success.
    pub async fn record_abandoned(&self, account_id: &str) -> Result<Account> {
        let mut account = self.load(account_id).await?;
        account.record_unsuccessful_end();
        self.accounts.save(&account).await?;
        Ok(account)
    }
}
