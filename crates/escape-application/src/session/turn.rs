//! Turn processor.
//!
//! Orchestrates one player turn: lock the session, load it, intercept the
//! reserved commands, ask the evaluator for a verdict (bounded by a timeout),
//! apply the state machine, persist with compare-and-update and settle the
//! owner's account. A failure before the persist step commits nothing; once
//! the session is persisted the turn succeeds.

use chrono::Utc;
use escape_core::config::TurnSettings;
use escape_core::error::{EscapeError, Result};
use escape_core::evaluator::{ChallengeEvaluator, EvaluatorResult};
use escape_core::session::{
    GameSession, ReservedCommand, SessionRepository, StageProgress, apply_verdict, keys_listing,
    prepare_turn,
};
use escape_core::stage::StageCatalog;
use std::sync::Arc;
use std::time::Duration;

use super::locks::SessionLocks;
use crate::account_ledger::AccountLedger;

/// Result of a processed turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Session after the turn (unchanged for reserved commands)
    pub session: GameSession,
    /// Text to show the player
    pub response: String,
    /// Whether the message was a reserved command
    pub command: Option<ReservedCommand>,
}

/// Executes player turns against stored sessions.
pub struct TurnProcessor {
    sessions: Arc<dyn SessionRepository>,
    evaluator: Arc<dyn ChallengeEvaluator>,
    catalog: Arc<StageCatalog>,
    ledger: Arc<AccountLedger>,
    locks: Arc<SessionLocks>,
    settings: TurnSettings,
}

impl TurnProcessor {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        evaluator: Arc<dyn ChallengeEvaluator>,
        catalog: Arc<StageCatalog>,
        ledger: Arc<AccountLedger>,
        locks: Arc<SessionLocks>,
        settings: TurnSettings,
    ) -> Self {
        Self {
            sessions,
            evaluator,
            catalog,
            ledger,
            locks,
            settings,
        }
    }

    /// Rejects empty and oversized messages.
    fn validate_message(&self, message: &str) -> Result<()> {
        if message.trim().is_empty() {
            return Err(EscapeError::invalid_input("Message must not be empty"));
        }
        let length = message.chars().count();
        if length > self.settings.max_message_chars {
            return Err(EscapeError::invalid_input(format!(
                "Message is {} characters long (max {})",
                length, self.settings.max_message_chars
            )));
        }
        Ok(())
    }

    /// Processes one message of `owner_id` in `session_id`.
    ///
    /// # Errors
    ///
    /// - `EscapeError::InvalidInput`: empty or oversized message
    /// - `EscapeError::NotFound`: no such session for this owner
    /// - `EscapeError::SessionClosed`: the session is over
    /// - `EscapeError::EvaluationFailed`: the evaluator failed or timed out
    /// - `EscapeError::Conflict`: the session changed underneath the turn
    pub async fn process(&self, owner_id: &str, session_id: &str, message: &str) -> Result<TurnOutcome> {
        self.validate_message(message)?;

        let guard = self.locks.acquire(session_id).await;
        let outcome = self.process_locked(owner_id, session_id, message).await;
        self.locks.release(session_id, guard).await;
        outcome
    }

    async fn process_locked(&self, owner_id: &str, session_id: &str, message: &str) -> Result<TurnOutcome> {
        let session = self
            .sessions
            .find_for_owner(session_id, owner_id)
            .await?
            .ok_or_else(|| EscapeError::not_found("GameSession", session_id))?;
        if session.game_over {
            return Err(EscapeError::session_closed(session_id));
        }

        if let Some(command) = ReservedCommand::parse(message) {
            let response = self.answer_command(command, &session)?;
            tracing::debug!(
                "[TurnProcessor] Session {}: answered {:?} command",
                session_id,
                command
            );
            return Ok(TurnOutcome {
                session,
                response,
                command: Some(command),
            });
        }

        let prepared = prepare_turn(&session, &self.catalog)?;
        let verdict = self.evaluate(&prepared, message).await?;
        let next = apply_verdict(prepared, message, &verdict, &self.catalog, Utc::now());

        self.sessions.update(&next, session.version).await?;
        tracing::debug!(
            "[TurnProcessor] Session {} persisted: stage={}, score={}, keys={}, attempts={}",
            next.id,
            next.stage,
            next.score,
            next.extracted_keys.len(),
            next.attempts
        );

        let stages_completed = if next.success {
            self.catalog.stage_count()
        } else {
            next.stage.saturating_sub(1)
        };
        // The turn is committed; a retry would replay it.
        if let Err(e) = self.ledger.record_turn(&next, stages_completed).await {
            tracing::error!(
                "[TurnProcessor] Session {} persisted but account update failed: {}",
                next.id,
                e
            );
        }

        if next.game_over {
            tracing::info!(
                "[TurnProcessor] Session {} is over (success={})",
                next.id,
                next.success
            );
        }

        Ok(TurnOutcome {
            session: next,
            response: verdict.narrative_response,
            command: None,
        })
    }

    fn answer_command(&self, command: ReservedCommand, session: &GameSession) -> Result<String> {
        match command {
            ReservedCommand::Hint => {
                let stage = self.catalog.stage_definition(session.stage)?;
                Ok(stage.quick_hint().to_string())
            }
            ReservedCommand::Keys => Ok(keys_listing(&StageProgress::summarize(
                session,
                &self.catalog,
            ))),
        }
    }

    async fn evaluate(&self, session: &GameSession, message: &str) -> Result<EvaluatorResult> {
        let stage = self.catalog.stage_definition(session.stage)?;
        let timeout = Duration::from_secs(self.settings.evaluator_timeout_secs);

        match tokio::time::timeout(timeout, self.evaluator.evaluate(session, stage, message)).await {
            Ok(Ok(verdict)) => Ok(verdict),
            Ok(Err(err)) => {
                tracing::error!(
                    "[TurnProcessor] Evaluator failed for session {}: {}",
                    session.id,
                    err
                );
                match err {
                    EscapeError::EvaluationFailed(_) => Err(err),
                    other => Err(EscapeError::evaluation_failed(other.to_string())),
                }
            }
            Err(_) => {
                tracing::error!(
                    "[TurnProcessor] Evaluator timed out after {}s for session {}",
                    self.settings.evaluator_timeout_secs,
                    session.id
                );
                Err(EscapeError::evaluation_failed(format!(
                    "evaluator timed out after {}s",
                    self.settings.evaluator_timeout_secs
                )))
            }
        }
    }
}
