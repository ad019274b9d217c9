//! Game use case implementation.
//!
//! This module provides the `GameUseCase` which exposes the game lifecycle
//! to callers (CLI, or any transport on top): player registration, starting
//! or resuming a game, playing turns, inspecting and ending games, and the
//! read-only stage, profile and history queries.

use chrono::Utc;
use escape_core::account::{Account, AccountRepository, GameResultRepository, validate_username};
use escape_core::config::EngineConfig;
use escape_core::error::{EscapeError, Result};
use escape_core::evaluator::ChallengeEvaluator;
use escape_core::session::{GameSession, SessionRepository, StageProgress};
use escape_core::stage::{
    CharacterMood, StageCatalog, StageDefinition, StageHints, StageSummary,
};
use escape_core::stats::{GameHistoryEntry, PlayerProfile};
use std::sync::Arc;

use crate::account_ledger::AccountLedger;
use crate::game_view::GameView;
use crate::session::{SessionLocks, SessionUpdater, TurnProcessor};

/// Use case for playing escape room games.
///
/// # Responsibilities
///
/// - Registering players
/// - Keeping at most one open session per player (resume-or-create, start fresh)
/// - Routing messages through the [`TurnProcessor`]
/// - Ending games and settling the player's account
/// - Serving stage, hint, profile and history queries
///
/// # Thread Safety
///
/// All collaborators are shared through `Arc`; per-session and per-player
/// serialization goes through a shared [`SessionLocks`] registry.
pub struct GameUseCase {
    /// Repository for game sessions
    sessions: Arc<dyn SessionRepository>,
    /// Repository for player accounts
    accounts: Arc<dyn AccountRepository>,
    /// Stage catalog shared with the turn processor
    catalog: Arc<StageCatalog>,
    /// Account bookkeeping
    ledger: Arc<AccountLedger>,
    /// Turn execution
    turns: TurnProcessor,
    /// find → mutate → compare-and-update helper
    updater: SessionUpdater,
    /// Per-session and per-player locks
    locks: Arc<SessionLocks>,
    /// Engine configuration
    config: EngineConfig,
}

impl GameUseCase {
    /// Creates a new `GameUseCase` instance.
    ///
    /// # Arguments
    ///
    /// * `sessions` - Repository for game sessions
    /// * `accounts` - Repository for player accounts
    /// * `results` - Log of completed games
    /// * `evaluator` - Judge of player messages
    /// * `catalog` - Stage catalog
    /// * `config` - Engine configuration
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        accounts: Arc<dyn AccountRepository>,
        results: Arc<dyn GameResultRepository>,
        evaluator: Arc<dyn ChallengeEvaluator>,
        catalog: Arc<StageCatalog>,
        config: EngineConfig,
    ) -> Self {
        let locks = Arc::new(SessionLocks::new());
        let ledger = Arc::new(AccountLedger::new(accounts.clone(), results));
        let turns = TurnProcessor::new(
            sessions.clone(),
            evaluator,
            catalog.clone(),
            ledger.clone(),
            locks.clone(),
            config.turn.clone(),
        );
        let updater = SessionUpdater::new(sessions.clone(), config.turn.conflict_retries);

        Self {
            sessions,
            accounts,
            catalog,
            ledger,
            turns,
            updater,
            locks,
            config,
        }
    }

    /// Returns the stage catalog in use.
    pub fn catalog(&self) -> &StageCatalog {
        &self.catalog
    }

    fn owner_lock_key(account: &Account) -> String {
        format!("owner:{}", account.id)
    }

    async fn account(&self, username: &str) -> Result<Account> {
        self.accounts
            .find_by_username(username)
            .await?
            .ok_or_else(|| EscapeError::not_found("Player", username))
    }

    /// Registers a new player.
    ///
    /// # Errors
    ///
    /// - `EscapeError::InvalidInput`: the username breaks the naming rules
    /// - `EscapeError::Conflict`: the username is taken
    pub async fn register_player(&self, username: &str) -> Result<Account> {
        validate_username(username)?;
        if self.accounts.find_by_username(username).await?.is_some() {
            return Err(EscapeError::conflict(format!(
                "Username '{}' is already registered",
                username
            )));
        }

        let account = Account::new(username)?;
        self.accounts.insert(&account).await?;
        tracing::info!("[GameUseCase] Registered player '{}'", username);
        Ok(account)
    }

    /// Resumes the player's open game, or starts a new one.
    ///
    /// The open-session check and the insert are one step in the session
    /// store, so two callers racing for the same player end up in the same
    /// game.
    pub async fn start_game(&self, username: &str) -> Result<GameView> {
        let account = self.account(username).await?;
        let owner_key = Self::owner_lock_key(&account);
        let guard = self.locks.acquire(&owner_key).await;
        let view = self.resume_or_create(&account).await;
        self.locks.release(&owner_key, guard).await;
        view
    }

    async fn resume_or_create(&self, account: &Account) -> Result<GameView> {
        let candidate = GameSession::new(&account.id);
        match self.sessions.insert_unless_open(&candidate).await? {
            Some(session) => {
                tracing::info!(
                    "[GameUseCase] '{}' resumes session {} at stage {}",
                    account.username,
                    session.id,
                    session.stage
                );
                let stage = self.catalog.stage_definition(session.stage)?;
                let banner = resume_banner(&session, stage, &self.catalog);
                Ok(GameView::new(&session, &self.catalog, banner))
            }
            None => {
                tracing::info!(
                    "[GameUseCase] Created session {} for '{}'",
                    candidate.id,
                    account.username
                );
                let stage = self.catalog.stage_definition(1)?;
                let banner = briefing_banner(stage, self.catalog.stage_count(), false);
                Ok(GameView::new(&candidate, &self.catalog, banner))
            }
        }
    }

    /// Ends every open game of the player and starts a new one.
    ///
    /// # Errors
    ///
    /// Returns `EscapeError::Conflict` if another writer keeps opening games
    /// for the player while this one closes them.
    pub async fn start_fresh(&self, username: &str) -> Result<GameView> {
        let account = self.account(username).await?;
        let owner_key = Self::owner_lock_key(&account);
        let guard = self.locks.acquire(&owner_key).await;
        let view = self.replace_open_sessions(&account).await;
        self.locks.release(&owner_key, guard).await;
        view
    }

    async fn replace_open_sessions(&self, account: &Account) -> Result<GameView> {
        let session = GameSession::new(&account.id);
        for _ in 0..=self.config.turn.conflict_retries {
            let closed = self
                .sessions
                .close_open_for_owner(&account.id, Utc::now())
                .await?;
            if !closed.is_empty() {
                tracing::info!(
                    "[GameUseCase] '{}' starts fresh, closed {} open session(s)",
                    account.username,
                    closed.len()
                );
                self.settle_abandoned(&account.id).await;
            }

            if self.sessions.insert_unless_open(&session).await?.is_none() {
                tracing::info!(
                    "[GameUseCase] Created session {} for '{}'",
                    session.id,
                    account.username
                );
                let stage = self.catalog.stage_definition(1)?;
                let banner = briefing_banner(stage, self.catalog.stage_count(), true);
                return Ok(GameView::new(&session, &self.catalog, banner));
            }
            tracing::warn!(
                "[GameUseCase] A game for '{}' was opened concurrently, closing again",
                account.username
            );
        }
        Err(EscapeError::conflict(format!(
            "Could not start a fresh game for '{}'",
            account.username
        )))
    }

    /// Records an unsuccessful end whose session change is already stored.
    ///
    /// The session write cannot be undone, so a failure here is logged
    /// rather than returned.
    async fn settle_abandoned(&self, account_id: &str) {
        if let Err(e) = self.ledger.record_abandoned(account_id).await {
            tracing::error!(
                "[GameUseCase] Account {} missed an abandoned game: {}",
                account_id,
                e
            );
        }
    }

    /// Plays one message in a game.
    ///
    /// # Errors
    ///
    /// See [`TurnProcessor::process`]; additionally `NotFound` for an
    /// unknown player.
    pub async fn send_message(&self, username: &str, session_id: &str, message: &str) -> Result<GameView> {
        let account = self.account(username).await?;
        let outcome = self.turns.process(&account.id, session_id, message).await?;
        Ok(GameView::new(&outcome.session, &self.catalog, outcome.response))
    }

    /// Current state of a game.
    pub async fn get_status(&self, username: &str, session_id: &str) -> Result<GameView> {
        let account = self.account(username).await?;
        let session = self
            .sessions
            .find_for_owner(session_id, &account.id)
            .await?
            .ok_or_else(|| EscapeError::not_found("GameSession", session_id))?;
        Ok(self.status_view(&session))
    }

    /// State of the player's most recently played game, if any.
    pub async fn latest_status(&self, username: &str) -> Result<Option<GameView>> {
        let account = self.account(username).await?;
        Ok(self
            .sessions
            .latest_for_owner(&account.id)
            .await?
            .map(|session| self.status_view(&session)))
    }

    fn status_view(&self, session: &GameSession) -> GameView {
        let message = self
            .catalog
            .stage_definition(session.stage)
            .map(|stage| stage.mood_message(session.character_mood).to_string())
            .unwrap_or_default();
        let mut view = GameView::new(session, &self.catalog, message);
        // The refresh signal belongs to the turn response that entered the stage.
        view.should_refresh = false;
        view
    }

    /// Ends a game without success.
    ///
    /// Ending a game that is already over changes nothing.
    pub async fn end_game(&self, username: &str, session_id: &str) -> Result<GameView> {
        let account = self.account(username).await?;
        let guard = self.locks.acquire(session_id).await;
        let view = self.close_session(&account, session_id).await;
        self.locks.release(session_id, guard).await;
        view
    }

    async fn close_session(&self, account: &Account, session_id: &str) -> Result<GameView> {
        let session = self
            .sessions
            .find_for_owner(session_id, &account.id)
            .await?
            .ok_or_else(|| EscapeError::not_found("GameSession", session_id))?;
        if session.game_over {
            return Ok(GameView::new(&session, &self.catalog, "This game is already over."));
        }

        let closed = self
            .updater
            .update(session_id, &account.id, |session| Ok(session.close(Utc::now())))
            .await?;
        self.settle_abandoned(&account.id).await;
        tracing::info!(
            "[GameUseCase] '{}' ended session {} at stage {}",
            account.username,
            session_id,
            closed.stage
        );

        Ok(GameView::new(&closed, &self.catalog, "Game session ended."))
    }

    /// Lists every stage.
    pub fn stages(&self) -> Vec<StageSummary> {
        self.catalog.stage_summaries()
    }

    /// Hints of one stage.
    ///
    /// # Errors
    ///
    /// Returns `EscapeError::NotFound` for a stage outside the catalog.
    pub fn hints(&self, stage: u32) -> Result<StageHints> {
        self.catalog.stage_hints(stage)
    }

    /// Public profile of a player.
    pub async fn profile(&self, username: &str) -> Result<PlayerProfile> {
        let account = self.account(username).await?;
        let open = self.sessions.find_open_for_owner(&account.id).await?;
        Ok(PlayerProfile::new(&account, open.as_ref()))
    }

    /// The player's games, most recently played first.
    pub async fn history(&self, username: &str) -> Result<Vec<GameHistoryEntry>> {
        let account = self.account(username).await?;
        Ok(self
            .sessions
            .list_for_owner(&account.id)
            .await?
            .iter()
            .take(self.config.turn.history_limit)
            .map(GameHistoryEntry::from)
            .collect())
    }
}

fn briefing_banner(stage: &StageDefinition, stage_count: u32, fresh: bool) -> String {
    let opening = if fresh {
        "🎮 A fresh escape begins! Previous progress has been cleared."
    } else {
        "Welcome to the Escape Room Challenge!"
    };
    format!(
        "{}\n\n🏆 Mission: talk {} characters into giving up their secret keys.\n\n🎭 Stage {}: {} ({})\n\n{}\n\n🎬 Scene: {}\n\n💬 {}",
        opening,
        stage_count,
        stage.stage,
        stage.character,
        stage.difficulty,
        stage.instructions,
        stage.story,
        stage.mood_message(CharacterMood::Helpful),
    )
}

fn resume_banner(session: &GameSession, stage: &StageDefinition, catalog: &StageCatalog) -> String {
    let progress = StageProgress::summarize(session, catalog);
    format!(
        "Welcome back! Resuming stage {}: {}\n\n{}\n\n📊 Progress: {}/{} keys found\n\n{}",
        stage.stage,
        stage.character,
        stage.instructions,
        progress.keys_found(),
        progress.total_keys_in_stage,
        stage.mood_message(session.character_mood),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banners_mention_stage_and_progress() {
        let catalog = StageCatalog::builtin().unwrap();
        let stage = catalog.stage_definition(1).unwrap();

        let briefing = briefing_banner(stage, catalog.stage_count(), false);
        assert!(briefing.contains("Stage 1"));
        assert!(briefing.contains(&stage.character));
        assert!(briefing.contains(stage.mood_message(CharacterMood::Helpful)));

        let mut session = GameSession::new("p");
        session.extracted_keys.insert(stage.keys[0].clone());
        let resume = resume_banner(&session, stage, &catalog);
        assert!(resume.contains("1/3 keys found"));
    }
}
