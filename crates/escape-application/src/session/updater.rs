//! Session updater helper for common update patterns.
//!
//! This module provides `SessionUpdater` which abstracts the
//! "find → mutate → compare-and-update" pattern used for session changes
//! outside the turn processor.

use chrono::Utc;
use escape_core::error::{EscapeError, Result};
use escape_core::session::{GameSession, SessionRepository};
use std::sync::Arc;

/// Helper struct for updating sessions with a common pattern.
///
/// `SessionUpdater` encapsulates:
/// 1. Loading a session from storage (scoped to its owner)
/// 2. Applying the mutation
/// 3. Bumping version and timestamp (once)
/// 4. Compare-and-update against the version that was loaded
///
/// A version conflict restarts from step 1, at most `max_retries` times.
pub struct SessionUpdater {
    repository: Arc<dyn SessionRepository>,
    max_retries: u32,
}

impl SessionUpdater {
    /// Creates a new `SessionUpdater` with the given repository.
    pub fn new(repository: Arc<dyn SessionRepository>, max_retries: u32) -> Self {
        Self {
            repository,
            max_retries,
        }
    }

    /// Updates a session by applying the given updater function.
    ///
    /// The updater returns `Ok(false)` to signal that nothing changed, in
    /// which case nothing is written.
    ///
    /// # Arguments
    ///
    /// * `session_id` - The ID of the session to update
    /// * `owner_id` - Account id the session must belong to
    /// * `updater` - A function that modifies the session
    ///
    /// # Returns
    ///
    /// The session as stored after the call.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The session doesn't exist or belongs to someone else
    /// - The updater function returns an error
    /// - Saving to storage fails, or conflicts persist after every retry
    pub async fn update<F>(&self, session_id: &str, owner_id: &str, updater: F) -> Result<GameSession>
    where
        F: Fn(&mut GameSession) -> Result<bool>,
    {
        let mut attempt = 0;
        loop {
            let mut session = self
                .repository
                .find_for_owner(session_id, owner_id)
                .await?
                .ok_or_else(|| EscapeError::not_found("GameSession", session_id))?;
            let expected_version = session.version;

            if !updater(&mut session)? {
                tracing::debug!("[SessionUpdater] No change for session {}", session_id);
                return Ok(session);
            }
            // Mutations such as `close` touch the session themselves.
            if session.version == expected_version {
                session.touch(Utc::now());
            }

            match self.repository.update(&session, expected_version).await {
                Ok(()) => {
                    tracing::debug!(
                        "[SessionUpdater] Session {} saved at version {}",
                        session.id,
                        session.version
                    );
                    return Ok(session);
                }
                Err(err) if err.is_conflict() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "[SessionUpdater] Version conflict on session {} (retry {}/{})",
                        session_id,
                        attempt,
                        self.max_retries
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Repository whose first `conflicts` updates fail with a conflict.
    struct FlakyRepository {
        sessions: Mutex<HashMap<String, GameSession>>,
        conflicts: AtomicU32,
    }

    impl FlakyRepository {
        fn new(session: &GameSession, conflicts: u32) -> Self {
            let mut sessions = HashMap::new();
            sessions.insert(session.id.clone(), session.clone());
            Self {
                sessions: Mutex::new(sessions),
                conflicts: AtomicU32::new(conflicts),
            }
        }
    }

    #[async_trait]
    impl SessionRepository for FlakyRepository {
        async fn insert(&self, session: &GameSession) -> Result<()> {
            let mut sessions = self.sessions.lock().unwrap();
            sessions.insert(session.id.clone(), session.clone());
            Ok(())
        }

        async fn insert_unless_open(&self, session: &GameSession) -> Result<Option<GameSession>> {
            self.insert(session).await?;
            Ok(None)
        }

        async fn find_by_id(&self, session_id: &str) -> Result<Option<GameSession>> {
            Ok(self.sessions.lock().unwrap().get(session_id).cloned())
        }

        async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<GameSession>> {
            let sessions = self.sessions.lock().unwrap();
            Ok(sessions
                .values()
                .filter(|s| s.owner_id == owner_id)
                .cloned()
                .collect())
        }

        async fn list_all(&self) -> Result<Vec<GameSession>> {
            Ok(self.sessions.lock().unwrap().values().cloned().collect())
        }

        async fn update(&self, session: &GameSession, _expected_version: u64) -> Result<()> {
            let remaining = self.conflicts.load(Ordering::SeqCst);
            if remaining > 0 {
                self.conflicts.store(remaining - 1, Ordering::SeqCst);
                return Err(EscapeError::conflict("simulated"));
            }
            let mut sessions = self.sessions.lock().unwrap();
            sessions.insert(session.id.clone(), session.clone());
            Ok(())
        }

        async fn close_open_for_owner(
            &self,
            _owner_id: &str,
            _closed_at: DateTime<Utc>,
        ) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_update_applies_and_bumps_version() {
        let session = GameSession::new("owner");
        let updater = SessionUpdater::new(Arc::new(FlakyRepository::new(&session, 0)), 3);
        let updated = updater
            .update(&session.id, "owner", |s| Ok(s.close(Utc::now())))
            .await
            .unwrap();
        assert!(updated.game_over);
        assert_eq!(updated.version, 1);
    }

    #[tokio::test]
    async fn test_update_retries_conflicts() {
        let session = GameSession::new("owner");
        let updater = SessionUpdater::new(Arc::new(FlakyRepository::new(&session, 2)), 3);
        let updated = updater
            .update(&session.id, "owner", |s| Ok(s.close(Utc::now())))
            .await
            .unwrap();
        assert!(updated.game_over);
    }

    #[tokio::test]
    async fn test_update_surfaces_conflict_after_retries() {
        let session = GameSession::new("owner");
        let updater = SessionUpdater::new(Arc::new(FlakyRepository::new(&session, 5)), 2);
        let err = updater
            .update(&session.id, "owner", |s| Ok(s.close(Utc::now())))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_update_is_scoped_to_owner() {
        let session = GameSession::new("owner");
        let updater = SessionUpdater::new(Arc::new(FlakyRepository::new(&session, 0)), 3);
        let err = updater
            .update(&session.id, "intruder", |_| Ok(true))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
