//! Session repository trait.
//!
//! Defines the interface for game session persistence operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::GameSession;
use crate::error::Result;

/// An abstract repository for persisting game sessions.
///
/// Sessions are never deleted; a finished run is only marked `game_over`.
///
/// # Implementation Notes
///
/// Implementations must make [`SessionRepository::update`] an atomic
/// compare-and-update on `version`, so that two writers racing on the same
/// session cannot silently overwrite each other.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Stores a newly created session.
    ///
    /// # Errors
    ///
    /// Returns `EscapeError::Conflict` if a session with the same id exists.
    async fn insert(&self, session: &GameSession) -> Result<()>;

    /// Stores `session` unless its owner already has an open session.
    ///
    /// The check and the insert are one atomic step, also against other
    /// processes sharing the store.
    ///
    /// # Returns
    ///
    /// - `Ok(None)`: `session` was stored
    /// - `Ok(Some(open))`: the owner's existing open session; nothing was stored
    async fn insert_unless_open(&self, session: &GameSession) -> Result<Option<GameSession>>;

    /// Finds a session by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(GameSession))`: Session found
    /// - `Ok(None)`: Session not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, session_id: &str) -> Result<Option<GameSession>>;

    /// Lists every session owned by `owner_id`, most recently updated first.
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<GameSession>>;

    /// Lists all stored sessions.
    async fn list_all(&self) -> Result<Vec<GameSession>>;

    /// Replaces a stored session if its stored version equals `expected_version`.
    ///
    /// # Errors
    ///
    /// - `EscapeError::NotFound`: no session with this id exists
    /// - `EscapeError::Conflict`: the stored version moved on since it was read
    async fn update(&self, session: &GameSession, expected_version: u64) -> Result<()>;

    /// Marks every open session of `owner_id` as over.
    ///
    /// # Returns
    ///
    /// The ids of the sessions that were closed by this call.
    async fn close_open_for_owner(
        &self,
        owner_id: &str,
        closed_at: DateTime<Utc>,
    ) -> Result<Vec<String>>;

    /// Finds a session by id, scoped to its owner.
    ///
    /// A session owned by somebody else is reported as absent.
    async fn find_for_owner(&self, session_id: &str, owner_id: &str) -> Result<Option<GameSession>> {
        Ok(self
            .find_by_id(session_id)
            .await?
            .filter(|session| session.owner_id == owner_id))
    }

    /// Most recently updated session of `owner_id`, open or not.
    async fn latest_for_owner(&self, owner_id: &str) -> Result<Option<GameSession>> {
        Ok(self.list_for_owner(owner_id).await?.into_iter().next())
    }

    /// Most recently updated open session of `owner_id`.
    async fn find_open_for_owner(&self, owner_id: &str) -> Result<Option<GameSession>> {
        Ok(self
            .list_for_owner(owner_id)
            .await?
            .into_iter()
            .find(GameSession::is_open))
    }
}
