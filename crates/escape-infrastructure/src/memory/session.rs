use async_trait::async_trait;
use chrono::{DateTime, Utc};
use escape_core::error::{EscapeError, Result};
use escape_core::session::{GameSession, SessionRepository};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Session store held in process memory.
///
/// Every operation runs under one lock, so `update` is a true
/// compare-and-update.
#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<String, GameSession>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn insert(&self, session: &GameSession) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(EscapeError::conflict(format!(
                "Session '{}' already exists",
                session.id
            )));
        }
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn insert_unless_open(&self, session: &GameSession) -> Result<Option<GameSession>> {
        let mut sessions = self.sessions.write().await;
        let open = sessions
            .values()
            .filter(|stored| stored.owner_id == session.owner_id && stored.is_open())
            .min_by(|a, b| GameSession::recency_order(a, b))
            .cloned();
        if open.is_some() {
            return Ok(open);
        }
        if sessions.contains_key(&session.id) {
            return Err(EscapeError::conflict(format!(
                "Session '{}' already exists",
                session.id
            )));
        }
        sessions.insert(session.id.clone(), session.clone());
        Ok(None)
    }

    async fn find_by_id(&self, session_id: &str) -> Result<Option<GameSession>> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<GameSession>> {
        let sessions = self.sessions.read().await;
        let mut owned: Vec<GameSession> = sessions
            .values()
            .filter(|session| session.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(GameSession::recency_order);
        Ok(owned)
    }

    async fn list_all(&self) -> Result<Vec<GameSession>> {
        let mut all: Vec<GameSession> = self.sessions.read().await.values().cloned().collect();
        all.sort_by(GameSession::recency_order);
        Ok(all)
    }

    async fn update(&self, session: &GameSession, expected_version: u64) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get_mut(&session.id)
            .ok_or_else(|| EscapeError::not_found("GameSession", &session.id))?;
        if stored.version != expected_version {
            tracing::warn!(
                "[InMemorySessionRepository] Stale write on {}: expected v{}, stored v{}",
                session.id,
                expected_version,
                stored.version
            );
            return Err(EscapeError::conflict(format!(
                "Session '{}' was modified concurrently",
                session.id
            )));
        }
        *stored = session.clone();
        Ok(())
    }

    async fn close_open_for_owner(
        &self,
        owner_id: &str,
        closed_at: DateTime<Utc>,
    ) -> Result<Vec<String>> {
        let mut sessions = self.sessions.write().await;
        let closed = sessions
            .values_mut()
            .filter(|session| session.owner_id == owner_id)
            .filter_map(|session| session.close(closed_at).then(|| session.id.clone()))
            .collect();
        Ok(closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_update_rejects_stale_version() {
        let repo = InMemorySessionRepository::new();
        let session = GameSession::new("owner");
        repo.insert(&session).await.unwrap();

        let mut first = session.clone();
        first.score = 10;
        first.touch(Utc::now());
        repo.update(&first, 0).await.unwrap();

        let mut stale = session.clone();
        stale.score = 99;
        stale.touch(Utc::now());
        assert!(repo.update(&stale, 0).await.unwrap_err().is_conflict());
        assert_eq!(repo.find_by_id(&session.id).await.unwrap().unwrap().score, 10);
    }

    #[tokio::test]
    async fn test_insert_twice_conflicts() {
        let repo = InMemorySessionRepository::new();
        let session = GameSession::new("owner");
        repo.insert(&session).await.unwrap();
        assert!(repo.insert(&session).await.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_close_open_only_touches_owner() {
        let repo = InMemorySessionRepository::new();
        let mine = GameSession::new("me");
        let theirs = GameSession::new("them");
        repo.insert(&mine).await.unwrap();
        repo.insert(&theirs).await.unwrap();

        let closed = repo.close_open_for_owner("me", Utc::now()).await.unwrap();
        assert_eq!(closed, vec![mine.id.clone()]);
        assert!(repo.find_open_for_owner("me").await.unwrap().is_none());
        assert!(repo.find_open_for_owner("them").await.unwrap().is_some());
        assert!(repo.close_open_for_owner("me", Utc::now()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_unless_open_returns_existing_open_session() {
        let repo = InMemorySessionRepository::new();
        let first = GameSession::new("me");
        assert!(repo.insert_unless_open(&first).await.unwrap().is_none());

        let second = GameSession::new("me");
        let open = repo.insert_unless_open(&second).await.unwrap().unwrap();
        assert_eq!(open.id, first.id);
        assert!(repo.find_by_id(&second.id).await.unwrap().is_none());

        repo.close_open_for_owner("me", Utc::now()).await.unwrap();
        assert!(repo.insert_unless_open(&second).await.unwrap().is_none());
        assert!(
            repo.insert_unless_open(&GameSession::new("them"))
                .await
                .unwrap()
                .is_none()
        );
    }
}
