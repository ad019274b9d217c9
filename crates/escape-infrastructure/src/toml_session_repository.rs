//! TOML-based SessionRepository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use escape_core::error::{EscapeError, Result};
use escape_core::session::{GameSession, SessionRepository};
use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::{AtomicTomlFile, FileLock};

/// Ids become file names; refuse anything that could escape the directory.
fn check_file_stem(kind: &str, id: &str) -> Result<()> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(EscapeError::invalid_input(format!(
            "Malformed {} id '{}'",
            kind, id
        )));
    }
    Ok(())
}

/// A repository storing each game session in its own TOML file.
///
/// ```text
/// base_dir/
/// └── sessions/
///     ├── <session-id>.toml
///     ├── <session-id>.lock
///     └── owners/
///         └── <owner-id>.lock
/// ```
///
/// Writes go through [`AtomicTomlFile`], so the version check of
/// [`SessionRepository::update`] and the write happen under the same file
/// lock, also across processes sharing the directory. Operations over all
/// sessions of one owner additionally hold that owner's lock file.
pub struct TomlSessionRepository {
    sessions_dir: PathBuf,
}

impl TomlSessionRepository {
    /// Creates a new `TomlSessionRepository` rooted at `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sessions directory cannot be created.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let sessions_dir = base_dir.as_ref().join("sessions");
        fs::create_dir_all(&sessions_dir)?;
        Ok(Self { sessions_dir })
    }

    fn session_file(&self, session_id: &str) -> Result<AtomicTomlFile<GameSession>> {
        check_file_stem("session", session_id)?;
        Ok(AtomicTomlFile::new(
            self.sessions_dir.join(format!("{}.toml", session_id)),
        ))
    }

    fn lock_owner(&self, owner_id: &str) -> Result<FileLock> {
        check_file_stem("owner", owner_id)?;
        let lock_path = self
            .sessions_dir
            .join("owners")
            .join(format!("{}.lock", owner_id));
        Ok(FileLock::at(&lock_path)?)
    }

    /// Loads every session file, skipping files that fail to parse.
    fn load_all(&self) -> Result<Vec<GameSession>> {
        let mut sessions = Vec::new();
        for entry in fs::read_dir(&self.sessions_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
                continue;
            }
            match AtomicTomlFile::<GameSession>::new(path.clone()).load() {
                Ok(Some(session)) => sessions.push(session),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        "[TomlSessionRepository] Skipping unreadable session file {:?}: {}",
                        path,
                        e
                    );
                }
            }
        }
        sessions.sort_by(GameSession::recency_order);
        Ok(sessions)
    }
}

#[async_trait]
impl SessionRepository for TomlSessionRepository {
    async fn insert(&self, session: &GameSession) -> Result<()> {
        let file = self.session_file(&session.id)?;
        file.update(|stored| {
            if stored.is_some() {
                return Err(EscapeError::conflict(format!(
                    "Session '{}' already exists",
                    session.id
                )));
            }
            *stored = Some(session.clone());
            Ok(((), true))
        })?;
        tracing::debug!("[TomlSessionRepository] Inserted session {}", session.id);
        Ok(())
    }

    async fn insert_unless_open(&self, session: &GameSession) -> Result<Option<GameSession>> {
        let _owner_lock = self.lock_owner(&session.owner_id)?;
        if let Some(open) = self.find_open_for_owner(&session.owner_id).await? {
            tracing::debug!(
                "[TomlSessionRepository] Owner {} already has open session {}",
                session.owner_id,
                open.id
            );
            return Ok(Some(open));
        }
        self.insert(session).await?;
        Ok(None)
    }

    async fn find_by_id(&self, session_id: &str) -> Result<Option<GameSession>> {
        let file = self.session_file(session_id)?;
        Ok(file.load()?)
    }

    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<GameSession>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|session| session.owner_id == owner_id)
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<GameSession>> {
        self.load_all()
    }

    async fn update(&self, session: &GameSession, expected_version: u64) -> Result<()> {
        let file = self.session_file(&session.id)?;
        file.update(|stored| {
            let current = stored
                .as_mut()
                .ok_or_else(|| EscapeError::not_found("GameSession", &session.id))?;
            if current.version != expected_version {
                tracing::warn!(
                    "[TomlSessionRepository] Stale write on {}: expected v{}, stored v{}",
                    session.id,
                    expected_version,
                    current.version
                );
                return Err(EscapeError::conflict(format!(
                    "Session '{}' was modified concurrently",
                    session.id
                )));
            }
            *current = session.clone();
            Ok(((), true))
        })?;
        tracing::debug!(
            "[TomlSessionRepository] Updated session {} to v{}",
            session.id,
            session.version
        );
        Ok(())
    }

    async fn close_open_for_owner(
        &self,
        owner_id: &str,
        closed_at: DateTime<Utc>,
    ) -> Result<Vec<String>> {
        let _owner_lock = self.lock_owner(owner_id)?;
        let mut closed = Vec::new();
        for candidate in self.list_for_owner(owner_id).await? {
            if candidate.game_over {
                continue;
            }
            let file = self.session_file(&candidate.id)?;
            let was_open = file.update(|stored| {
                let changed = stored
                    .as_mut()
                    .map(|session| session.close(closed_at))
                    .unwrap_or(false);
                Ok((changed, changed))
            })?;
            if was_open {
                closed.push(candidate.id);
            }
        }
        Ok(closed)
    }
}
