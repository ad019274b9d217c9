//! Account and game result repository traits.

use async_trait::async_trait;

use super::model::{Account, GameResult};
use crate::error::Result;

/// An abstract repository for player accounts.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Stores a new account.
    ///
    /// # Errors
    ///
    /// Returns `EscapeError::Conflict` if the username is already taken.
    async fn insert(&self, account: &Account) -> Result<()>;

    /// Finds an account by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>>;

    /// Finds an account by id.
    async fn find_by_id(&self, account_id: &str) -> Result<Option<Account>>;

    /// Replaces a stored account.
    ///
    /// # Errors
    ///
    /// Returns `EscapeError::NotFound` if the account does not exist.
    async fn save(&self, account: &Account) -> Result<()>;

    /// Lists every account, in registration order.
    async fn list_all(&self) -> Result<Vec<Account>>;
}

/// An abstract append-only log of completed games.
#[async_trait]
pub trait GameResultRepository: Send + Sync {
    /// Appends a result.
    async fn record(&self, result: &GameResult) -> Result<()>;

    /// Lists every recorded result.
    async fn list_all(&self) -> Result<Vec<GameResult>>;
}
