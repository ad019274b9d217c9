use async_trait::async_trait;
use escape_core::account::{Account, AccountRepository, GameResult, GameResultRepository};
use escape_core::error::{EscapeError, Result};
use tokio::sync::RwLock;

/// Account store held in process memory, in registration order.
#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<Vec<Account>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn insert(&self, account: &Account) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        if accounts.iter().any(|a| a.username == account.username) {
            return Err(EscapeError::conflict(format!(
                "Username '{}' is already registered",
                account.username
            )));
        }
        accounts.push(account.clone());
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.username == username).cloned())
    }

    async fn find_by_id(&self, account_id: &str) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.id == account_id).cloned())
    }

    async fn save(&self, account: &Account) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let stored = accounts
            .iter_mut()
            .find(|a| a.id == account.id)
            .ok_or_else(|| EscapeError::not_found("Account", &account.id))?;
        *stored = account.clone();
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Account>> {
        Ok(self.accounts.read().await.clone())
    }
}

/// Completed-game log held in process memory.
#[derive(Default)]
pub struct InMemoryGameResultRepository {
    results: RwLock<Vec<GameResult>>,
}

impl InMemoryGameResultRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameResultRepository for InMemoryGameResultRepository {
    async fn record(&self, result: &GameResult) -> Result<()> {
        self.results.write().await.push(result.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<GameResult>> {
        Ok(self.results.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let repo = InMemoryAccountRepository::new();
        repo.insert(&Account::new("alice").unwrap()).await.unwrap();
        let err = repo.insert(&Account::new("alice").unwrap()).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_save_replaces_and_requires_existing() {
        let repo = InMemoryAccountRepository::new();
        let mut account = Account::new("alice").unwrap();
        repo.insert(&account).await.unwrap();

        account.best_score = 500;
        repo.save(&account).await.unwrap();
        let stored = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(stored.best_score, 500);

        let ghost = Account::new("ghost").unwrap();
        assert!(repo.save(&ghost).await.unwrap_err().is_not_found());
    }
}
