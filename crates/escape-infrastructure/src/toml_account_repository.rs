//! TOML-based account and game result stores.
//!
//! Accounts live in `accounts.toml` and completed games in `results.toml`,
//! each a single document rewritten atomically on change.

use async_trait::async_trait;
use escape_core::account::{Account, AccountRepository, GameResult, GameResultRepository};
use escape_core::error::{EscapeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::storage::AtomicTomlFile;

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountsDocument {
    #[serde(default)]
    accounts: Vec<Account>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ResultsDocument {
    #[serde(default)]
    results: Vec<GameResult>,
}

/// Account store backed by `accounts.toml`.
pub struct TomlAccountRepository {
    file: AtomicTomlFile<AccountsDocument>,
}

impl TomlAccountRepository {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            file: AtomicTomlFile::new(base_dir.as_ref().join("accounts.toml")),
        }
    }

    fn load(&self) -> Result<Vec<Account>> {
        Ok(self.file.load()?.unwrap_or_default().accounts)
    }
}

#[async_trait]
impl AccountRepository for TomlAccountRepository {
    async fn insert(&self, account: &Account) -> Result<()> {
        self.file.update(|document| {
            let document = document.get_or_insert_with(AccountsDocument::default);
            if document
                .accounts
                .iter()
                .any(|a| a.username == account.username)
            {
                return Err(EscapeError::conflict(format!(
                    "Username '{}' is already registered",
                    account.username
                )));
            }
            document.accounts.push(account.clone());
            Ok(((), true))
        })?;
        tracing::debug!("[TomlAccountRepository] Inserted account '{}'", account.username);
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        Ok(self.load()?.into_iter().find(|a| a.username == username))
    }

    async fn find_by_id(&self, account_id: &str) -> Result<Option<Account>> {
        Ok(self.load()?.into_iter().find(|a| a.id == account_id))
    }

    async fn save(&self, account: &Account) -> Result<()> {
        self.file.update(|document| {
            let stored = document
                .as_mut()
                .and_then(|document| document.accounts.iter_mut().find(|a| a.id == account.id))
                .ok_or_else(|| EscapeError::not_found("Account", &account.id))?;
            *stored = account.clone();
            Ok(((), true))
        })?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Account>> {
        self.load()
    }
}

/// Completed-game log backed by `results.toml`.
pub struct TomlGameResultRepository {
    file: AtomicTomlFile<ResultsDocument>,
}

impl TomlGameResultRepository {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            file: AtomicTomlFile::new(base_dir.as_ref().join("results.toml")),
        }
    }
}

#[async_trait]
impl GameResultRepository for TomlGameResultRepository {
    async fn record(&self, result: &GameResult) -> Result<()> {
        self.file.update(|document| {
            document
                .get_or_insert_with(ResultsDocument::default)
                .results
                .push(result.clone());
            Ok(((), true))
        })?;
        tracing::debug!(
            "[TomlGameResultRepository] Recorded result of session {}",
            result.session_id
        );
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<GameResult>> {
        Ok(self.file.load()?.unwrap_or_default().results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_accounts_persist_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let mut account = Account::new("trinity").unwrap();
        TomlAccountRepository::new(temp_dir.path())
            .insert(&account)
            .await
            .unwrap();

        account.total_score = 1234;
        let reopened = TomlAccountRepository::new(temp_dir.path());
        reopened.save(&account).await.unwrap();

        let stored = reopened.find_by_username("trinity").await.unwrap().unwrap();
        assert_eq!(stored.total_score, 1234);
        assert_eq!(reopened.find_by_id(&account.id).await.unwrap().unwrap().username, "trinity");
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let temp_dir = TempDir::new().unwrap();
        let repo = TomlAccountRepository::new(temp_dir.path());
        repo.insert(&Account::new("trinity").unwrap()).await.unwrap();
        let err = repo.insert(&Account::new("trinity").unwrap()).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_of_unknown_account_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let repo = TomlAccountRepository::new(temp_dir.path());
        let err = repo.save(&Account::new("nobody").unwrap()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_results_append() {
        let temp_dir = TempDir::new().unwrap();
        let repo = TomlGameResultRepository::new(temp_dir.path());
        assert!(repo.list_all().await.unwrap().is_empty());

        for score in [300, 700] {
            repo.record(&GameResult {
                owner_id: "a".to_string(),
                session_id: format!("s{}", score),
                final_score: score,
                stages_completed: 5,
                total_attempts: 12,
                completed_at: Utc::now(),
            })
            .await
            .unwrap();
        }
        let results = repo.list_all().await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].final_score, 700);
    }
}
