use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// Registry of per-session locks.
///
/// Turns against the same session are serialized by holding that session's
/// lock across load, evaluation and persist. Different sessions use
/// different locks and proceed independently.
pub struct SessionLocks {
    locks: Arc<RwLock<HashMap<String, Arc<Mutex<()>>>>>,
}

impl SessionLocks {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Waits for exclusive access to `key`.
    ///
    /// # Returns
    ///
    /// A guard releasing the lock when dropped. Hand it to
    /// [`SessionLocks::release`] instead to also prune the entry.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let existing = {
            let locks = self.locks.read().await;
            locks.get(key).cloned()
        };

        let lock = match existing {
            Some(lock) => lock,
            None => {
                let mut locks = self.locks.write().await;
                locks
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(())))
                    .clone()
            }
        };

        lock.lock_owned().await
    }

    /// Releases `guard`, the lock of `key`, and drops the registry entry
    /// when no other caller holds or waits for it.
    ///
    /// Every clone of the lock outside the registry belongs to a holder or a
    /// waiter, so an entry whose only reference is the registry's is idle.
    pub async fn release(&self, key: &str, guard: OwnedMutexGuard<()>) {
        drop(guard);
        let mut locks = self.locks.write().await;
        if locks
            .get(key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(key);
        }
    }

    /// Number of keys with a registered lock.
    pub async fn tracked(&self) -> usize {
        self.locks.read().await.len()
    }
}

impl Default for SessionLocks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_session_is_exclusive() {
        let locks = SessionLocks::new();
        let guard = locks.acquire("s1").await;
        let second = tokio::time::timeout(Duration::from_millis(50), locks.acquire("s1")).await;
        assert!(second.is_err());
        drop(guard);
        assert!(
            tokio::time::timeout(Duration::from_millis(50), locks.acquire("s1"))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_different_sessions_do_not_block() {
        let locks = SessionLocks::new();
        let _first = locks.acquire("s1").await;
        let second = tokio::time::timeout(Duration::from_millis(50), locks.acquire("s2")).await;
        assert!(second.is_ok());
        assert_eq!(locks.tracked().await, 2);
    }

    #[tokio::test]
    async fn test_release_prunes_idle_entry() {
        let locks = SessionLocks::new();
        let guard = locks.acquire("s1").await;
        locks.release("s1", guard).await;
        assert_eq!(locks.tracked().await, 0);
    }

    #[tokio::test]
    async fn test_release_keeps_entry_with_waiter() {
        let locks = Arc::new(SessionLocks::new());
        let guard = locks.acquire("s1").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let guard = locks.acquire("s1").await;
                locks.release("s1", guard).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        locks.release("s1", guard).await;
        assert_eq!(locks.tracked().await, 1);

        waiter.await.unwrap();
        assert_eq!(locks.tracked().await, 0);
    }
}
