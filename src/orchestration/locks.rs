use dashmap::DashMap;
use std::sync::{Arc, Weak};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::AccountId;

/// Entries above this count trigger a sweep of released locks.
const SWEEP_THRESHOLD: usize = 1024;

/// Async mutex per account id.
///
/// Locks are created on demand and dropped once no guard or waiter holds
/// them, so the map only grows with concurrently active accounts.
#[derive(Debug, Default)]
pub struct AccountLocks {
    inner: DashMap<AccountId, Weak<AsyncMutex<()>>>,
}

/// Guard for one or two account locks.
#[derive(Debug)]
pub struct AccountGuard {
    _first: OwnedMutexGuard<()>,
    _second: Option<OwnedMutexGuard<()>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, id: &AccountId) -> Arc<AsyncMutex<()>> {
        let created = {
            let mut entry = self.inner.entry(id.clone()).or_default();
            if let Some(existing) = entry.upgrade() {
                return existing;
            }
            let created = Arc::new(AsyncMutex::new(()));
            *entry = Arc::downgrade(&created);
            created
        };

        // The shard guard above must be released before sweeping.
        if self.inner.len() >= SWEEP_THRESHOLD {
            self.inner.retain(|_, weak| weak.strong_count() > 0);
        }
        created
    }

    /// Wait for exclusive access to `id`.
    pub async fn lock(&self, id: &AccountId) -> AccountGuard {
        AccountGuard {
            _first: self.handle(id).lock_owned().await,
            _second: None,
        }
    }

    /// Wait for exclusive access to both accounts.
    ///
    /// Locks are taken in id order so two opposite transfers cannot deadlock.
    /// Equal ids take a single lock.
    pub async fn lock_pair(&self, a: &AccountId, b: &AccountId) -> AccountGuard {
        if a == b {
            return self.lock(a).await;
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        let first = self.handle(low).lock_owned().await;
        let second = self.handle(high).lock_owned().await;
        AccountGuard {
            _first: first,
            _second: Some(second),
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.inner
            .iter()
            .filter(|entry| entry.value().strong_count() > 0)
            .count()
    }
}
