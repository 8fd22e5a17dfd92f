//! In-memory ledger store for tests and local experiments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::store::{LedgerStore, StoreError, WebUser, WebWallet};
use crate::domain::{AccountId, AccountRecord, Faction};

#[derive(Debug, Default)]
pub struct MemoryLedger {
    accounts: RwLock<HashMap<AccountId, AccountRecord>>,
    web_users: RwLock<HashMap<String, i64>>,
    unavailable: AtomicBool,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a saved account.
    pub fn with_account(mut self, record: AccountRecord) -> Self {
        self.accounts.get_mut().insert(record.id.clone(), record);
        self
    }

    /// Seed a web shop user.
    pub fn with_web_user(mut self, username: &str, balance: i64) -> Self {
        self.web_users.get_mut().insert(username.to_string(), balance);
        self
    }

    /// Make every subsequent call fail with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of accounts that have been saved.
    pub async fn saved_count(&self) -> usize {
        self.accounts.read().await.len()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory ledger offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn load(&self, id: &AccountId) -> Result<AccountRecord, StoreError> {
        self.check_available()?;
        Ok(self
            .accounts
            .read()
            .await
            .get(id)
            .cloned()
            .unwrap_or_else(|| AccountRecord::new(id.clone())))
    }

    async fn save(&self, record: &AccountRecord) -> Result<(), StoreError> {
        self.check_available()?;
        self.accounts
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn save_all(&self, records: &[AccountRecord]) -> Result<(), StoreError> {
        self.check_available()?;
        let mut accounts = self.accounts.write().await;
        for record in records {
            accounts.insert(record.id.clone(), record.clone());
        }
        Ok(())
    }

    async fn leaderboard(
        &self,
        faction: Faction,
        limit: u32,
    ) -> Result<Vec<AccountRecord>, StoreError> {
        self.check_available()?;
        let mut members: Vec<AccountRecord> = self
            .accounts
            .read()
            .await
            .values()
            .filter(|r| r.faction == Some(faction))
            .cloned()
            .collect();
        members.sort_by(|a, b| {
            b.level
                .cmp(&a.level)
                .then(b.xp.cmp(&a.xp))
                .then(a.id.cmp(&b.id))
        });
        members.truncate(limit as usize);
        Ok(members)
    }
}

#[async_trait]
impl WebWallet for MemoryLedger {
    async fn find_web_user(&self, username: &str) -> Result<Option<WebUser>, StoreError> {
        self.check_available()?;
        Ok(self
            .web_users
            .read()
            .await
            .get(username)
            .map(|balance| WebUser {
                username: username.to_string(),
                balance: *balance,
            }))
    }

    async fn adjust_web_balance(&self, username: &str, delta: i64) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut users = self.web_users.write().await;
        match users.get_mut(username) {
            Some(balance) => match balance.checked_add(delta) {
                Some(next) if next >= 0 => {
                    *balance = next;
                    Ok(true)
                }
                _ => Ok(false),
            },
            None => Ok(false),
        }
    }
}
