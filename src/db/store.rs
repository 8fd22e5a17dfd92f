//! Ledger store abstraction.
//!
//! The engine never touches storage. Request handlers load a record, run a
//! pure operation, and save the result through these traits.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::domain::{AccountId, AccountRecord, Faction};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached or refused the statement.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("value out of range for {field}: {value}")]
    OutOfRange { field: &'static str, value: u64 },
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Persistence of one record per account.
#[async_trait]
pub trait LedgerStore: Send + Sync + fmt::Debug {
    /// Load the record for `id`, or the default record if none was saved yet.
    async fn load(&self, id: &AccountId) -> Result<AccountRecord, StoreError>;

    /// Insert or update a record.
    async fn save(&self, record: &AccountRecord) -> Result<(), StoreError>;

    /// Insert or update several records together.
    async fn save_all(&self, records: &[AccountRecord]) -> Result<(), StoreError>;

    /// Top accounts of `faction`, ordered by level then xp, descending.
    async fn leaderboard(&self, faction: Faction, limit: u32)
        -> Result<Vec<AccountRecord>, StoreError>;
}

/// Account on the companion web shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebUser {
    pub username: String,
    pub balance: i64,
}

/// Real-money balances of web shop users.
#[async_trait]
pub trait WebWallet: Send + Sync + fmt::Debug {
    async fn find_web_user(&self, username: &str) -> Result<Option<WebUser>, StoreError>;

    /// Apply `delta` to the balance. Returns false if the user does not exist
    /// or the balance would drop below zero.
    async fn adjust_web_balance(&self, username: &str, delta: i64) -> Result<bool, StoreError>;
}
