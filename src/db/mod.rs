//! Database module for SQLite operations.
//!
//! This module provides:
//! - Database initialization and migrations
//! - SQLite pragma configuration
//! - The ledger store abstraction and its SQLite / in-memory implementations

pub mod memory;
pub mod migrations;
pub mod repo;
pub mod store;

pub use memory::MemoryLedger;
pub use migrations::init_db;
pub use repo::Repository;
pub use store::{LedgerStore, StoreError, WebUser, WebWallet};
