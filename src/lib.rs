pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod i18n;
pub mod orchestration;
pub mod purchase;
pub mod roles;

pub use config::Config;
pub use db::{init_db, LedgerStore, MemoryLedger, Repository, WebWallet};
pub use domain::{AccountId, AccountRecord, CurrencyKind, Faction, Language};
pub use error::AppError;
pub use orchestration::{Economy, OrderRunner};
