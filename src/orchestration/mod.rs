//! Request orchestration: load, compute, save.
//!
//! Every mutation of an account runs while holding that account's lock, so
//! concurrent commands for one account are applied one after another.

pub mod locks;
pub mod orders;
pub mod service;

pub use locks::AccountLocks;
pub use orders::{MAX_ORDER_QUANTITY, OrderError, OrderReport, OrderRequest, OrderRunner, PackageResult};
pub use service::{ActivityOutcome, Economy, FactionChange, Profile, ServiceError};
