//! SQLite repository.
//!
//! Methods are organized across submodules by domain:
//! - `accounts.rs` - account record load/upsert and leaderboard
//! - `web_users.rs` - web shop balances

mod accounts;
mod web_users;

use sqlx::sqlite::SqlitePool;

/// Repository for database operations.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
