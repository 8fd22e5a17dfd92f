//! Database initialization: connection pool, pragmas and schema.

use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use tracing::{debug, info, warn};

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Pragmas applied to every pooled connection, in order.
const CONNECTION_PRAGMAS: &[&str] = &[
    "PRAGMA foreign_keys = ON",
    "PRAGMA busy_timeout = 5000",
    "PRAGMA synchronous = NORMAL",
];

/// Open (creating if needed) the SQLite ledger at `db_path` and apply the schema.
///
/// Safe to call on an existing database.
pub async fn init_db(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(path = %parent.display(), error = %e, "Could not create database directory");
            }
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .after_connect(|conn, _meta| Box::pin(async move { configure_connection(conn).await }))
        .connect(&format!("sqlite:{}?mode=rwc", db_path))
        .await?;

    apply_schema(&pool).await?;

    info!("Ledger database ready at {}", db_path);
    Ok(pool)
}

/// Execute every statement of the embedded schema. All statements are
/// `IF NOT EXISTS`, so reapplying is harmless.
async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let statements = SCHEMA_SQL
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let mut applied = 0usize;
    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
        applied += 1;
    }

    info!(statements = applied, "Schema applied");
    Ok(())
}

async fn configure_connection(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    // journal_mode reports the mode actually in effect
    let row = sqlx::query("PRAGMA journal_mode = WAL")
        .fetch_one(&mut *conn)
        .await?;
    let journal_mode: String = row.get(0);
    debug!(journal_mode = %journal_mode, "SQLite journal mode");

    for pragma in CONNECTION_PRAGMAS {
        sqlx::query(pragma).execute(&mut *conn).await?;
    }
    Ok(())
}
