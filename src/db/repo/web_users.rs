use async_trait::async_trait;
use sqlx::Row;

use super::Repository;
use crate::db::store::{StoreError, WebUser, WebWallet};

impl Repository {
    /// Create or replace a web shop user with the given balance.
    pub async fn upsert_web_user(&self, username: &str, balance: i64) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO web_users (username, balance) VALUES (?, ?)
            ON CONFLICT(username) DO UPDATE SET balance = excluded.balance
            "#,
        )
        .bind(username)
        .bind(balance)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl WebWallet for Repository {
    async fn find_web_user(&self, username: &str) -> Result<Option<WebUser>, StoreError> {
        let row = sqlx::query("SELECT username, balance FROM web_users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| WebUser {
            username: r.get("username"),
            balance: r.get("balance"),
        }))
    }

    async fn adjust_web_balance(&self, username: &str, delta: i64) -> Result<bool, StoreError> {
        // Single statement: the balance check and update cannot interleave.
        let result = sqlx::query(
            r#"
            UPDATE web_users
            SET balance = balance + ?
            WHERE username = ? AND balance + ? >= 0
            "#,
        )
        .bind(delta)
        .bind(username)
        .bind(delta)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::init_db;
    use tempfile::TempDir;

    async fn setup_test_db() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }

    #[tokio::test]
    async fn test_adjust_existing_user() {
        let (repo, _temp) = setup_test_db().await;
        repo.upsert_web_user("alice", 50_000).await.unwrap();

        assert!(repo.adjust_web_balance("alice", -14_000).await.unwrap());
        assert!(repo.adjust_web_balance("alice", 1_000).await.unwrap());

        let user = repo.find_web_user("alice").await.unwrap().unwrap();
        assert_eq!(user.balance, 37_000);
    }

    #[tokio::test]
    async fn test_adjust_refuses_negative_result() {
        let (repo, _temp) = setup_test_db().await;
        repo.upsert_web_user("bob", 100).await.unwrap();

        assert!(!repo.adjust_web_balance("bob", -101).await.unwrap());
        assert_eq!(repo.find_web_user("bob").await.unwrap().unwrap().balance, 100);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let (repo, _temp) = setup_test_db().await;
        assert!(repo.find_web_user("ghost").await.unwrap().is_none());
        assert!(!repo.adjust_web_balance("ghost", 10).await.unwrap());
    }
}
