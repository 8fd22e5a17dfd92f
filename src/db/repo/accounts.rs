use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite};
use tracing::warn;

use super::Repository;
use crate::db::store::{LedgerStore, StoreError};
use crate::domain::{AccountId, AccountRecord, Faction, Language};

const UPSERT_ACCOUNT: &str = r#"
    INSERT INTO accounts (
        id, fund, coupon, xp, level, faction, language,
        last_daily_ms, last_xp_ms, updated_at_ms
    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        fund = excluded.fund,
        coupon = excluded.coupon,
        xp = excluded.xp,
        level = excluded.level,
        faction = excluded.faction,
        language = excluded.language,
        last_daily_ms = excluded.last_daily_ms,
        last_xp_ms = excluded.last_xp_ms,
        updated_at_ms = excluded.updated_at_ms
"#;

fn millis_to_utc(ms: Option<i64>) -> Option<DateTime<Utc>> {
    ms.and_then(|ms| Utc.timestamp_millis_opt(ms).single())
}

fn record_from_row(row: &SqliteRow) -> AccountRecord {
    let id: String = row.get("id");
    let xp: i64 = row.get("xp");
    let level: i64 = row.get("level");

    let faction = row
        .get::<Option<String>, _>("faction")
        .and_then(|raw| match raw.parse::<Faction>() {
            Ok(f) => Some(f),
            Err(e) => {
                warn!(account = %id, error = %e, "Unreadable faction, treating as unset");
                None
            }
        });
    let language_raw: String = row.get("language");
    let language = language_raw.parse::<Language>().unwrap_or_else(|e| {
        warn!(account = %id, error = %e, "Unreadable language, using default");
        Language::default()
    });

    AccountRecord {
        fund: row.get("fund"),
        coupon: row.get("coupon"),
        xp: u64::try_from(xp).unwrap_or(0),
        level: u32::try_from(level).unwrap_or(1).max(1),
        faction,
        language,
        last_daily_claim: millis_to_utc(row.get("last_daily_ms")),
        last_xp_grant: millis_to_utc(row.get("last_xp_ms")),
        id: AccountId::new(id),
    }
}

fn bind_record<'q>(
    record: &'q AccountRecord,
    now_ms: i64,
) -> Result<sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>>, StoreError> {
    let xp = i64::try_from(record.xp).map_err(|_| StoreError::OutOfRange {
        field: "xp",
        value: record.xp,
    })?;

    Ok(sqlx::query(UPSERT_ACCOUNT)
        .bind(record.id.as_str())
        .bind(record.fund)
        .bind(record.coupon)
        .bind(xp)
        .bind(i64::from(record.level))
        .bind(record.faction.map(|f| f.as_str()))
        .bind(record.language.as_str())
        .bind(record.last_daily_claim.map(|t| t.timestamp_millis()))
        .bind(record.last_xp_grant.map(|t| t.timestamp_millis()))
        .bind(now_ms))
}

#[async_trait]
impl LedgerStore for Repository {
    async fn load(&self, id: &AccountId) -> Result<AccountRecord, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, fund, coupon, xp, level, faction, language, last_daily_ms, last_xp_ms
            FROM accounts
            WHERE id = ?
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row
            .map(|r| record_from_row(&r))
            .unwrap_or_else(|| AccountRecord::new(id.clone())))
    }

    async fn save(&self, record: &AccountRecord) -> Result<(), StoreError> {
        bind_record(record, Utc::now().timestamp_millis())?
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_all(&self, records: &[AccountRecord]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }

        let now_ms = Utc::now().timestamp_millis();
        let mut tx = self.pool.begin().await?;
        for record in records {
            bind_record(record, now_ms)?.execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn leaderboard(
        &self,
        faction: Faction,
        limit: u32,
    ) -> Result<Vec<AccountRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, fund, coupon, xp, level, faction, language, last_daily_ms, last_xp_ms
            FROM accounts
            WHERE faction = ?
            ORDER BY level DESC, xp DESC, id ASC
            LIMIT ?
            "#,
        )
        .bind(faction.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(record_from_row).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::init_db;
    use chrono::Duration;
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

    fn ranked(id: &str, faction: Faction, level: u32, xp: u64) -> AccountRecord {
        let mut record = AccountRecord::new(AccountId::new(id));
        record.faction = Some(faction);
        record.level = level;
        record.xp = xp;
        record
    }

    #[tokio::test]
    async fn test_load_unknown_returns_default() {
        let (repo, _temp) = setup_test_db().await;
        let id = AccountId::new("123");

        let record = repo.load(&id).await.expect("load failed");
        assert_eq!(record, AccountRecord::new(id));
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_fields() {
        let (repo, _temp) = setup_test_db().await;
        let claimed = Utc.with_ymd_and_hms(2025, 5, 2, 8, 30, 0).unwrap();

        let mut record = AccountRecord::new(AccountId::new("777"));
        record.fund = 12_000;
        record.coupon = 3;
        record.xp = 41;
        record.level = 6;
        record.faction = Some(Faction::Monster);
        record.language = Language::En;
        record.last_daily_claim = Some(claimed);
        record.last_xp_grant = Some(claimed + Duration::seconds(9));

        repo.save(&record).await.expect("save failed");
        let loaded = repo.load(&record.id).await.expect("load failed");
        assert_eq!(loaded, record);
    }

    #[tokio::test]
    async fn test_save_upserts() {
        let (repo, _temp) = setup_test_db().await;
        let mut record = AccountRecord::new(AccountId::new("1"));
        record.fund = 10;
        repo.save(&record).await.unwrap();

        record.fund = 25;
        record.faction = None;
        repo.save(&record).await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(repo.load(&record.id).await.unwrap().fund, 25);
    }

    #[tokio::test]
    async fn test_save_all_is_atomic() {
        let (repo, _temp) = setup_test_db().await;
        let good = AccountRecord::new(AccountId::new("good"));
        let mut bad = AccountRecord::new(AccountId::new("bad"));
        bad.fund = -5; // violates CHECK (fund >= 0)

        assert!(repo.save_all(&[good.clone(), bad]).await.is_err());

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_leaderboard_orders_by_level_then_xp() {
        let (repo, _temp) = setup_test_db().await;
        repo.save_all(&[
            ranked("a", Faction::Hero, 3, 10),
            ranked("b", Faction::Hero, 5, 0),
            ranked("c", Faction::Hero, 3, 90),
            ranked("d", Faction::Monster, 50, 0),
        ])
        .await
        .unwrap();

        let top = repo.leaderboard(Faction::Hero, 10).await.unwrap();
        let ids: Vec<&str> = top.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);

        let top1 = repo.leaderboard(Faction::Hero, 1).await.unwrap();
        assert_eq!(top1.len(), 1);
    }
}
