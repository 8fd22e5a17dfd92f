use chrono::{Duration, TimeZone, Utc};
use guildbank::db::init_db;
use guildbank::engine::{self, required_xp, Rules};
use guildbank::{AccountId, AccountRecord, Faction, LedgerStore, Repository};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

async fn setup_repo() -> (Repository, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("scenario.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    (Repository::new(pool), temp_dir)
}

#[tokio::test]
async fn test_level_up_cooldown_and_resume_through_store() {
    let (repo, _temp) = setup_repo().await;
    let rules = Rules::default();
    let mut rng = StdRng::seed_from_u64(8);
    let id = AccountId::new("scenario");
    let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();

    let mut record = repo.load(&id).await.unwrap();
    assert_eq!(record, AccountRecord::new(id.clone()));

    // Exactly the level-1 threshold.
    let threshold = required_xp(&rules.progression, 1);
    assert_eq!(threshold, 282);
    let grant = engine::grant_xp(&mut record, threshold, t0, &rules, &mut rng);
    repo.save(&record).await.unwrap();

    assert_eq!(grant.levels_gained, 1);
    assert_eq!(grant.rewards.len(), 1);
    let stored = repo.load(&id).await.unwrap();
    assert_eq!(stored.level, 2);
    assert_eq!(stored.xp, 0);
    assert_eq!(stored.fund, grant.rewards[0]);
    assert!((5000..=10000).contains(&stored.fund));

    // Inside the cooldown window nothing changes.
    let mut record = stored.clone();
    let grant = engine::grant_xp(&mut record, 1, t0 + Duration::seconds(2), &rules, &mut rng);
    assert!(!grant.applied);
    assert_eq!(record, stored);

    // After the cooldown the grant applies.
    let grant = engine::grant_xp(&mut record, 1, t0 + Duration::seconds(6), &rules, &mut rng);
    repo.save(&record).await.unwrap();
    assert!(grant.applied);
    let stored = repo.load(&id).await.unwrap();
    assert_eq!(stored.level, 2);
    assert_eq!(stored.xp, 1);
}

#[tokio::test]
async fn test_large_grant_cascades_and_tier_changes() {
    let (repo, _temp) = setup_repo().await;
    let rules = Rules::default();
    let mut rng = StdRng::seed_from_u64(3);
    let id = AccountId::new("climber");
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();

    let mut record = repo.load(&id).await.unwrap();
    record.faction = Some(Faction::Hero);

    // 282 + 519 + 800 + 1118 reaches level 5 with nothing left over.
    let grant = engine::grant_xp(&mut record, 2719, now, &rules, &mut rng);
    repo.save(&record).await.unwrap();

    assert_eq!(grant.levels_gained, 4);
    assert_eq!(grant.new_tier().map(|t| t.as_str()), Some("HERO_B"));
    let stored = repo.load(&id).await.unwrap();
    assert_eq!((stored.level, stored.xp), (5, 0));
    assert_eq!(stored.fund, grant.total_reward());
    assert_eq!(stored.faction, Some(Faction::Hero));
}
