use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info};

use super::AccountLocks;
use crate::db::{LedgerStore, StoreError};
use crate::domain::{AccountId, AccountRecord, CurrencyKind, Faction, Language};
use crate::engine::{self, DailyReward, EconomyError, Rules, TierLabel, WagerOutcome, XpGrant};
use crate::roles::{plan_role_sync, RoleSync};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Rejected(#[from] EconomyError),
    /// The store failed; the mutation may or may not have been applied.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Account view with derived progression fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(flatten)]
    pub record: AccountRecord,
    pub tier: Option<TierLabel>,
    /// XP needed to leave the current level.
    pub required_xp: u64,
}

#[derive(Debug, Clone)]
pub struct ActivityOutcome {
    pub record: AccountRecord,
    pub grant: XpGrant,
    /// Present when the account leveled up and roles may need reconciling.
    pub roles: Option<RoleSync>,
}

#[derive(Debug, Clone)]
pub struct FactionChange {
    pub record: AccountRecord,
    pub changed: bool,
    pub roles: RoleSync,
}

/// Progression and economy commands against the ledger store.
///
/// Each command re-loads the record, applies one engine operation and saves
/// it while holding the account lock. Nothing is cached between commands.
#[derive(Debug)]
pub struct Economy {
    store: Arc<dyn LedgerStore>,
    rules: Rules,
    role_ids: HashMap<String, u64>,
    locks: AccountLocks,
    rng: Mutex<StdRng>,
}

impl Economy {
    pub fn new(store: Arc<dyn LedgerStore>, rules: Rules, role_ids: HashMap<String, u64>) -> Self {
        Self::with_rng(store, rules, role_ids, StdRng::from_entropy())
    }

    pub fn with_seed(
        store: Arc<dyn LedgerStore>,
        rules: Rules,
        role_ids: HashMap<String, u64>,
        seed: u64,
    ) -> Self {
        Self::with_rng(store, rules, role_ids, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        store: Arc<dyn LedgerStore>,
        rules: Rules,
        role_ids: HashMap<String, u64>,
        rng: StdRng,
    ) -> Self {
        Self {
            store,
            rules,
            role_ids,
            locks: AccountLocks::new(),
            rng: Mutex::new(rng),
        }
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Run `f` with the shared random source. Never held across an await.
    fn draw<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut rng)
    }

    fn role_plan(&self, record: &AccountRecord) -> RoleSync {
        plan_role_sync(&self.rules.ranks, &self.role_ids, record.faction, record.level)
    }

    pub async fn profile(&self, id: &AccountId) -> Result<Profile, ServiceError> {
        let record = self.store.load(id).await?;
        Ok(Profile {
            tier: self
                .rules
                .ranks
                .derive_tier(record.faction, record.level)
                .cloned(),
            required_xp: engine::required_xp(&self.rules.progression, record.level),
            record,
        })
    }

    /// Passive XP for a chat message.
    pub async fn record_message(
        &self,
        id: &AccountId,
        now: DateTime<Utc>,
    ) -> Result<ActivityOutcome, ServiceError> {
        let _guard = self.locks.lock(id).await;
        let mut record = self.store.load(id).await?;

        let grant = self.draw(|rng| {
            let amount = rng.gen_range(self.rules.progression.message_xp.clone());
            engine::grant_xp(&mut record, amount, now, &self.rules, rng)
        });

        if !grant.applied {
            debug!(account = %id, "XP grant within cooldown, skipped");
            return Ok(ActivityOutcome {
                record,
                grant,
                roles: None,
            });
        }

        self.store.save(&record).await?;
        let roles = if grant.leveled_up() {
            info!(
                account = %id,
                level = record.level,
                levels_gained = grant.levels_gained,
                reward = grant.total_reward(),
                "Account leveled up"
            );
            Some(self.role_plan(&record))
        } else {
            None
        };

        Ok(ActivityOutcome {
            record,
            grant,
            roles,
        })
    }

    pub async fn claim_daily(
        &self,
        id: &AccountId,
        now: DateTime<Utc>,
    ) -> Result<(AccountRecord, DailyReward), ServiceError> {
        let _guard = self.locks.lock(id).await;
        let mut record = self.store.load(id).await?;

        let reward =
            self.draw(|rng| engine::claim_daily(&mut record, now, &self.rules.economy, rng))?;
        self.store.save(&record).await?;

        info!(account = %id, fund = reward.fund, coupon = reward.coupon, "Daily reward claimed");
        Ok((record, reward))
    }

    pub async fn exchange(&self, id: &AccountId, amount: i64) -> Result<AccountRecord, ServiceError> {
        let _guard = self.locks.lock(id).await;
        let mut record = self.store.load(id).await?;

        engine::exchange(&mut record, amount)?;
        self.store.save(&record).await?;

        info!(account = %id, amount, "Coupon exchanged for fund");
        Ok(record)
    }

    /// Move currency between two accounts; both records are saved together.
    pub async fn transfer(
        &self,
        sender: &AccountId,
        receiver: &AccountId,
        kind: CurrencyKind,
        amount: i64,
    ) -> Result<(AccountRecord, AccountRecord), ServiceError> {
        if amount <= 0 {
            return Err(EconomyError::InvalidAmount(amount).into());
        }
        if sender == receiver {
            return Err(EconomyError::SelfTransfer.into());
        }

        let _guard = self.locks.lock_pair(sender, receiver).await;
        let (mut from, mut to) =
            futures::try_join!(self.store.load(sender), self.store.load(receiver))?;

        engine::transfer(&mut from, &mut to, kind, amount)?;
        self.store.save_all(&[from.clone(), to.clone()]).await?;

        info!(from = %sender, to = %receiver, %kind, amount, "Transfer committed");
        Ok((from, to))
    }

    pub async fn wager(&self, id: &AccountId, kind: CurrencyKind) -> Result<WagerOutcome, ServiceError> {
        let _guard = self.locks.lock(id).await;
        let mut record = self.store.load(id).await?;

        let outcome =
            self.draw(|rng| engine::wager(&mut record, kind, &self.rules.economy, rng))?;
        self.store.save(&record).await?;

        info!(
            account = %id,
            %kind,
            won = outcome.won,
            multiplier = outcome.multiplier(),
            stake = outcome.stake,
            new_balance = outcome.new_balance,
            "Wager settled"
        );
        Ok(outcome)
    }

    /// Mint currency into an account.
    pub async fn credit(
        &self,
        id: &AccountId,
        kind: CurrencyKind,
        amount: i64,
    ) -> Result<AccountRecord, ServiceError> {
        let _guard = self.locks.lock(id).await;
        let mut record = self.store.load(id).await?;

        engine::credit(&mut record, kind, amount)?;
        self.store.save(&record).await?;

        info!(account = %id, %kind, amount, "Currency minted");
        Ok(record)
    }

    /// Join `faction`, leaving any other. Joining the current faction changes nothing.
    pub async fn join_faction(
        &self,
        id: &AccountId,
        faction: Faction,
    ) -> Result<FactionChange, ServiceError> {
        let _guard = self.locks.lock(id).await;
        let mut record = self.store.load(id).await?;

        let changed = record.faction != Some(faction);
        if changed {
            let previous = record.faction.replace(faction);
            self.store.save(&record).await?;
            info!(account = %id, ?previous, %faction, "Faction joined");
        }

        Ok(FactionChange {
            roles: self.role_plan(&record),
            record,
            changed,
        })
    }

    /// Leave `faction`; ignored unless it is the account's current faction.
    pub async fn leave_faction(
        &self,
        id: &AccountId,
        faction: Faction,
    ) -> Result<FactionChange, ServiceError> {
        let _guard = self.locks.lock(id).await;
        let mut record = self.store.load(id).await?;

        let changed = record.faction == Some(faction);
        if changed {
            record.faction = None;
            self.store.save(&record).await?;
            info!(account = %id, %faction, "Faction left");
        }

        Ok(FactionChange {
            roles: self.role_plan(&record),
            record,
            changed,
        })
    }

    pub async fn set_language(
        &self,
        id: &AccountId,
        language: Language,
    ) -> Result<AccountRecord, ServiceError> {
        let _guard = self.locks.lock(id).await;
        let mut record = self.store.load(id).await?;

        record.language = language;
        self.store.save(&record).await?;
        Ok(record)
    }

    /// Language preference, falling back to the default if the store is down.
    pub async fn language_of(&self, id: &AccountId) -> Language {
        self.store
            .load(id)
            .await
            .map(|r| r.language)
            .unwrap_or_default()
    }

    pub async fn leaderboard(
        &self,
        faction: Faction,
        limit: u32,
    ) -> Result<Vec<AccountRecord>, ServiceError> {
        Ok(self.store.leaderboard(faction, limit).await?)
    }
}
