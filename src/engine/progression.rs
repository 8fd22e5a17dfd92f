//! XP curve and the level-up cascade.

use chrono::{DateTime, Utc};
use rand::Rng;

use super::{ProgressionRules, Rules, TierLabel};
use crate::domain::AccountRecord;

/// XP needed to advance from `level` to `level + 1`.
///
/// Evaluates `floor(B * (level + 1)^S)` in `f64` and floors the result, so
/// `required_xp(5)` with `B = 100, S = 1.5` is exactly 1469. Never below 1.
pub fn required_xp(rules: &ProgressionRules, level: u32) -> u64 {
    let raw = rules.base_xp as f64 * (f64::from(level) + 1.0).powf(rules.scaling);
    (raw.floor() as u64).max(1)
}

/// Result of a single `grant_xp` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XpGrant {
    /// False when the cooldown suppressed the grant.
    pub applied: bool,
    pub levels_gained: u32,
    /// Fund credited for each level gained, in order.
    pub rewards: Vec<i64>,
    pub tier_before: Option<TierLabel>,
    pub tier_after: Option<TierLabel>,
}

impl XpGrant {
    pub fn leveled_up(&self) -> bool {
        self.levels_gained > 0
    }

    /// The new tier, if the grant moved the account into a different one.
    pub fn new_tier(&self) -> Option<&TierLabel> {
        if self.tier_before != self.tier_after {
            self.tier_after.as_ref()
        } else {
            None
        }
    }

    pub fn total_reward(&self) -> i64 {
        self.rewards.iter().sum()
    }
}

/// Add `amount` XP to `record` and run the level-up cascade to quiescence.
///
/// Within the cooldown window of the previous grant the call is a no-op and
/// the record is left untouched. Each level consumes the threshold of the
/// level it was at and credits a reward drawn from `level_reward`.
pub fn grant_xp<R: Rng + ?Sized>(
    record: &mut AccountRecord,
    amount: u64,
    now: DateTime<Utc>,
    rules: &Rules,
    rng: &mut R,
) -> XpGrant {
    let tier_before = rules
        .ranks
        .derive_tier(record.faction, record.level)
        .cloned();

    if let Some(last) = record.last_xp_grant {
        if now.signed_duration_since(last) < rules.progression.cooldown {
            return XpGrant {
                applied: false,
                levels_gained: 0,
                rewards: Vec::new(),
                tier_after: tier_before.clone(),
                tier_before,
            };
        }
    }

    record.xp = record.xp.saturating_add(amount);
    record.last_xp_grant = Some(now);

    let mut rewards = Vec::new();
    loop {
        let required = required_xp(&rules.progression, record.level);
        if record.xp < required || record.level == u32::MAX {
            break;
        }
        record.xp -= required;
        record.level += 1;

        let reward = rng.gen_range(rules.progression.level_reward.clone());
        record.fund = record.fund.saturating_add(reward);
        rewards.push(reward);
    }

    let tier_after = rules
        .ranks
        .derive_tier(record.faction, record.level)
        .cloned();

    XpGrant {
        applied: true,
        levels_gained: rewards.len() as u32,
        rewards,
        tier_before,
        tier_after,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountId, Faction};
    use chrono::{Duration, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn fresh() -> AccountRecord {
        AccountRecord::new(AccountId::new("100"))
    }

    #[test]
    fn test_required_xp_table() {
        let rules = ProgressionRules::default();
        let cases = [(1, 282), (2, 519), (3, 800), (4, 1118), (5, 1469)];
        for (level, expected) in cases {
            assert_eq!(required_xp(&rules, level), expected, "level {}", level);
        }
    }

    #[test]
    fn test_grant_below_threshold_only_adds_xp() {
        let rules = Rules::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut record = fresh();

        let grant = grant_xp(&mut record, 100, t0(), &rules, &mut rng);

        assert!(grant.applied);
        assert!(!grant.leveled_up());
        assert_eq!(record.xp, 100);
        assert_eq!(record.level, 1);
        assert_eq!(record.fund, 0);
        assert_eq!(record.last_xp_grant, Some(t0()));
    }

    #[test]
    fn test_cascade_consumes_each_threshold() {
        let rules = Rules::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut record = fresh();

        // 282 (lv1) + 519 (lv2) + 800 (lv3) = 1601, plus 10 left over.
        let grant = grant_xp(&mut record, 1611, t0(), &rules, &mut rng);

        assert_eq!(grant.levels_gained, 3);
        assert_eq!(record.level, 4);
        assert_eq!(record.xp, 10);
        assert_eq!(grant.rewards.len(), 3);
        assert!(grant.rewards.iter().all(|r| (5000..=10000).contains(r)));
        assert_eq!(record.fund, grant.total_reward());
    }

    #[test]
    fn test_cooldown_is_a_no_op() {
        let rules = Rules::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut record = fresh();

        grant_xp(&mut record, 20, t0(), &rules, &mut rng);
        let before = record.clone();

        let grant = grant_xp(&mut record, 20, t0() + Duration::seconds(4), &rules, &mut rng);

        assert!(!grant.applied);
        assert_eq!(record, before);
    }

    #[test]
    fn test_grant_after_cooldown_applies() {
        let rules = Rules::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut record = fresh();

        grant_xp(&mut record, 20, t0(), &rules, &mut rng);
        let grant = grant_xp(&mut record, 20, t0() + Duration::seconds(5), &rules, &mut rng);

        assert!(grant.applied);
        assert_eq!(record.xp, 40);
    }

    #[test]
    fn test_tier_change_is_reported() {
        let rules = Rules::default();
        let mut rng = StdRng::seed_from_u64(9);
        let mut record = fresh();
        record.faction = Some(Faction::Monster);
        record.level = 2;

        // Level 2 needs 519 to reach level 3 (M_TIGER_MID).
        let grant = grant_xp(&mut record, 519, t0(), &rules, &mut rng);

        assert_eq!(record.level, 3);
        assert_eq!(grant.tier_before.as_ref().map(|t| t.as_str()), Some("M_TIGER_LOW"));
        assert_eq!(grant.new_tier().map(|t| t.as_str()), Some("M_TIGER_MID"));
    }

    #[test]
    fn test_level_up_without_tier_change() {
        let rules = Rules::default();
        let mut rng = StdRng::seed_from_u64(9);
        let mut record = fresh();
        record.faction = Some(Faction::Hero);

        let grant = grant_xp(&mut record, 282, t0(), &rules, &mut rng);

        assert!(grant.leveled_up());
        assert_eq!(grant.new_tier(), None);
    }
}
