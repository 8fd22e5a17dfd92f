//! Role synchronization plans for the platform adapter.
//!
//! The engine only derives tiers. This module turns a (faction, level) pair
//! into the set of platform roles the member should hold and the set they
//! should not, so the adapter can reconcile idempotently.

use serde::Serialize;
use std::collections::HashMap;

use crate::domain::Faction;
use crate::engine::RankTable;

/// A role by configuration key, with its platform id when configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRef {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RoleSync {
    pub grant: Vec<RoleRef>,
    pub revoke: Vec<RoleRef>,
}

impl RoleSync {
    pub fn grants(&self, key: &str) -> bool {
        self.grant.iter().any(|r| r.key == key)
    }

    pub fn revokes(&self, key: &str) -> bool {
        self.revoke.iter().any(|r| r.key == key)
    }
}

/// Compute the role plan for an account.
pub fn plan_role_sync(
    ranks: &RankTable,
    role_ids: &HashMap<String, u64>,
    faction: Option<Faction>,
    level: u32,
) -> RoleSync {
    let resolve = |key: &str| RoleRef {
        key: key.to_string(),
        role_id: role_ids.get(key).copied(),
    };

    let mut keep: Vec<&str> = Vec::new();
    if let Some(f) = faction {
        keep.push(f.group_key());
        if let Some(tier) = ranks.derive_tier(Some(f), level) {
            keep.push(tier.as_str());
        }
    }

    let revoke = Faction::ALL
        .iter()
        .map(|f| f.group_key())
        .chain(ranks.all_labels().map(|l| l.as_str()))
        .filter(|key| !keep.contains(key))
        .map(resolve)
        .collect();

    RoleSync {
        grant: keep.into_iter().map(resolve).collect(),
        revoke,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hero_plan_grants_group_and_tier() {
        let ranks = RankTable::default();
        let mut ids = HashMap::new();
        ids.insert("HERO_B".to_string(), 555);

        let plan = plan_role_sync(&ranks, &ids, Some(Faction::Hero), 7);

        assert_eq!(plan.grant.len(), 2);
        assert!(plan.grants("HERO_GROUP"));
        assert!(plan.grants("HERO_B"));
        assert_eq!(plan.grant[1].role_id, Some(555));
        assert!(plan.revokes("MONSTER_GROUP"));
        assert!(plan.revokes("HERO_C"));
        assert!(plan.revokes("M_TIGER_LOW"));
        assert!(!plan.revokes("HERO_B"));
        assert_eq!(plan.grant.len() + plan.revoke.len(), 16);
    }

    #[test]
    fn test_no_faction_revokes_everything() {
        let ranks = RankTable::default();
        let plan = plan_role_sync(&ranks, &HashMap::new(), None, 30);
        assert!(plan.grant.is_empty());
        assert_eq!(plan.revoke.len(), 16);
        assert!(plan.revoke.iter().all(|r| r.role_id.is_none()));
    }
}
