use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountId, CurrencyKind, Faction, Language};

/// Persisted per-user economy and progression state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    pub id: AccountId,
    pub fund: i64,
    pub coupon: i64,
    /// Progress toward the next level.
    pub xp: u64,
    /// Current level, never below 1.
    pub level: u32,
    pub faction: Option<Faction>,
    pub language: Language,
    pub last_daily_claim: Option<DateTime<Utc>>,
    pub last_xp_grant: Option<DateTime<Utc>>,
}

impl AccountRecord {
    /// The record an account has before it is first saved.
    pub fn new(id: AccountId) -> Self {
        Self {
            id,
            fund: 0,
            coupon: 0,
            xp: 0,
            level: 1,
            faction: None,
            language: Language::Vi,
            last_daily_claim: None,
            last_xp_grant: None,
        }
    }

    pub fn balance(&self, kind: CurrencyKind) -> i64 {
        match kind {
            CurrencyKind::Fund => self.fund,
            CurrencyKind::Coupon => self.coupon,
        }
    }

    pub(crate) fn balance_mut(&mut self, kind: CurrencyKind) -> &mut i64 {
        match kind {
            CurrencyKind::Fund => &mut self.fund,
            CurrencyKind::Coupon => &mut self.coupon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_defaults() {
        let record = AccountRecord::new(AccountId::new("42"));
        assert_eq!(record.fund, 0);
        assert_eq!(record.coupon, 0);
        assert_eq!(record.xp, 0);
        assert_eq!(record.level, 1);
        assert_eq!(record.faction, None);
        assert_eq!(record.language, Language::Vi);
        assert!(record.last_daily_claim.is_none());
        assert!(record.last_xp_grant.is_none());
    }

    #[test]
    fn test_balance_selects_currency() {
        let mut record = AccountRecord::new(AccountId::new("42"));
        *record.balance_mut(CurrencyKind::Coupon) = 7;
        assert_eq!(record.balance(CurrencyKind::Coupon), 7);
        assert_eq!(record.balance(CurrencyKind::Fund), 0);
    }
}
