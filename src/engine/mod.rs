//! Pure computation engine for progression and economy rules.
//!
//! Nothing in here performs I/O. Every operation takes the record(s) it acts
//! on plus an injected random source, validates, and only then mutates.

use chrono::{FixedOffset, Offset, Utc};
use std::ops::RangeInclusive;
use thiserror::Error;

use crate::domain::CurrencyKind;

pub mod economy;
pub mod progression;
pub mod ranks;
pub mod voucher;
pub mod wager;

pub use economy::{claim_daily, credit, debit, exchange, transfer, DailyReward};
pub use progression::{grant_xp, required_xp, XpGrant};
pub use ranks::{RankTable, TierLabel, TierTable};
pub use voucher::{project_tickets, ProjectionError, TicketKind, TicketProjection};
pub use wager::{resolve_wager, wager, PayoutTier, ReelSymbol, WagerOutcome};

/// Rule rejections. Raised before any field of a record is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EconomyError {
    #[error("amount must be positive, got {0}")]
    InvalidAmount(i64),
    #[error("insufficient {kind}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        kind: CurrencyKind,
        balance: i64,
        requested: i64,
    },
    #[error("cannot transfer to the same account")]
    SelfTransfer,
    #[error("daily reward already claimed today")]
    AlreadyClaimed,
    #[error("{0} balance is empty")]
    EmptyBalance(CurrencyKind),
    #[error("{0} balance too small to stake")]
    StakeTooSmall(CurrencyKind),
    #[error("{0} balance would overflow")]
    BalanceOverflow(CurrencyKind),
}

impl EconomyError {
    /// Stable machine-readable kind, used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            EconomyError::InvalidAmount(_) => "invalid_amount",
            EconomyError::InsufficientFunds { .. } => "insufficient_funds",
            EconomyError::SelfTransfer => "self_transfer",
            EconomyError::AlreadyClaimed => "already_claimed",
            EconomyError::EmptyBalance(_) => "empty_balance",
            EconomyError::StakeTooSmall(_) => "stake_too_small",
            EconomyError::BalanceOverflow(_) => "balance_overflow",
        }
    }
}

/// XP curve and passive accrual parameters.
#[derive(Debug, Clone)]
pub struct ProgressionRules {
    /// `B` in `floor(B * (level + 1)^S)`.
    pub base_xp: u64,
    /// `S` in `floor(B * (level + 1)^S)`.
    pub scaling: f64,
    pub cooldown: chrono::Duration,
    /// XP drawn per chat message.
    pub message_xp: RangeInclusive<u64>,
    /// Fund credited per level gained.
    pub level_reward: RangeInclusive<i64>,
}

impl Default for ProgressionRules {
    fn default() -> Self {
        Self {
            base_xp: 100,
            scaling: 1.5,
            cooldown: chrono::Duration::seconds(5),
            message_xp: 15..=25,
            level_reward: 5000..=10000,
        }
    }
}

/// Daily reward and wager parameters.
#[derive(Debug, Clone)]
pub struct EconomyRules {
    pub daily_fund: RangeInclusive<i64>,
    pub daily_coupon: RangeInclusive<i64>,
    /// Share of the balance put at risk by a wager, in percent (1..=100).
    pub stake_percent: u8,
    /// Offset in which "same calendar day" is evaluated for the daily claim.
    pub day_offset: FixedOffset,
}

impl Default for EconomyRules {
    fn default() -> Self {
        Self {
            daily_fund: 5000..=10000,
            daily_coupon: 5000..=10000,
            stake_percent: 80,
            day_offset: offset_from_hours(7),
        }
    }
}

/// Fixed offset `hours` east of UTC; out-of-range values fall back to UTC.
pub fn offset_from_hours(hours: i32) -> FixedOffset {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

/// Immutable rule set injected into the service at construction.
#[derive(Debug, Clone, Default)]
pub struct Rules {
    pub progression: ProgressionRules,
    pub economy: EconomyRules,
    pub ranks: RankTable,
}
