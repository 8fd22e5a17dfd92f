//! Balance-mutating operations: credit, debit, transfer, exchange, daily claim.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

use super::{EconomyError, EconomyRules};
use crate::domain::{AccountRecord, CurrencyKind};

fn ensure_positive(amount: i64) -> Result<(), EconomyError> {
    if amount <= 0 {
        return Err(EconomyError::InvalidAmount(amount));
    }
    Ok(())
}

fn checked_credit(balance: i64, kind: CurrencyKind, amount: i64) -> Result<i64, EconomyError> {
    balance
        .checked_add(amount)
        .ok_or(EconomyError::BalanceOverflow(kind))
}

fn checked_debit(balance: i64, kind: CurrencyKind, amount: i64) -> Result<i64, EconomyError> {
    if amount > balance {
        return Err(EconomyError::InsufficientFunds {
            kind,
            balance,
            requested: amount,
        });
    }
    Ok(balance - amount)
}

/// Add a positive `amount` to the `kind` balance.
pub fn credit(record: &mut AccountRecord, kind: CurrencyKind, amount: i64) -> Result<(), EconomyError> {
    ensure_positive(amount)?;
    let next = checked_credit(record.balance(kind), kind, amount)?;
    *record.balance_mut(kind) = next;
    Ok(())
}

/// Remove a positive `amount` from the `kind` balance.
pub fn debit(record: &mut AccountRecord, kind: CurrencyKind, amount: i64) -> Result<(), EconomyError> {
    ensure_positive(amount)?;
    let next = checked_debit(record.balance(kind), kind, amount)?;
    *record.balance_mut(kind) = next;
    Ok(())
}

/// Move `amount` of `kind` from `sender` to `receiver`.
///
/// The sum of both balances is unchanged on success.
pub fn transfer(
    sender: &mut AccountRecord,
    receiver: &mut AccountRecord,
    kind: CurrencyKind,
    amount: i64,
) -> Result<(), EconomyError> {
    ensure_positive(amount)?;
    if sender.id == receiver.id {
        return Err(EconomyError::SelfTransfer);
    }
    let sender_next = checked_debit(sender.balance(kind), kind, amount)?;
    let receiver_next = checked_credit(receiver.balance(kind), kind, amount)?;

    *sender.balance_mut(kind) = sender_next;
    *receiver.balance_mut(kind) = receiver_next;
    Ok(())
}

/// Convert `amount` coupon into fund at 1:1.
pub fn exchange(record: &mut AccountRecord, amount: i64) -> Result<(), EconomyError> {
    ensure_positive(amount)?;
    let coupon = checked_debit(record.coupon, CurrencyKind::Coupon, amount)?;
    let fund = checked_credit(record.fund, CurrencyKind::Fund, amount)?;

    record.coupon = coupon;
    record.fund = fund;
    Ok(())
}

/// Amounts credited by a daily claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReward {
    pub fund: i64,
    pub coupon: i64,
}

/// Credit the daily fund and coupon rewards once per calendar day.
///
/// The calendar day is taken in `rules.day_offset`. Both rewards are drawn
/// uniformly from their inclusive ranges.
pub fn claim_daily<R: Rng + ?Sized>(
    record: &mut AccountRecord,
    now: DateTime<Utc>,
    rules: &EconomyRules,
    rng: &mut R,
) -> Result<DailyReward, EconomyError> {
    if let Some(last) = record.last_daily_claim {
        let last_day = last.with_timezone(&rules.day_offset).date_naive();
        let today = now.with_timezone(&rules.day_offset).date_naive();
        if last_day == today {
            return Err(EconomyError::AlreadyClaimed);
        }
    }

    let reward = DailyReward {
        fund: rng.gen_range(rules.daily_fund.clone()),
        coupon: rng.gen_range(rules.daily_coupon.clone()),
    };
    let fund = checked_credit(record.fund, CurrencyKind::Fund, reward.fund)?;
    let coupon = checked_credit(record.coupon, CurrencyKind::Coupon, reward.coupon)?;

    record.fund = fund;
    record.coupon = coupon;
    record.last_daily_claim = Some(now);
    Ok(reward)
}
