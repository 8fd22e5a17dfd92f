//! Staged-payout wager.
//!
//! A share of the balance is staked, a fair coin decides win or loss, and a
//! winning roll in `[1, 100]` picks the payout tier:
//!
//! | roll      | multiplier |
//! |-----------|------------|
//! | 1..=80    | x2         |
//! | 81..=97   | x3         |
//! | 98..=100  | x5         |
//!
//! The unstaked reserve always survives. The outcome is fully decided here,
//! before the presentation layer shows any animation.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use super::{EconomyError, EconomyRules};
use crate::domain::{AccountRecord, CurrencyKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutTier {
    Double,
    Triple,
    Jackpot,
}

impl PayoutTier {
    /// Map a roll in `[1, 100]` to its tier.
    pub fn from_roll(roll: u8) -> Self {
        match roll {
            0..=80 => PayoutTier::Double,
            81..=97 => PayoutTier::Triple,
            _ => PayoutTier::Jackpot,
        }
    }

    pub fn multiplier(&self) -> i64 {
        match self {
            PayoutTier::Double => 2,
            PayoutTier::Triple => 3,
            PayoutTier::Jackpot => 5,
        }
    }
}

/// Symbols shown on the three reels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReelSymbol {
    Fund,
    Coupon,
    Bomb,
    Ghost,
    Cross,
    Anger,
}

const LOSING_POOL: [ReelSymbol; 6] = [
    ReelSymbol::Fund,
    ReelSymbol::Coupon,
    ReelSymbol::Bomb,
    ReelSymbol::Ghost,
    ReelSymbol::Cross,
    ReelSymbol::Anger,
];

impl From<CurrencyKind> for ReelSymbol {
    fn from(kind: CurrencyKind) -> Self {
        match kind {
            CurrencyKind::Fund => ReelSymbol::Fund,
            CurrencyKind::Coupon => ReelSymbol::Coupon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WagerOutcome {
    pub kind: CurrencyKind,
    pub won: bool,
    /// Payout roll; only drawn on a win.
    pub roll: Option<u8>,
    pub tier: Option<PayoutTier>,
    pub stake: i64,
    pub reserve: i64,
    pub old_balance: i64,
    pub new_balance: i64,
    /// `stake * multiplier - stake` on a win, `-stake` on a loss.
    pub net: i64,
    pub reels: [ReelSymbol; 3],
}

impl WagerOutcome {
    pub fn multiplier(&self) -> i64 {
        self.tier.map(|t| t.multiplier()).unwrap_or(0)
    }
}

/// Compute a wager outcome for an already-decided coin flip and roll.
///
/// `stake = floor(balance * stake_percent / 100)`. Fails with `EmptyBalance`
/// for a non-positive balance and `StakeTooSmall` when the stake floors to 0.
pub fn resolve_wager(
    kind: CurrencyKind,
    balance: i64,
    stake_percent: u8,
    won: bool,
    roll: u8,
) -> Result<WagerOutcome, EconomyError> {
    let (stake, reserve) = split_stake(kind, balance, stake_percent)?;

    let (tier, new_balance, net) = if won {
        let tier = PayoutTier::from_roll(roll);
        let payout = stake
            .checked_mul(tier.multiplier())
            .ok_or(EconomyError::BalanceOverflow(kind))?;
        let new_balance = reserve
            .checked_add(payout)
            .ok_or(EconomyError::BalanceOverflow(kind))?;
        (Some(tier), new_balance, payout - stake)
    } else {
        (None, reserve, -stake)
    };

    let symbol = ReelSymbol::from(kind);
    Ok(WagerOutcome {
        kind,
        won,
        roll: won.then_some(roll),
        tier,
        stake,
        reserve,
        old_balance: balance,
        new_balance,
        net,
        reels: if won {
            [symbol; 3]
        } else {
            [ReelSymbol::Bomb, ReelSymbol::Ghost, ReelSymbol::Cross]
        },
    })
}

fn split_stake(kind: CurrencyKind, balance: i64, stake_percent: u8) -> Result<(i64, i64), EconomyError> {
    if balance <= 0 {
        return Err(EconomyError::EmptyBalance(kind));
    }
    let percent = i128::from(stake_percent.min(100));
    // Fits in i64: the product is divided back down below `balance`.
    let stake = (i128::from(balance) * percent / 100) as i64;
    if stake <= 0 {
        return Err(EconomyError::StakeTooSmall(kind));
    }
    Ok((stake, balance - stake))
}

/// Stake part of the `kind` balance and apply the outcome to `record`.
pub fn wager<R: Rng + ?Sized>(
    record: &mut AccountRecord,
    kind: CurrencyKind,
    rules: &EconomyRules,
    rng: &mut R,
) -> Result<WagerOutcome, EconomyError> {
    let balance = record.balance(kind);
    split_stake(kind, balance, rules.stake_percent)?;

    let won = rng.gen_bool(0.5);
    let roll = if won { rng.gen_range(1..=100u8) } else { 0 };
    let mut outcome = resolve_wager(kind, balance, rules.stake_percent, won, roll)?;
    if !won {
        outcome.reels = losing_reels(rng);
    }

    *record.balance_mut(kind) = outcome.new_balance;
    Ok(outcome)
}

fn losing_reels<R: Rng + ?Sized>(rng: &mut R) -> [ReelSymbol; 3] {
    let mut pick = || *LOSING_POOL.choose(&mut *rng).unwrap_or(&ReelSymbol::Bomb);
    let first = pick();
    let second = pick();
    let mut third = pick();
    while first == second && second == third {
        third = pick();
    }
    [first, second, third]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AccountId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_tier_distribution_over_rolls() {
        let mut counts = [0; 3];
        for roll in 1..=100u8 {
            match PayoutTier::from_roll(roll) {
                PayoutTier::Double => counts[0] += 1,
                PayoutTier::Triple => counts[1] += 1,
                PayoutTier::Jackpot => counts[2] += 1,
            }
        }
        assert_eq!(counts, [80, 17, 3]);
        assert_eq!(PayoutTier::from_roll(80), PayoutTier::Double);
        assert_eq!(PayoutTier::from_roll(81), PayoutTier::Triple);
        assert_eq!(PayoutTier::from_roll(97), PayoutTier::Triple);
        assert_eq!(PayoutTier::from_roll(98), PayoutTier::Jackpot);
    }

    #[test]
    fn test_partial_stake_win() {
        let outcome = resolve_wager(CurrencyKind::Fund, 1000, 80, true, 90).unwrap();
        assert_eq!(outcome.stake, 800);
        assert_eq!(outcome.reserve, 200);
        assert_eq!(outcome.multiplier(), 3);
        assert_eq!(outcome.new_balance, 200 + 2400);
        assert_eq!(outcome.net, 1600);
        assert_eq!(outcome.reels, [ReelSymbol::Fund; 3]);
    }

    #[test]
    fn test_partial_stake_loss_keeps_reserve() {
        let outcome = resolve_wager(CurrencyKind::Coupon, 999, 80, false, 0).unwrap();
        // floor(999 * 0.8) = 799
        assert_eq!(outcome.stake, 799);
        assert_eq!(outcome.new_balance, 200);
        assert_eq!(outcome.net, -799);
        assert_eq!(outcome.roll, None);
    }

    #[test]
    fn test_all_in_loss_empties_balance() {
        let outcome = resolve_wager(CurrencyKind::Fund, 500, 100, false, 0).unwrap();
        assert_eq!(outcome.reserve, 0);
        assert_eq!(outcome.new_balance, 0);
    }

    #[test]
    fn test_empty_and_tiny_balances_rejected() {
        assert_eq!(
            resolve_wager(CurrencyKind::Fund, 0, 80, true, 1),
            Err(EconomyError::EmptyBalance(CurrencyKind::Fund))
        );
        // floor(1 * 0.8) = 0
        assert_eq!(
            resolve_wager(CurrencyKind::Fund, 1, 80, true, 1),
            Err(EconomyError::StakeTooSmall(CurrencyKind::Fund))
        );
    }

    #[test]
    fn test_wager_rejection_leaves_record_untouched() {
        let rules = EconomyRules::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut record = AccountRecord::new(AccountId::new("1"));
        record.fund = 1;
        let before = record.clone();
        assert!(wager(&mut record, CurrencyKind::Fund, &rules, &mut rng).is_err());
        assert_eq!(record, before);
    }

    #[test]
    fn test_wager_outcomes_stay_in_payout_set() {
        let rules = EconomyRules::default();
        let mut wins = 0;
        for seed in 0..500u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut record = AccountRecord::new(AccountId::new("1"));
            record.coupon = 12_345;

            let outcome = wager(&mut record, CurrencyKind::Coupon, &rules, &mut rng).unwrap();
            let (stake, reserve) = (outcome.stake, outcome.reserve);
            let allowed = [reserve, reserve + stake * 2, reserve + stake * 3, reserve + stake * 5];

            assert_eq!(stake + reserve, 12_345);
            assert!(allowed.contains(&record.coupon), "seed {}", seed);
            assert_eq!(record.coupon, outcome.new_balance);
            assert_eq!(record.fund, 0);
            if outcome.won {
                wins += 1;
                assert_eq!(outcome.reels, [ReelSymbol::Coupon; 3]);
            } else {
                let [a, b, c] = outcome.reels;
                assert!(!(a == b && b == c));
            }
        }
        assert!(wins > 150 && wins < 350, "wins = {}", wins);
    }
}
