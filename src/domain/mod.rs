//! Domain types for the guild economy.
//!
//! This module provides:
//! - Identity and enum primitives: AccountId, CurrencyKind, Faction, Language
//! - The persisted AccountRecord and its defaults

pub mod account;
pub mod primitives;

pub use account::AccountRecord;
pub use primitives::{AccountId, CurrencyKind, Faction, Language, ParseEnumError};
