//! Domain primitives: AccountId, CurrencyKind, Faction, Language.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a stored or requested enum value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Stable chat-platform user key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    /// Create an AccountId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        AccountId(id.into())
    }

    /// Get the id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two soft currencies an account holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyKind {
    Fund,
    Coupon,
}

impl CurrencyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyKind::Fund => "fund",
            CurrencyKind::Coupon => "coupon",
        }
    }
}

impl std::fmt::Display for CurrencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of two mutually exclusive sides a user may join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Faction {
    #[serde(alias = "hero")]
    Hero,
    #[serde(alias = "monster")]
    Monster,
}

impl Faction {
    pub const ALL: [Faction; 2] = [Faction::Hero, Faction::Monster];

    pub fn as_str(&self) -> &'static str {
        match self {
            Faction::Hero => "HERO",
            Faction::Monster => "MONSTER",
        }
    }

    /// Configuration key of the group role that marks membership.
    pub fn group_key(&self) -> &'static str {
        match self {
            Faction::Hero => "HERO_GROUP",
            Faction::Monster => "MONSTER_GROUP",
        }
    }
}

impl FromStr for Faction {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HERO" => Ok(Faction::Hero),
            "MONSTER" => Ok(Faction::Monster),
            _ => Err(ParseEnumError::new("faction", s)),
        }
    }
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation language preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Vi,
    En,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Vi => "vi",
            Language::En => "en",
        }
    }
}

impl FromStr for Language {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vi" => Ok(Language::Vi),
            "en" => Ok(Language::En),
            _ => Err(ParseEnumError::new("language", s)),
        }
    }
}
