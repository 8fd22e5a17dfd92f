use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::domain::AccountId;
use crate::engine::{offset_from_hours, EconomyRules, ProgressionRules, RankTable, Rules};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    /// Only this account may use the admin commands.
    pub owner_id: AccountId,
    pub purchase: PurchaseConfig,
    pub rules: Rules,
    /// Platform role id per group/tier key, e.g. `HERO_C`.
    pub role_ids: HashMap<String, u64>,
    /// Fixed seed for the economy random source; entropy when unset.
    pub rng_seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct PurchaseConfig {
    pub api_url: String,
    pub api_key: String,
    pub secret_key: String,
    pub product_code: String,
    pub price_per_pack: i64,
    /// Pause after each accepted package before placing the next one.
    pub interval: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue(key.to_string(), reason.into())
}

fn required(env_map: &HashMap<String, String>, key: &str) -> Result<String, ConfigError> {
    env_map
        .get(key)
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnv(key.to_string()))
}

fn parse_or<T: FromStr>(
    env_map: &HashMap<String, String>,
    key: &str,
    default: T,
    expected: &str,
) -> Result<T, ConfigError> {
    match env_map.get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| invalid(key, format!("must be {}", expected))),
        None => Ok(default),
    }
}

fn parse_range<T>(
    env_map: &HashMap<String, String>,
    min_key: &str,
    max_key: &str,
    default: RangeInclusive<T>,
) -> Result<RangeInclusive<T>, ConfigError>
where
    T: FromStr + PartialOrd + Copy,
{
    let min = parse_or(env_map, min_key, *default.start(), "a non-negative integer")?;
    let max = parse_or(env_map, max_key, *default.end(), "a non-negative integer")?;
    if min > max {
        return Err(invalid(max_key, format!("must be >= {}", min_key)));
    }
    Ok(min..=max)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = parse_or(&env_map, "PORT", 8080u16, "a valid u16")?;
        let database_path = required(&env_map, "DATABASE_PATH")?;
        let owner_id = AccountId::new(required(&env_map, "OWNER_ID")?);

        let purchase = PurchaseConfig {
            api_url: required(&env_map, "PURCHASE_API_URL")?,
            api_key: env_map.get("PURCHASE_API_KEY").cloned().unwrap_or_default(),
            secret_key: env_map
                .get("PURCHASE_SECRET_KEY")
                .cloned()
                .unwrap_or_default(),
            product_code: env_map
                .get("ORDER_PRODUCT_CODE")
                .cloned()
                .unwrap_or_else(|| "OPM_6".to_string()),
            price_per_pack: parse_or(&env_map, "ORDER_PRICE_PER_PACK", 14_000i64, "a valid i64")?,
            interval: Duration::from_secs(parse_or(
                &env_map,
                "ORDER_INTERVAL_SECONDS",
                15u64,
                "a whole number of seconds",
            )?),
        };
        if purchase.price_per_pack <= 0 {
            return Err(invalid("ORDER_PRICE_PER_PACK", "must be positive"));
        }

        let rules = parse_rules(&env_map)?;
        let role_ids = parse_role_ids(&env_map)?;
        let rng_seed = match env_map.get("RNG_SEED") {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| invalid("RNG_SEED", "must be a valid u64"))?,
            ),
            None => None,
        };

        Ok(Config {
            port,
            database_path,
            owner_id,
            purchase,
            rules,
            role_ids,
            rng_seed,
        })
    }
}

fn parse_rules(env_map: &HashMap<String, String>) -> Result<Rules, ConfigError> {
    let defaults = ProgressionRules::default();

    let base_xp = parse_or(env_map, "BASE_XP_TO_LEVEL", defaults.base_xp, "a valid u64")?;
    if base_xp == 0 {
        return Err(invalid("BASE_XP_TO_LEVEL", "must be positive"));
    }
    let scaling = parse_or(env_map, "XP_SCALING", defaults.scaling, "a number")?;
    if !scaling.is_finite() || scaling < 0.0 {
        return Err(invalid("XP_SCALING", "must be a finite number >= 0"));
    }
    let cooldown_secs = parse_or(env_map, "XP_COOLDOWN_SECONDS", 5i64, "a whole number of seconds")?;
    if cooldown_secs < 0 {
        return Err(invalid("XP_COOLDOWN_SECONDS", "must be >= 0"));
    }

    let progression = ProgressionRules {
        base_xp,
        scaling,
        cooldown: chrono::Duration::seconds(cooldown_secs),
        message_xp: parse_range(env_map, "MESSAGE_XP_MIN", "MESSAGE_XP_MAX", defaults.message_xp)?,
        level_reward: parse_range(
            env_map,
            "LEVEL_REWARD_MIN",
            "LEVEL_REWARD_MAX",
            defaults.level_reward,
        )?,
    };
    if *progression.level_reward.start() < 0 {
        return Err(invalid("LEVEL_REWARD_MIN", "must be >= 0"));
    }

    let economy_defaults = EconomyRules::default();
    let stake_percent = parse_or(
        env_map,
        "WAGER_STAKE_PERCENT",
        economy_defaults.stake_percent,
        "an integer percentage",
    )?;
    if !(1..=100).contains(&stake_percent) {
        return Err(invalid("WAGER_STAKE_PERCENT", "must be between 1 and 100"));
    }
    let day_offset_hours = parse_or(env_map, "DAY_OFFSET_HOURS", 7i32, "an integer")?;
    if !(-23..=23).contains(&day_offset_hours) {
        return Err(invalid("DAY_OFFSET_HOURS", "must be between -23 and 23"));
    }

    let economy = EconomyRules {
        daily_fund: parse_range(env_map, "DAILY_FUND_MIN", "DAILY_FUND_MAX", economy_defaults.daily_fund)?,
        daily_coupon: parse_range(
            env_map,
            "DAILY_COUPON_MIN",
            "DAILY_COUPON_MAX",
            economy_defaults.daily_coupon,
        )?,
        stake_percent,
        day_offset: offset_from_hours(day_offset_hours),
    };
    if *economy.daily_fund.start() <= 0 || *economy.daily_coupon.start() <= 0 {
        return Err(invalid("DAILY_FUND_MIN", "daily rewards must be positive"));
    }

    Ok(Rules {
        progression,
        economy,
        ranks: RankTable::default(),
    })
}

/// Parse `ROLE_IDS` as `KEY=id,KEY=id`.
fn parse_role_ids(env_map: &HashMap<String, String>) -> Result<HashMap<String, u64>, ConfigError> {
    let Some(raw) = env_map.get("ROLE_IDS") else {
        return Ok(HashMap::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|pair| {
            let (key, id) = pair
                .split_once('=')
                .ok_or_else(|| invalid("ROLE_IDS", format!("expected KEY=id, got {}", pair)))?;
            let id = id
                .trim()
                .parse::<u64>()
                .map_err(|_| invalid("ROLE_IDS", format!("invalid role id for {}", key.trim())))?;
            Ok((key.trim().to_string(), id))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("DATABASE_PATH".to_string(), "/tmp/test.db".to_string());
        map.insert("OWNER_ID".to_string(), "164479846884442112".to_string());
        map.insert(
            "PURCHASE_API_URL".to_string(),
            "https://shop.example/api/create".to_string(),
        );
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.owner_id.as_str(), "164479846884442112");
        assert_eq!(config.purchase.product_code, "OPM_6");
        assert_eq!(config.purchase.price_per_pack, 14_000);
        assert_eq!(config.purchase.interval, Duration::from_secs(15));
        assert_eq!(config.rules.progression.base_xp, 100);
        assert_eq!(config.rules.progression.cooldown, chrono::Duration::seconds(5));
        assert_eq!(config.rules.economy.stake_percent, 80);
        assert_eq!(config.rules.economy.daily_fund, 5000..=10000);
        assert!(config.role_ids.is_empty());
        assert!(config.rng_seed.is_none());
    }

    #[test]
    fn test_missing_database_path() {
        let mut env_map = setup_required_env();
        env_map.remove("DATABASE_PATH");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "DATABASE_PATH"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_missing_owner_id() {
        let mut env_map = setup_required_env();
        env_map.remove("OWNER_ID");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "OWNER_ID"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_invalid_port() {
        let mut env_map = setup_required_env();
        env_map.insert("PORT".to_string(), "not_a_number".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PORT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_stake_percent_bounds() {
        let mut env_map = setup_required_env();
        env_map.insert("WAGER_STAKE_PERCENT".to_string(), "100".to_string());
        let config = Config::from_env_map(env_map.clone()).unwrap();
        assert_eq!(config.rules.economy.stake_percent, 100);

        env_map.insert("WAGER_STAKE_PERCENT".to_string(), "0".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "WAGER_STAKE_PERCENT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut env_map = setup_required_env();
        env_map.insert("DAILY_COUPON_MIN".to_string(), "900".to_string());
        env_map.insert("DAILY_COUPON_MAX".to_string(), "100".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "DAILY_COUPON_MAX"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_role_ids_parsed() {
        let mut env_map = setup_required_env();
        env_map.insert(
            "ROLE_IDS".to_string(),
            "HERO_GROUP=1428605131372494888, HERO_C = 1428609299550175293".to_string(),
        );
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.role_ids.get("HERO_GROUP"), Some(&1428605131372494888));
        assert_eq!(config.role_ids.get("HERO_C"), Some(&1428609299550175293));
    }

    #[test]
    fn test_malformed_role_ids() {
        let mut env_map = setup_required_env();
        env_map.insert("ROLE_IDS".to_string(), "HERO_GROUP".to_string());
        assert!(matches!(
            Config::from_env_map(env_map),
            Err(ConfigError::InvalidValue(_, _))
        ));
    }

    #[test]
    fn test_rng_seed() {
        let mut env_map = setup_required_env();
        env_map.insert("RNG_SEED".to_string(), "42".to_string());
        assert_eq!(Config::from_env_map(env_map).unwrap().rng_seed, Some(42));
    }
}
