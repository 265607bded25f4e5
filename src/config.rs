use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;
use tracing::warn;

use crate::auth::password::BCRYPT_COST_RANGE;

const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";

/// One hour up to one year
const JWT_EXPIRATION_RANGE: RangeInclusive<i64> = 1..=8760;

/// Process configuration read from the environment (and `.env` when present)
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; unparseable numbers fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set, using the development default");
            DEFAULT_JWT_SECRET.to_string()
        });

        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 5000),
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            jwt_secret,
            jwt_expiration_hours: parse_in_range(
                &lookup,
                "JWT_EXPIRATION_HOURS",
                2,
                JWT_EXPIRATION_RANGE,
            ),
            bcrypt_cost: parse_in_range(
                &lookup,
                "BCRYPT_COST",
                bcrypt::DEFAULT_COST,
                BCRYPT_COST_RANGE,
            ),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key = key, value = %raw, "Ignoring unparseable config value");
            default
        }),
        None => default,
    }
}

fn parse_in_range<F, T>(lookup: &F, key: &str, default: T, range: RangeInclusive<T>) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Display + Copy,
{
    let value = parse_or(lookup, key, default);
    if range.contains(&value) {
        return value;
    }

    warn!(
        key = key,
        value = %value,
        min = %range.start(),
        max = %range.end(),
        "Ignoring out-of-range config value"
    );
    default
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);

        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert!(config.database_url.is_none());
        assert_eq!(config.jwt_secret, DEFAULT_JWT_SECRET);
        assert_eq!(config.jwt_expiration_hours, 2);
        assert_eq!(config.bcrypt_cost, 12);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/wellness"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_EXPIRATION_HOURS", "24"),
            ("BCRYPT_COST", "4"),
        ]);

        assert_eq!(config.port, 8080);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/wellness")
        );
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.jwt_expiration_hours, 24);
        assert_eq!(config.bcrypt_cost, 4);
    }

    #[test]
    fn test_bad_numbers_fall_back() {
        let config = config_from(&[("PORT", "eighty"), ("DATABASE_URL", "  ")]);

        assert_eq!(config.port, 5000);
        assert!(config.database_url.is_none());
    }

    #[rstest]
    #[case::zero("0")]
    #[case::negative("-600000")]
    #[case::beyond_a_year("8761")]
    #[case::overflowing("9223372036854775807")]
    fn test_out_of_range_expiration_falls_back(#[case] raw: &str) {
        let config = config_from(&[("JWT_EXPIRATION_HOURS", raw)]);
        assert_eq!(config.jwt_expiration_hours, 2);
    }

    #[rstest]
    #[case::too_cheap("3")]
    #[case::too_expensive("40")]
    #[case::negative("-1")]
    fn test_out_of_range_bcrypt_cost_falls_back(#[case] raw: &str) {
        let config = config_from(&[("BCRYPT_COST", raw)]);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
    }

    #[rstest]
    #[case("JWT_EXPIRATION_HOURS", "8760")]
    #[case("JWT_EXPIRATION_HOURS", "1")]
    #[case("BCRYPT_COST", "31")]
    fn test_range_bounds_are_accepted(#[case] key: &str, #[case] raw: &str) {
        let config = config_from(&[(key, raw)]);
        let expected: i64 = raw.parse().unwrap();

        let actual = match key {
            "BCRYPT_COST" => i64::from(config.bcrypt_cost),
            _ => config.jwt_expiration_hours,
        };
        assert_eq!(actual, expected);
    }
}
