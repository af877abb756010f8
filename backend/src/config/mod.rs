//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the database URL, token signing parameters, CORS origins and server port.

use anyhow::{Context, Result, bail};
use jsonwebtoken::Algorithm;
use std::env;
use std::str::FromStr;

/// Cheapest bcrypt work factor accepted; bcrypt rejects anything lower.
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub app_version: String,
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_algorithm: Algorithm,
    pub access_token_expire_minutes: i64,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
    pub api_prefix: String,
    pub server_port: u16,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let app_name = var_or("APP_NAME", "Auth Backend");
        let app_version = var_or("APP_VERSION", env!("CARGO_PKG_VERSION"));

        let database_url = lookup("DATABASE_URL").context("DATABASE_URL not set")?;

        let max_connections = var_or("DB_MAX_CONNECTIONS", "5")
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid number")?;

        let acquire_timeout_seconds = var_or("DB_ACQUIRE_TIMEOUT_SECONDS", "3")
            .parse::<u64>()
            .context("DB_ACQUIRE_TIMEOUT_SECONDS must be a valid number")?;

        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET not set")?;
        if jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let jwt_algorithm = parse_algorithm(&var_or("JWT_ALGORITHM", "HS256"))?;

        let access_token_expire_minutes = var_or("ACCESS_TOKEN_EXPIRE_MINUTES", "30")
            .parse::<i64>()
            .context("ACCESS_TOKEN_EXPIRE_MINUTES must be a valid number")?;
        if access_token_expire_minutes <= 0 {
            bail!("ACCESS_TOKEN_EXPIRE_MINUTES must be greater than zero");
        }

        let bcrypt_cost = var_or("BCRYPT_COST", &bcrypt::DEFAULT_COST.to_string())
            .parse::<u32>()
            .context("BCRYPT_COST must be a valid number")?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            bail!(
                "BCRYPT_COST must be between {} and {}",
                MIN_BCRYPT_COST,
                MAX_BCRYPT_COST
            );
        }

        let cors_origins = parse_origins(&var_or("CORS_ORIGINS", "http://localhost:3000"));

        let api_prefix = normalize_prefix(&var_or("API_V1_PREFIX", "/api/v1"));

        let server_port = var_or("SERVER_PORT", "8001")
            .parse::<u16>()
            .context("SERVER_PORT must be a valid number")?;

        Ok(Config {
            app_name,
            app_version,
            database_url,
            max_connections,
            acquire_timeout_seconds,
            jwt_secret,
            jwt_algorithm,
            access_token_expire_minutes,
            bcrypt_cost,
            cors_origins,
            api_prefix,
            server_port,
        })
    }
}

/// Only HMAC algorithms make sense with a shared secret.
fn parse_algorithm(value: &str) -> Result<Algorithm> {
    let algorithm = Algorithm::from_str(value.trim())
        .with_context(|| format!("JWT_ALGORITHM '{}' is not a known algorithm", value))?;

    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => bail!("JWT_ALGORITHM {:?} is not supported, use HS256, HS384 or HS512", other),
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_prefix(value: &str) -> String {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.max_connections, 5);
        assert_eq!(config.jwt_algorithm, Algorithm::HS256);
        assert_eq!(config.access_token_expire_minutes, 30);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(config.cors_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.api_prefix, "/api/v1");
        assert_eq!(config.server_port, 8001);
    }

    #[test]
    fn test_required_variables() {
        let missing_secret = Config::from_lookup(lookup_from(&[("DATABASE_URL", "sqlite::memory:")]));
        assert!(missing_secret.is_err());

        let missing_db = Config::from_lookup(lookup_from(&[("JWT_SECRET", "secret")]));
        assert!(missing_db.is_err());

        let blank_secret = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "   "),
        ]));
        assert!(blank_secret.is_err());
    }

    #[test]
    fn test_algorithm_restricted_to_hmac() {
        let base = [("DATABASE_URL", "sqlite::memory:"), ("JWT_SECRET", "secret")];

        let hs512 = Config::from_lookup(lookup_from(&[base[0], base[1], ("JWT_ALGORITHM", "HS512")]))
            .unwrap();
        assert_eq!(hs512.jwt_algorithm, Algorithm::HS512);

        assert!(
            Config::from_lookup(lookup_from(&[base[0], base[1], ("JWT_ALGORITHM", "RS256")])).is_err()
        );
        assert!(
            Config::from_lookup(lookup_from(&[base[0], base[1], ("JWT_ALGORITHM", "nope")])).is_err()
        );
    }

    #[test]
    fn test_expiry_must_be_positive() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "secret"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "0"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_bcrypt_cost_bounds() {
        let with_cost = |cost: &str| {
            Config::from_lookup(lookup_from(&[
                ("DATABASE_URL", "sqlite::memory:"),
                ("JWT_SECRET", "secret"),
                ("BCRYPT_COST", cost),
            ]))
        };

        assert_eq!(with_cost("4").unwrap().bcrypt_cost, MIN_BCRYPT_COST);
        assert_eq!(with_cost("31").unwrap().bcrypt_cost, MAX_BCRYPT_COST);
        assert!(with_cost("3").is_err());
        assert!(with_cost("32").is_err());
        assert!(bcrypt::hash("secret1", MIN_BCRYPT_COST).is_ok());
    }

    #[test]
    fn test_origins_and_prefix_parsing() {
        assert_eq!(
            parse_origins("http://a.test/, https://b.test ,,"),
            vec!["http://a.test", "https://b.test"]
        );
        assert_eq!(normalize_prefix("api/v2/"), "/api/v2");
        assert_eq!(normalize_prefix("/"), "");
    }
}
