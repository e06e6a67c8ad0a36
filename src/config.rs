use crate::domain::Symbol;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub rate_api_url: String,
    pub rate_cache_ttl: Duration,
    pub default_currency: Symbol,
    pub ledger_mode: LedgerMode,
}

/// How the ledger walks a normalized trade list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedgerMode {
    /// One pass over all assets.
    #[default]
    Sequential,
    /// One blocking task per asset.
    Sharded,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let rate_api_url = env_map
            .get("RATE_API_URL")
            .cloned()
            .unwrap_or_else(|| "https://min-api.cryptocompare.com".to_string());

        let rate_cache_ttl = env_map
            .get("RATE_CACHE_TTL_SECS")
            .map(|s| s.as_str())
            .unwrap_or("3600")
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "RATE_CACHE_TTL_SECS".to_string(),
                    "must be a non-negative number of seconds".to_string(),
                )
            })?;

        let default_currency =
            Symbol::new(env_map.get("DEFAULT_CURRENCY").map(|s| s.as_str()).unwrap_or("CAD"));
        if default_currency.is_empty() {
            return Err(ConfigError::InvalidValue(
                "DEFAULT_CURRENCY".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let ledger_mode = match env_map
            .get("LEDGER_MODE")
            .map(|s| s.as_str())
            .unwrap_or("sequential")
        {
            "sequential" => LedgerMode::Sequential,
            "sharded" => LedgerMode::Sharded,
            other => {
                return Err(ConfigError::InvalidValue(
                    "LEDGER_MODE".to_string(),
                    format!("must be sequential or sharded, got {}", other),
                ))
            }
        };

        Ok(Config {
            port,
            database_path,
            rate_api_url,
            rate_cache_ttl,
            default_currency,
            ledger_mode,
        })
    }
}
