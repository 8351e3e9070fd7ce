use std::env;

use thiserror::Error;

use crate::domain::order::TransitionPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Where carts, orders and the catalog live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    Postgres { database_url: String, pool_size: u32 },
    Memory,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub storage: Storage,
    pub status_policy: TransitionPolicy,
}

impl Settings {
    /// Read settings from the process environment. Call `dotenvy::dotenv()`
    /// first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or("PORT", lookup("PORT"), 8080)?;

        let storage = match lookup("STORAGE").as_deref().unwrap_or("postgres") {
            "memory" => Storage::Memory,
            "postgres" => Storage::Postgres {
                database_url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
                pool_size: parse_or("DB_POOL_SIZE", lookup("DB_POOL_SIZE"), 10)?,
            },
            other => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE",
                    reason: format!("expected 'postgres' or 'memory', got '{other}'"),
                })
            }
        };

        let status_policy = match lookup("ORDER_STATUS_POLICY") {
            Some(raw) => raw.parse::<TransitionPolicy>().map_err(|reason| ConfigError::Invalid {
                name: "ORDER_STATUS_POLICY",
                reason,
            })?,
            None => TransitionPolicy::default(),
        };

        Ok(Self {
            host,
            port,
            storage,
            status_policy,
        })
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
