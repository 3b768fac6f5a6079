//! Process configuration, read from the environment once at start-up.

use secrecy::Secret;
use std::env;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { var: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(var) => write!(f, "{var} must be set"),
            ConfigError::Invalid { var, value } => write!(f, "{var} has invalid value '{value}'"),
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct AppConfig {
    pub store: StoreKind,
    /// Present whenever `store` is `Postgres`.
    pub database_url: Option<Secret<String>>,
    pub http_addr: String,
    pub operation_timeout: Duration,
    pub auth_username: String,
    pub auth_password: Secret<String>,
    pub cors_allowed_origins: Vec<String>,
    pub db_max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store = match var("LEDGER_STORE").as_deref().map(str::trim) {
            None | Some("postgres") => StoreKind::Postgres,
            Some("memory") => StoreKind::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "LEDGER_STORE",
                    value: other.to_string(),
                })
            }
        };

        let database_url = match (store, var("DATABASE_URL")) {
            (StoreKind::Postgres, None) => return Err(ConfigError::Missing("DATABASE_URL")),
            (_, url) => url.map(Secret::new),
        };

        let operation_timeout = match var("OPERATION_TIMEOUT_SECS") {
            None => Duration::from_secs(10),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "OPERATION_TIMEOUT_SECS",
                        value: raw,
                    })
                }
            },
        };

        let db_max_connections = match var("DB_MAX_CONNECTIONS") {
            None => 20,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "DB_MAX_CONNECTIONS",
                        value: raw,
                    })
                }
            },
        };

        let auth_username =
            var("BASIC_AUTH_USERNAME").ok_or(ConfigError::Missing("BASIC_AUTH_USERNAME"))?;
        let auth_password = var("BASIC_AUTH_PASSWORD")
            .map(Secret::new)
            .ok_or(ConfigError::Missing("BASIC_AUTH_PASSWORD"))?;

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Self {
            store,
            database_url,
            http_addr: var("HTTP_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            operation_timeout,
            auth_username,
            auth_password,
            cors_allowed_origins,
            db_max_connections,
        })
    }
}
