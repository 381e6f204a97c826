use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Duration;
use thiserror::Error;
use tracing::info;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BOARD_JWT_SECRET is unset or still a placeholder")]
    MissingSecret,

    #[error("invalid {key} value {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub token_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = var("BOARD_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            return Err(ConfigError::MissingSecret);
        }

        let or_default = |key: &str, default: &str| {
            var(key).unwrap_or_else(|| {
                info!("{key} not set, using default: {default}");
                default.to_string()
            })
        };

        let db_path = PathBuf::from(or_default("BOARD_DB_PATH", "board.db"));
        let host = or_default("BOARD_HOST", "0.0.0.0");
        let port = or_default("BOARD_PORT", "8080");
        let ttl_hours = or_default("BOARD_TOKEN_TTL_HOURS", "72");

        let addr = format!("{host}:{port}");
        let addr: SocketAddr = addr.parse().map_err(|_| ConfigError::Invalid {
            key: "BOARD_HOST/BOARD_PORT",
            value: addr.clone(),
        })?;

        let token_ttl = match ttl_hours.parse::<i64>() {
            Ok(hours) if hours > 0 => Duration::hours(hours),
            _ => {
                return Err(ConfigError::Invalid {
                    key: "BOARD_TOKEN_TTL_HOURS",
                    value: ttl_hours,
                });
            }
        };

        Ok(Self {
            jwt_secret,
            db_path,
            addr,
            token_ttl,
        })
    }
}
