use serde::Deserialize;
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Database URL that selects the in-process store instead of PostgreSQL.
pub const MEMORY_DATABASE_URL: &str = "memory://";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

// Top-level configuration, one section per concern
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub acquire_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url.starts_with(MEMORY_DATABASE_URL)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 5000,
            environment: "development".to_string(),
            rust_log: "booking_directory=debug,tower_http=debug".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            url: MEMORY_DATABASE_URL.to_string(),
            pool_size: 10,
            acquire_timeout_secs: 5,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            app: AppConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

fn parsed_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let app = AppConfig::default();
        let database = DatabaseConfig::default();

        Ok(Config {
            app: AppConfig {
                host: env::var("HOST").unwrap_or(app.host),
                port: parsed_or("PORT", app.port)?,
                environment: env::var("ENVIRONMENT").unwrap_or(app.environment),
                rust_log: env::var("RUST_LOG").unwrap_or(app.rust_log),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
                pool_size: parsed_or("DB_POOL_SIZE", database.pool_size)?,
                acquire_timeout_secs: parsed_or(
                    "DB_ACQUIRE_TIMEOUT_SECS",
                    database.acquire_timeout_secs,
                )?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_flask_port_and_memory_store() {
        let config = Config::default();
        assert_eq!(config.app.port, 5000);
        assert!(config.database.is_memory());
    }

    #[test]
    fn postgres_url_is_not_memory() {
        let database = DatabaseConfig {
            url: "postgres://fyyur@localhost/fyyur".into(),
            ..DatabaseConfig::default()
        };
        assert!(!database.is_memory());
    }

    #[test]
    fn invalid_number_is_reported() {
        // Unique key so parallel tests do not race on the environment.
        env::set_var("BOOKING_TEST_BAD_NUMBER", "twenty");
        let err = parsed_or::<u32>("BOOKING_TEST_BAD_NUMBER", 1).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "BOOKING_TEST_BAD_NUMBER", .. }));
    }
}
