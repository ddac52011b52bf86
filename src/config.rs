//! Configuration for the garden daemon.
//!
//! Settings are resolved from three layers, highest precedence first: command-line flags,
//! environment variables, built-in defaults.
//!
//! | Setting | Flag | Environment | Default |
//! |---------|------|-------------|---------|
//! | database URL | `--database-url` | `DATABASE_URL` | required |
//! | bind host | `--host` | `GARDEN_HOST` | `127.0.0.1` |
//! | bind port | `--port` | `GARDEN_PORT` | `8080` |
//! | pool size | `--max-connections` | | `5` |
//! | log filter | `--verbose` | `GARDEN_LOG` | `info` (`debug` with `--verbose`) |

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Errors raised while resolving configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("no database URL: pass --database-url or set DATABASE_URL")]
    MissingDatabaseUrl,
    #[error("invalid port {0:?}: expected an integer 1-65535")]
    InvalidPort(String),
    #[error("invalid max connections {0:?}: expected a positive integer")]
    InvalidMaxConnections(String),
}

/// Values supplied on the command line. `None` defers to the environment or the default.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub max_connections: Option<String>,
    pub verbose: bool,
}

/// Fully resolved daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub log_filter: String,
}

impl ServerConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        Self::resolve(overrides, |key| std::env::var(key).ok())
    }

    /// Resolves configuration with an explicit environment lookup.
    pub fn resolve(
        overrides: ConfigOverrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let database_url = non_empty(overrides.database_url)
            .or_else(|| non_empty(lookup("DATABASE_URL")))
            .ok_or(ConfigError::MissingDatabaseUrl)?;
        let host = non_empty(overrides.host)
            .or_else(|| non_empty(lookup("GARDEN_HOST")))
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match non_empty(overrides.port).or_else(|| non_empty(lookup("GARDEN_PORT"))) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|port| *port != 0)
                .ok_or(ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };
        let max_connections = match non_empty(overrides.max_connections) {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidMaxConnections(raw))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        let log_filter = non_empty(lookup("GARDEN_LOG")).unwrap_or_else(|| {
            if overrides.verbose {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

        Ok(Self {
            database_url,
            host,
            port,
            max_connections,
            log_filter,
        })
    }

    /// The `host:port` string to bind the listener to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Opens the connection pool.
    pub async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .connect(&self.database_url)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config =
            ServerConfig::resolve(ConfigOverrides::default(), env(&[("DATABASE_URL", "postgres://db/garden")]))
                .unwrap();
        assert_eq!(config.database_url, "postgres://db/garden");
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn flags_beat_environment() {
        let overrides = ConfigOverrides {
            database_url: Some("postgres://flag/garden".to_string()),
            port: Some("9000".to_string()),
            verbose: true,
            ..Default::default()
        };
        let config = ServerConfig::resolve(
            overrides,
            env(&[
                ("DATABASE_URL", "postgres://env/garden"),
                ("GARDEN_PORT", "7000"),
                ("GARDEN_HOST", "0.0.0.0"),
            ]),
        )
        .unwrap();
        assert_eq!(config.database_url, "postgres://flag/garden");
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn garden_log_wins_over_verbose() {
        let overrides = ConfigOverrides {
            verbose: true,
            ..Default::default()
        };
        let config = ServerConfig::resolve(
            overrides,
            env(&[("DATABASE_URL", "postgres://db"), ("GARDEN_LOG", "garden=trace")]),
        )
        .unwrap();
        assert_eq!(config.log_filter, "garden=trace");
    }

    #[test]
    fn database_url_is_required() {
        assert_eq!(
            ServerConfig::resolve(ConfigOverrides::default(), env(&[])),
            Err(ConfigError::MissingDatabaseUrl)
        );
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let lookup = env(&[("DATABASE_URL", "postgres://db"), ("GARDEN_PORT", "http")]);
        assert_eq!(
            ServerConfig::resolve(ConfigOverrides::default(), lookup),
            Err(ConfigError::InvalidPort("http".to_string()))
        );
        let overrides = ConfigOverrides {
            max_connections: Some("0".to_string()),
            ..Default::default()
        };
        assert_eq!(
            ServerConfig::resolve(overrides, env(&[("DATABASE_URL", "postgres://db")])),
            Err(ConfigError::InvalidMaxConnections("0".to_string()))
        );
    }
}
