//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use liars_dice::EngineConfig;
use std::net::SocketAddr;

const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Game engine configuration
    pub engine: EngineConfig,
    /// Balance credited to an account the first time it joins a game
    pub starting_balance: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if `SERVER_BIND` is set but is not a socket address
    pub fn from_env(bind_override: Option<SocketAddr>) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => {
                let raw = std::env::var("SERVER_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
                raw.parse().map_err(|_| ConfigError::Invalid {
                    var: "SERVER_BIND".to_string(),
                    reason: format!("'{}' is not an IP:PORT address", raw),
                })?
            }
        };

        let defaults = EngineConfig::default();
        let engine = EngineConfig {
            settlement_timeout_secs: parse_env_or(
                "SETTLEMENT_TIMEOUT_SECS",
                defaults.settlement_timeout_secs,
            ),
            game_fee: parse_env_or("GAME_FEE", defaults.game_fee),
            subscriber_capacity: parse_env_or("SUBSCRIBER_CAPACITY", defaults.subscriber_capacity),
        };

        Ok(ServerConfig {
            bind,
            engine,
            starting_balance: parse_env_or("STARTING_BALANCE", 1000),
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                var: "engine".to_string(),
                reason,
            })?;

        if self.starting_balance == 0 {
            return Err(ConfigError::Invalid {
                var: "STARTING_BALANCE".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
