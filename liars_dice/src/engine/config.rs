//! Engine configuration.

use crate::events::DEFAULT_SUBSCRIBER_CAPACITY;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Upper bound on a single settlement call, in seconds
    pub settlement_timeout_secs: u64,

    /// House fee taken from the pot when a game is settled
    pub game_fee: u64,

    /// Messages buffered per event subscriber before new ones are dropped
    pub subscriber_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            settlement_timeout_secs: 10,
            game_fee: 0,
            subscriber_capacity: DEFAULT_SUBSCRIBER_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.settlement_timeout_secs == 0 || self.settlement_timeout_secs > 300 {
            return Err("Settlement timeout must be between 1 and 300 seconds".to_string());
        }

        if self.subscriber_capacity == 0 {
            return Err("Subscriber capacity must be greater than 0".to_string());
        }

        Ok(())
    }

    pub fn settlement_timeout(&self) -> Duration {
        Duration::from_secs(self.settlement_timeout_secs)
    }
}
