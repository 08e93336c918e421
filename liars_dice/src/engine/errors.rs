//! Engine error types.

use thiserror::Error;

use crate::events::HubError;
use crate::game::{ErrorKind, GameError, entities::PlayerId};
use crate::settlement::SettlementError;

/// Engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// The game rejected the operation
    #[error(transparent)]
    Game(#[from] GameError),

    /// No game has been created yet
    #[error("no game exists")]
    NoGame,

    /// Only the declared winner may settle a game
    #[error("player {0} is not the winner of this game")]
    NotWinner(PlayerId),

    /// Settlement service failed
    #[error("settlement failed: {0}")]
    Settlement(#[from] SettlementError),

    /// Settlement service did not answer in time
    #[error("settlement timed out after {0}s")]
    SettlementTimeout(u64),

    /// Event hub is shut down
    #[error(transparent)]
    Hub(#[from] HubError),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Game(err) => err.kind(),
            EngineError::NoGame | EngineError::Hub(_) => ErrorKind::State,
            EngineError::NotWinner(_) => ErrorKind::Validation,
            EngineError::Settlement(_) | EngineError::SettlementTimeout(_) => ErrorKind::External,
        }
    }

    /// Get a client-safe error message
    ///
    /// Settlement failures are reduced to their sanitized form; game rule
    /// violations are safe to show as-is.
    pub fn client_message(&self) -> String {
        match self {
            EngineError::Settlement(err) => err.client_message(),
            _ => self.to_string(),
        }
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
