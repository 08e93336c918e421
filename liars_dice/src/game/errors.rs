//! Game error types.

use serde::Serialize;
use thiserror::Error;

use super::entities::{Face, GameStatus, PlayerId};

/// Broad class of a failure, used by transports to pick a response.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// The request broke a game rule.
    Validation,
    /// The request is not valid in the current phase.
    State,
    /// An external collaborator failed.
    External,
}

/// Errors raised by the game state machine
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GameError {
    #[error("invalid player id")]
    InvalidPlayerId,

    #[error("player {0} is already in the game")]
    DuplicatePlayer(PlayerId),

    #[error("player {0} is not in the game")]
    UnknownPlayer(PlayerId),

    #[error("need {required}+ players, have {joined}")]
    InsufficientPlayers { required: usize, joined: usize },

    #[error("not {0}'s turn")]
    NotYourTurn(PlayerId),

    #[error("player {0} hasn't rolled dice yet")]
    DiceNotRolled(PlayerId),

    #[error("claim {number} x {suit} must beat {prev_number} x {prev_suit}")]
    ClaimTooLow {
        number: u32,
        suit: Face,
        prev_number: u32,
        prev_suit: Face,
    },

    #[error("invalid claim {number} x {suit}")]
    InvalidClaim { number: u32, suit: Face },

    #[error("no claim to challenge")]
    NoClaimToChallenge,

    #[error("outs must be at most {max}, got {outs}")]
    InvalidOuts { outs: u8, max: u8 },

    #[error("can't {operation} while the game is {status}")]
    InvalidState {
        operation: &'static str,
        status: GameStatus,
    },
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidState { .. } => ErrorKind::State,
            _ => ErrorKind::Validation,
        }
    }
}

/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;
