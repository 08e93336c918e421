//! Liar's dice game engine - core FSM and game logic.
//!
//! This module provides the foundational game implementation including:
//! - A four-phase state machine (open, playing, round over, game over)
//! - Cups, claims, and the dice tally used to resolve a challenge
//! - Read-only snapshots for relays and status queries

pub mod constants;
pub mod entities;
pub mod errors;
pub mod state_machine;

pub use errors::{ErrorKind, GameError, GameResult};
pub use state_machine::GameSession;
