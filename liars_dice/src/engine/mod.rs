//! Game engine façade owning the live session.
//!
//! This module implements:
//! - GameEngine: holds exactly one session behind a read/write lock
//! - Serialized mutations with a single writer and many status readers
//! - Event tags published to the hub after the lock is released
//! - Time-bounded settlement once a game is over
//!
//! ## Architecture
//!
//! Every mutating call takes the write lock, lets the session validate and
//! apply the change, drops the lock, and only then publishes a short tag such
//! as `claim:alice` to the [`EventHub`](crate::events::EventHub). A stalled
//! subscriber can therefore never hold up the game.

pub mod config;
pub mod errors;
pub mod manager;

pub use config::EngineConfig;
pub use errors::{EngineError, EngineResult};
pub use manager::GameEngine;
