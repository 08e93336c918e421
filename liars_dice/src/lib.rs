//! # Liar's Dice
//!
//! A multiplayer liar's dice engine built around a single-session finite state
//! machine and a publish/subscribe hub for live observers.
//!
//! ## Architecture
//!
//! A game moves through four phases:
//!
//! - **Open**: Players join; join order becomes turn order
//! - **Playing**: Players roll their cups and make increasing claims
//! - **RoundOver**: Someone called liar and the round was resolved
//! - **GameOver**: One player is left standing
//!
//! ## Core Modules
//!
//! - [`game`]: Session state machine, cups, claims, and dice tallies
//! - [`engine`]: Lock-guarded façade that serializes mutations and publishes events
//! - [`events`]: Subscriber registry that fans event tags out to observers
//! - [`settlement`]: Boundary to the external service that settles a finished game
//!
//! ## Example
//!
//! ```
//! use liars_dice::{EngineConfig, EventHub, GameEngine, LedgerSettlement, PlayerId};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), liars_dice::EngineError> {
//! let config = EngineConfig::default();
//! let hub = Arc::new(EventHub::new(config.subscriber_capacity));
//! let engine = GameEngine::new(config, hub, Arc::new(LedgerSettlement::new()));
//!
//! engine.new_game(5).await;
//! engine.add_player(&PlayerId::new("alice")).await?;
//! engine.add_player(&PlayerId::new("bob")).await?;
//! engine.start_game().await?;
//! # Ok(())
//! # }
//! ```

/// Lock-guarded game façade.
pub mod engine;
pub use engine::{EngineConfig, EngineError, EngineResult, GameEngine};

/// Live notification fan-out.
pub mod events;
pub use events::{EventHub, HubError, Subscription};

/// Core game logic, entities, and state machine.
pub mod game;
pub use game::{
    ErrorKind, GameError, GameResult, GameSession,
    constants::{self, DICE_PER_CUP, MAX_OUTS, MIN_PLAYERS},
    entities::{
        self, Claim, Cup, CupView, DiceTally, Face, GameSnapshot, GameStatus, PlayerId,
        RoundOutcome, RoundResult,
    },
};

/// External settlement boundary.
pub mod settlement;
pub use settlement::{LedgerSettlement, ReconcileRequest, Settlement, SettlementError};
