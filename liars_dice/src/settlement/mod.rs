//! Settlement boundary for finished games.
//!
//! The engine calls [`Settlement::reconcile`] once a game is over to move the
//! antes from the losers to the winner, less the house fee. The call is keyed
//! by the game id so a repeated request for the same game is harmless.
//!
//! [`LedgerSettlement`] is an in-memory implementation with idempotency keys,
//! used by the server binary and by tests. Anything that talks to a real
//! settlement backend implements the same trait.

pub mod errors;
pub mod ledger;
pub mod models;

pub use errors::{SettlementError, SettlementResult};
pub use ledger::{HOUSE_ACCOUNT, LedgerSettlement};
pub use models::ReconcileRequest;

use crate::game::entities::PlayerId;
use async_trait::async_trait;

/// External service that settles balances when a game ends
#[async_trait]
pub trait Settlement: Send + Sync {
    /// Move the antes of `request.losers` to `request.winner` and pay the fee.
    ///
    /// Must be safe to call again with the same request.
    async fn reconcile(&self, request: &ReconcileRequest) -> SettlementResult<()>;

    /// Current balance of an account
    async fn balance(&self, account: &PlayerId) -> SettlementResult<u64>;
}
