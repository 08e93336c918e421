//! In-memory settlement ledger with idempotency keys.

use super::{
    Settlement,
    errors::{SettlementError, SettlementResult},
    models::ReconcileRequest,
};
use crate::game::entities::PlayerId;
use async_trait::async_trait;
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// Account credited with game fees
pub const HOUSE_ACCOUNT: &str = "house";

#[derive(Default)]
struct LedgerState {
    balances: HashMap<PlayerId, u64>,
    /// Game IDs already reconciled
    settled: HashSet<String>,
}

/// Settlement backed by an in-process balance table
#[derive(Default)]
pub struct LedgerSettlement {
    state: RwLock<LedgerState>,
}

impl LedgerSettlement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit an account, creating it if needed
    ///
    /// # Returns
    ///
    /// * `SettlementResult<u64>` - New balance or error
    pub async fn deposit(&self, account: &PlayerId, amount: u64) -> SettlementResult<u64> {
        if amount == 0 {
            return Err(SettlementError::InvalidAmount(amount));
        }

        let mut state = self.state.write().await;
        let balance = state.balances.entry(account.clone()).or_insert(0);
        *balance = balance.saturating_add(amount);
        Ok(*balance)
    }

    /// Whether a game has already been reconciled
    pub async fn is_settled(&self, game_id: &str) -> bool {
        self.state.read().await.settled.contains(game_id)
    }
}

#[async_trait]
impl Settlement for LedgerSettlement {
    async fn reconcile(&self, request: &ReconcileRequest) -> SettlementResult<()> {
        let mut state = self.state.write().await;

        if state.settled.contains(&request.game_id) {
            debug!("Game {} already settled", request.game_id);
            return Ok(());
        }

        // Check every loser before touching any balance.
        for loser in &request.losers {
            let available = *state
                .balances
                .get(loser)
                .ok_or_else(|| SettlementError::AccountNotFound(loser.to_string()))?;
            if available < request.ante {
                return Err(SettlementError::InsufficientBalance {
                    account: loser.to_string(),
                    available,
                    required: request.ante,
                });
            }
        }

        for loser in &request.losers {
            if let Some(balance) = state.balances.get_mut(loser) {
                *balance = balance.saturating_sub(request.ante);
            }
        }

        let payout = request.payout();
        let fee = request.pot() - payout;
        let winner = state.balances.entry(request.winner.clone()).or_insert(0);
        *winner = winner.saturating_add(payout);
        let house = state
            .balances
            .entry(PlayerId::new(HOUSE_ACCOUNT))
            .or_insert(0);
        *house = house.saturating_add(fee);

        state.settled.insert(request.game_id.clone());

        info!(
            "Settled game {}: {} wins {} from {} loser(s), fee {}",
            request.game_id,
            request.winner,
            payout,
            request.losers.len(),
            fee
        );
        Ok(())
    }

    async fn balance(&self, account: &PlayerId) -> SettlementResult<u64> {
        self.state
            .read()
            .await
            .balances
            .get(account)
            .copied()
            .ok_or_else(|| SettlementError::AccountNotFound(account.to_string()))
    }
}
