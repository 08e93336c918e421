//! Settlement data models.

use serde::{Deserialize, Serialize};

use crate::game::entities::PlayerId;

/// Everything the settlement service needs to close out one game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileRequest {
    /// Game ID, doubles as the idempotency key
    pub game_id: String,
    pub winner: PlayerId,
    pub losers: Vec<PlayerId>,
    /// Stake each loser pays
    pub ante: u64,
    /// House cut taken from the pot
    pub fee: u64,
}

impl ReconcileRequest {
    /// Total staked by the losers
    pub fn pot(&self) -> u64 {
        self.ante.saturating_mul(self.losers.len() as u64)
    }

    /// What the winner receives after the fee
    pub fn payout(&self) -> u64 {
        self.pot().saturating_sub(self.fee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payout_subtracts_fee() {
        let request = ReconcileRequest {
            game_id: "g".to_string(),
            winner: PlayerId::new("a"),
            losers: vec![PlayerId::new("b"), PlayerId::new("c")],
            ante: 5,
            fee: 2,
        };
        assert_eq!(request.pot(), 10);
        assert_eq!(request.payout(), 8);
    }

    #[test]
    fn test_payout_never_negative() {
        let request = ReconcileRequest {
            game_id: "g".to_string(),
            winner: PlayerId::new("a"),
            losers: vec![PlayerId::new("b")],
            ante: 1,
            fee: 10,
        };
        assert_eq!(request.payout(), 0);
    }
}
