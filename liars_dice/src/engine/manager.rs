//! Game engine owning the single live session.

use super::{
    config::EngineConfig,
    errors::{EngineError, EngineResult},
};
use crate::events::{EventHub, Subscription};
use crate::game::{
    GameResult, GameSession,
    entities::{Claim, Face, GameSnapshot, GameStatus, PlayerId, RoundOutcome, RoundResult},
};
use crate::settlement::{ReconcileRequest, Settlement};
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::timeout;

/// Serializes every game mutation and fans out event tags.
pub struct GameEngine {
    /// Current session, if one has been created
    session: RwLock<Option<GameSession>>,

    /// Event fan-out for relays
    hub: Arc<EventHub>,

    /// Settlement service
    settlement: Arc<dyn Settlement>,

    config: EngineConfig,
}

impl GameEngine {
    /// Create a new game engine
    ///
    /// # Arguments
    ///
    /// * `config` - Engine configuration
    /// * `hub` - Event hub that receives a tag after every mutation
    /// * `settlement` - Settlement service used once a game is over
    pub fn new(config: EngineConfig, hub: Arc<EventHub>, settlement: Arc<dyn Settlement>) -> Self {
        Self {
            session: RwLock::new(None),
            hub,
            settlement,
            config,
        }
    }

    pub fn hub(&self) -> &Arc<EventHub> {
        &self.hub
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Open an event queue for `subscriber_id`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Hub`] once the hub has been shut down.
    pub async fn subscribe(&self, subscriber_id: &str) -> EngineResult<Subscription> {
        let subscription = self.hub.acquire(subscriber_id).await?;
        debug!("Subscriber {} attached", subscriber_id);
        Ok(subscription)
    }

    /// Close the queue opened by [`GameEngine::subscribe`].
    pub async fn unsubscribe(&self, subscriber_id: &str) -> bool {
        self.hub.release(subscriber_id).await
    }

    /// Start a fresh game, replacing whatever was there
    pub async fn new_game(&self, ante: u64) -> GameSnapshot {
        let snapshot = {
            let mut guard = self.session.write().await;
            if let Some(previous) = guard.as_ref()
                && previous.status() != GameStatus::GameOver
            {
                warn!(
                    "Replacing unfinished game {} ({})",
                    previous.id(),
                    previous.status()
                );
            }
            let session = GameSession::new(ante);
            info!("Created game {} with ante {}", session.id(), ante);
            let snapshot = session.snapshot();
            *guard = Some(session);
            snapshot
        };

        self.publish("newgame".to_string()).await;
        snapshot
    }

    pub async fn add_player(&self, player: &PlayerId) -> EngineResult<()> {
        self.mutate(|session| session.add_player(player)).await?;
        self.publish(format!("join:{player}")).await;
        Ok(())
    }

    pub async fn remove_player(&self, player: &PlayerId) -> EngineResult<()> {
        self.mutate(|session| session.remove_player(player)).await?;
        self.publish(format!("leave:{player}")).await;
        Ok(())
    }

    pub async fn start_game(&self) -> EngineResult<()> {
        self.mutate(GameSession::start).await?;
        self.publish("start".to_string()).await;
        Ok(())
    }

    /// Roll a player's cup and return the dice
    pub async fn roll_dice(&self, player: &PlayerId) -> EngineResult<Vec<Face>> {
        let dice = self.mutate(|session| session.roll_dice(player)).await?;
        self.publish(format!("rolldice:{player}")).await;
        Ok(dice)
    }

    pub async fn claim(&self, player: &PlayerId, number: u32, suit: Face) -> EngineResult<Claim> {
        let claim = self
            .mutate(|session| session.claim(player, number, suit))
            .await?;
        self.publish(format!("claim:{player}")).await;
        Ok(claim)
    }

    pub async fn call_liar(&self, player: &PlayerId) -> EngineResult<RoundOutcome> {
        let outcome = self.mutate(|session| session.call_liar(player)).await?;
        self.publish(format!("callliar:{player}")).await;
        Ok(outcome)
    }

    /// Close out the round; publishes `gameover:<winner>` when it ends the game
    pub async fn new_round(&self) -> EngineResult<RoundResult> {
        let result = self.mutate(GameSession::next_round).await?;
        let tag = match &result {
            RoundResult::Continue { .. } => "newround".to_string(),
            RoundResult::GameComplete { winner } => format!("gameover:{winner}"),
        };
        self.publish(tag).await;
        Ok(result)
    }

    pub async fn apply_out(&self, player: &PlayerId, outs: u8) -> EngineResult<()> {
        self.mutate(|session| session.apply_out(player, outs)).await?;
        self.publish(format!("outs:{player}")).await;
        Ok(())
    }

    pub async fn next_turn(&self) -> EngineResult<()> {
        self.mutate(GameSession::next_turn).await?;
        self.publish("nextturn".to_string()).await;
        Ok(())
    }

    pub async fn status(&self) -> EngineResult<GameSnapshot> {
        self.session
            .read()
            .await
            .as_ref()
            .map(GameSession::snapshot)
            .ok_or(EngineError::NoGame)
    }

    /// Settle a finished game through the settlement service
    ///
    /// Only the winner may ask. The session is not touched whatever the
    /// service answers, so a failed settlement can simply be requested again.
    ///
    /// # Returns
    ///
    /// * `EngineResult<ReconcileRequest>` - The request that was settled
    pub async fn reconcile(&self, caller: &PlayerId) -> EngineResult<ReconcileRequest> {
        let request = {
            let guard = self.session.read().await;
            let session = guard.as_ref().ok_or(EngineError::NoGame)?;
            let winner = session.winner()?;
            if winner != caller {
                return Err(EngineError::NotWinner(caller.clone()));
            }
            ReconcileRequest {
                game_id: session.id().to_string(),
                winner: winner.clone(),
                losers: session.losers()?.to_vec(),
                ante: session.ante(),
                fee: self.config.game_fee,
            }
        };

        let limit = self.config.settlement_timeout();
        match timeout(limit, self.settlement.reconcile(&request)).await {
            Ok(Ok(())) => {
                info!(
                    "Game {} reconciled: {} collects from {} loser(s)",
                    request.game_id,
                    request.winner,
                    request.losers.len()
                );
            }
            Ok(Err(err)) => {
                error!("Settlement of game {} failed: {}", request.game_id, err);
                return Err(err.into());
            }
            Err(_) => {
                error!(
                    "Settlement of game {} timed out after {:?}",
                    request.game_id, limit
                );
                return Err(EngineError::SettlementTimeout(
                    self.config.settlement_timeout_secs,
                ));
            }
        }

        self.publish(format!("reconcile:{}", request.winner)).await;
        Ok(request)
    }

    /// Look up an account balance with the settlement service
    pub async fn player_balance(&self, player: &PlayerId) -> EngineResult<u64> {
        match timeout(
            self.config.settlement_timeout(),
            self.settlement.balance(player),
        )
        .await
        {
            Ok(result) => Ok(result?),
            Err(_) => Err(EngineError::SettlementTimeout(
                self.config.settlement_timeout_secs,
            )),
        }
    }

    /// Run `op` against the session under the write lock.
    async fn mutate<T, F>(&self, op: F) -> EngineResult<T>
    where
        F: FnOnce(&mut GameSession) -> GameResult<T>,
    {
        let mut guard = self.session.write().await;
        let session = guard.as_mut().ok_or(EngineError::NoGame)?;
        Ok(op(session)?)
    }

    /// Must be called with no session lock held.
    async fn publish(&self, tag: String) {
        self.hub.send(&tag).await;
    }
}
