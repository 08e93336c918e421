//! Liar's dice session state machine.
//!
//! A [`GameSession`] moves `Open → Playing → RoundOver → {Playing | GameOver}`.
//! Every operation checks the phase first and leaves the session untouched
//! when it fails, so a rejected call never leaves partial state behind.

use chrono::{DateTime, Utc};
use log::{debug, info};
use rand::Rng;
use uuid::Uuid;

use super::constants::{DICE_PER_CUP, FACES, MAX_OUTS, MIN_PLAYERS};
use super::entities::{
    Claim, Cup, CupView, DiceTally, Face, GameSnapshot, GameStatus, PlayerId, RoundOutcome,
    RoundResult, is_face,
};
use super::errors::{GameError, GameResult};

/// A single game of liar's dice, from the lobby to the last player standing.
#[derive(Clone, Debug)]
pub struct GameSession {
    id: String,
    status: GameStatus,
    ante: u64,
    round: u32,
    /// Join order is turn order. Eliminated cups are dropped between rounds.
    players: Vec<Cup>,
    /// Claims made in the current round, oldest first.
    claims: Vec<Claim>,
    /// Index into the active cups of the player whose turn it is.
    turn_index: usize,
    last_winner: Option<PlayerId>,
    last_loser: Option<PlayerId>,
    /// Players knocked out, in the order they left.
    eliminated: Vec<PlayerId>,
    created_at: DateTime<Utc>,
}

impl GameSession {
    #[must_use]
    pub fn new(ante: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            status: GameStatus::Open,
            ante,
            round: 0,
            players: Vec::new(),
            claims: Vec::new(),
            turn_index: 0,
            last_winner: None,
            last_loser: None,
            eliminated: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn ante(&self) -> u64 {
        self.ante
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn players(&self) -> &[Cup] {
        &self.players
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    pub fn last_winner(&self) -> Option<&PlayerId> {
        self.last_winner.as_ref()
    }

    pub fn last_loser(&self) -> Option<&PlayerId> {
        self.last_loser.as_ref()
    }

    pub fn eliminated(&self) -> &[PlayerId] {
        &self.eliminated
    }

    pub fn cup(&self, player: &PlayerId) -> Option<&Cup> {
        self.players.iter().find(|cup| &cup.player == player)
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// The player whose turn it is, if a round is being played.
    pub fn current_player(&self) -> Option<&PlayerId> {
        match self.status {
            GameStatus::Playing | GameStatus::RoundOver => {
                self.active().nth(self.turn_index).map(|cup| &cup.player)
            }
            GameStatus::Open | GameStatus::GameOver => None,
        }
    }

    pub fn add_player(&mut self, player: &PlayerId) -> GameResult<()> {
        validate_id(player)?;
        self.require("add player", &[GameStatus::Open])?;

        if self.cup(player).is_some() {
            return Err(GameError::DuplicatePlayer(player.clone()));
        }

        self.players.push(Cup::new(player.clone()));
        debug!("Game {}: {} joined", self.id, player);
        Ok(())
    }

    pub fn remove_player(&mut self, player: &PlayerId) -> GameResult<()> {
        validate_id(player)?;
        self.require("remove player", &[GameStatus::Open])?;

        let position = self
            .players
            .iter()
            .position(|cup| &cup.player == player)
            .ok_or_else(|| GameError::UnknownPlayer(player.clone()))?;
        self.players.remove(position);
        debug!("Game {}: {} left", self.id, player);
        Ok(())
    }

    pub fn start(&mut self) -> GameResult<()> {
        self.require("start", &[GameStatus::Open])?;

        if self.players.len() < MIN_PLAYERS {
            return Err(GameError::InsufficientPlayers {
                required: MIN_PLAYERS,
                joined: self.players.len(),
            });
        }

        for cup in &mut self.players {
            cup.active = true;
        }
        self.status = GameStatus::Playing;
        self.turn_index = 0;
        self.round = 1;
        self.claims.clear();

        info!(
            "Game {} started with {} players, ante {}",
            self.id,
            self.players.len(),
            self.ante
        );
        Ok(())
    }

    /// Roll a fresh set of dice for a player using the thread-local generator.
    pub fn roll_dice(&mut self, player: &PlayerId) -> GameResult<Vec<Face>> {
        self.roll_dice_with(player, &mut rand::rng())
    }

    /// Roll a fresh set of dice for a player, overwriting any previous roll.
    /// Rolling never moves the turn.
    pub fn roll_dice_with<R: Rng + ?Sized>(
        &mut self,
        player: &PlayerId,
        rng: &mut R,
    ) -> GameResult<Vec<Face>> {
        validate_id(player)?;
        self.require("roll dice", &[GameStatus::Playing])?;

        let cup = self
            .active_cup_mut(player)
            .ok_or_else(|| GameError::UnknownPlayer(player.clone()))?;
        cup.dice = (0..DICE_PER_CUP)
            .map(|_| rng.random_range(1..=FACES))
            .collect();

        Ok(cup.dice.clone())
    }

    /// Record a claim by the player whose turn it is and pass the turn on.
    pub fn claim(&mut self, player: &PlayerId, number: u32, suit: Face) -> GameResult<Claim> {
        validate_id(player)?;
        self.require("claim", &[GameStatus::Playing])?;
        let cup = self.turn_cup(player)?;

        if number == 0 || !is_face(suit) {
            return Err(GameError::InvalidClaim { number, suit });
        }
        if !cup.has_rolled() {
            return Err(GameError::DiceNotRolled(player.clone()));
        }

        if let Some(prev) = self.claims.last()
            && !prev.exceeds(number, suit)
        {
            return Err(GameError::ClaimTooLow {
                number,
                suit,
                prev_number: prev.number,
                prev_suit: prev.suit,
            });
        }

        let claim = Claim {
            player: player.clone(),
            number,
            suit,
            sequence: self.claims.len() as u32 + 1,
        };
        self.claims.push(claim.clone());
        self.advance_turn();

        debug!("Game {}: {}", self.id, claim);
        Ok(claim)
    }

    /// Challenge the most recent claim and resolve the round.
    ///
    /// If fewer dice show the claimed suit than claimed, the claimant takes an
    /// out and the caller wins; otherwise the caller takes the out.
    pub fn call_liar(&mut self, player: &PlayerId) -> GameResult<RoundOutcome> {
        validate_id(player)?;
        self.require("call liar", &[GameStatus::Playing])?;
        self.turn_cup(player)?;

        let claim = self
            .claims
            .last()
            .cloned()
            .ok_or(GameError::NoClaimToChallenge)?;

        let tally = DiceTally::from_cups(self.active());
        let (winner, loser) = if tally.count(claim.suit) < claim.number {
            (player.clone(), claim.player.clone())
        } else {
            (claim.player.clone(), player.clone())
        };

        if let Some(cup) = self.active_cup_mut(&loser) {
            cup.outs = (cup.outs + 1).min(MAX_OUTS);
        }

        self.status = GameStatus::RoundOver;
        self.last_winner = Some(winner.clone());
        self.last_loser = Some(loser.clone());

        info!(
            "Game {} round {}: {} called liar on '{}' ({} showing), {} takes an out",
            self.id,
            self.round,
            player,
            claim,
            tally.count(claim.suit),
            loser
        );

        Ok(RoundOutcome {
            winner,
            loser,
            claim,
            tally,
        })
    }

    /// Drop players with three outs and either start the next round or end
    /// the game. Elimination only ever happens here.
    pub fn next_round(&mut self) -> GameResult<RoundResult> {
        self.require("start a new round", &[GameStatus::RoundOver])?;

        let (mut out, mut remaining): (Vec<Cup>, Vec<Cup>) = self
            .players
            .drain(..)
            .partition(|cup| cup.outs >= MAX_OUTS);

        // Somebody has to win. If every cup is out, the last round's winner
        // stays.
        if remaining.is_empty() {
            let keep = self
                .last_winner
                .as_ref()
                .and_then(|winner| out.iter().position(|cup| &cup.player == winner))
                .unwrap_or(0);
            if keep < out.len() {
                remaining.push(out.remove(keep));
            }
        }

        for cup in out {
            info!("Game {}: {} eliminated", self.id, cup.player);
            self.eliminated.push(cup.player);
        }
        self.players = remaining;

        if self.players.len() <= 1 {
            self.status = GameStatus::GameOver;
            self.turn_index = 0;
            let winner = self
                .players
                .first()
                .map(|cup| cup.player.clone())
                .ok_or(GameError::InvalidState {
                    operation: "start a new round",
                    status: GameStatus::GameOver,
                })?;
            info!("Game {} over, {} wins", self.id, winner);
            return Ok(RoundResult::GameComplete { winner });
        }

        for cup in &mut self.players {
            cup.dice.clear();
        }
        self.claims.clear();
        self.round += 1;
        self.turn_index = self
            .position_of(self.last_loser.as_ref())
            .or_else(|| self.position_of(self.last_winner.as_ref()))
            .unwrap_or(0);
        self.status = GameStatus::Playing;

        debug!(
            "Game {} round {} begins with {} players",
            self.id,
            self.round,
            self.players.len()
        );
        Ok(RoundResult::Continue {
            players_left: self.players.len(),
        })
    }

    /// Force a player's out count. Used by an external turn-timeout
    /// controller; elimination still waits for the next round boundary.
    pub fn apply_out(&mut self, player: &PlayerId, outs: u8) -> GameResult<()> {
        validate_id(player)?;
        self.require("apply outs", &[GameStatus::Playing, GameStatus::RoundOver])?;

        if outs > MAX_OUTS {
            return Err(GameError::InvalidOuts {
                outs,
                max: MAX_OUTS,
            });
        }

        let cup = self
            .active_cup_mut(player)
            .ok_or_else(|| GameError::UnknownPlayer(player.clone()))?;
        cup.outs = outs;

        info!("Game {}: {} outs set to {}", self.id, player, outs);
        Ok(())
    }

    /// Pass the turn without a claim, for a player who stalled.
    pub fn next_turn(&mut self) -> GameResult<()> {
        self.require("skip a turn", &[GameStatus::Playing])?;
        self.advance_turn();
        Ok(())
    }

    /// The last player standing.
    pub fn winner(&self) -> GameResult<&PlayerId> {
        self.require("pick a winner", &[GameStatus::GameOver])?;
        self.players
            .first()
            .map(|cup| &cup.player)
            .ok_or(GameError::InvalidState {
                operation: "pick a winner",
                status: self.status,
            })
    }

    /// Everyone who was knocked out, in elimination order.
    pub fn losers(&self) -> GameResult<&[PlayerId]> {
        self.require("list losers", &[GameStatus::GameOver])?;
        Ok(&self.eliminated)
    }

    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        let cups = self
            .players
            .iter()
            .map(|cup| CupView {
                player: cup.player.clone(),
                outs: cup.outs,
                dice: cup.dice.clone(),
                active: cup.active,
                last_claim: self
                    .claims
                    .iter()
                    .rev()
                    .find(|claim| claim.player == cup.player)
                    .cloned(),
            })
            .collect();

        GameSnapshot {
            id: self.id.clone(),
            status: self.status,
            round: self.round,
            ante: self.ante,
            current_player: self.current_player().cloned(),
            current_cup: self.turn_index,
            last_winner: self.last_winner.clone(),
            last_loser: self.last_loser.clone(),
            player_order: self.active().map(|cup| cup.player.clone()).collect(),
            cups,
            claims: self.claims.clone(),
            eliminated: self.eliminated.clone(),
            created_at: self.created_at,
        }
    }

    fn require(&self, operation: &'static str, allowed: &[GameStatus]) -> GameResult<()> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(GameError::InvalidState {
                operation,
                status: self.status,
            })
        }
    }

    fn active(&self) -> impl Iterator<Item = &Cup> {
        self.players.iter().filter(|cup| cup.active)
    }

    fn active_cup_mut(&mut self, player: &PlayerId) -> Option<&mut Cup> {
        self.players
            .iter_mut()
            .find(|cup| cup.active && &cup.player == player)
    }

    /// The cup at the turn pointer, provided it belongs to `player`.
    fn turn_cup(&self, player: &PlayerId) -> GameResult<&Cup> {
        self.active()
            .nth(self.turn_index)
            .filter(|cup| &cup.player == player)
            .ok_or_else(|| GameError::NotYourTurn(player.clone()))
    }

    fn advance_turn(&mut self) {
        let active = self.active_count();
        if active > 0 {
            self.turn_index = (self.turn_index + 1) % active;
        }
    }

    fn position_of(&self, player: Option<&PlayerId>) -> Option<usize> {
        let player = player?;
        self.active().position(|cup| &cup.player == player)
    }
}

fn validate_id(player: &PlayerId) -> GameResult<()> {
    if player.is_empty() || player.is_too_long() {
        Err(GameError::InvalidPlayerId)
    } else {
        Ok(())
    }
}
