use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::constants::{FACES, MAX_PLAYER_ID_LENGTH};

/// Placeholder for die faces (1u8 ... 6u8).
pub type Face = u8;

/// Whether a value is a face that can show on a die.
#[must_use]
pub fn is_face(value: Face) -> bool {
    (1..=FACES).contains(&value)
}

/// Account identifier of a player, typically a wallet address.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlayerId(String);

impl PlayerId {
    /// Trims surrounding whitespace. Length is checked where the id is used,
    /// see [`PlayerId::is_too_long`].
    pub fn new(s: &str) -> Self {
        Self(s.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Longer than [`MAX_PLAYER_ID_LENGTH`] characters.
    pub fn is_too_long(&self) -> bool {
        self.0.chars().count() > MAX_PLAYER_ID_LENGTH
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for PlayerId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let id = Self::new(&String::deserialize(deserializer)?);
        if id.is_too_long() {
            return Err(serde::de::Error::custom(format!(
                "player id longer than {MAX_PLAYER_ID_LENGTH} characters"
            )));
        }
        Ok(id)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

/// Lifecycle phase of a game session.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Open,
    Playing,
    RoundOver,
    GameOver,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Open => "open",
            Self::Playing => "playing",
            Self::RoundOver => "roundover",
            Self::GameOver => "gameover",
        };
        write!(f, "{repr}")
    }
}

/// A player's hidden dice plus their elimination counter.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Cup {
    pub player: PlayerId,
    /// Empty until the player rolls for the current round.
    pub dice: Vec<Face>,
    pub outs: u8,
    pub active: bool,
}

impl Cup {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            dice: Vec::new(),
            outs: 0,
            active: false,
        }
    }

    pub fn has_rolled(&self) -> bool {
        !self.dice.is_empty()
    }
}

/// A public assertion that at least `number` dice showing `suit` exist
/// among all active cups.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Claim {
    pub player: PlayerId,
    pub number: u32,
    pub suit: Face,
    /// 1-based position within the round.
    pub sequence: u32,
}

impl Claim {
    /// Claims are ordered by number first, then by suit.
    pub fn exceeds(&self, number: u32, suit: Face) -> bool {
        (number, suit) > (self.number, self.suit)
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} claims {} x {}", self.player, self.number, self.suit)
    }
}

/// Count of dice per face across a set of cups.
///
/// Slot `face - 1` holds the count for `face`, so the six faces map onto six
/// slots with nothing left unused.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct DiceTally([u32; FACES as usize]);

impl DiceTally {
    pub fn from_cups<'a>(cups: impl IntoIterator<Item = &'a Cup>) -> Self {
        let mut tally = Self::default();
        for face in cups.into_iter().flat_map(|cup| cup.dice.iter()) {
            if let Some(slot) = Self::slot(*face) {
                tally.0[slot] += 1;
            }
        }
        tally
    }

    /// Number of dice showing `face`. Anything off the die counts zero.
    pub fn count(&self, face: Face) -> u32 {
        Self::slot(face).map_or(0, |slot| self.0[slot])
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    fn slot(face: Face) -> Option<usize> {
        is_face(face).then(|| usize::from(face - 1))
    }
}

/// Result of a liar call.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RoundOutcome {
    pub winner: PlayerId,
    pub loser: PlayerId,
    /// The challenged claim.
    pub claim: Claim,
    pub tally: DiceTally,
}

/// What happened at a round boundary.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RoundResult {
    /// Play goes on with this many players.
    Continue { players_left: usize },
    /// One player remains and the game is over.
    GameComplete { winner: PlayerId },
}

/// Per-player slice of a [`GameSnapshot`].
#[derive(Clone, Debug, Serialize)]
pub struct CupView {
    pub player: PlayerId,
    pub outs: u8,
    pub dice: Vec<Face>,
    pub active: bool,
    /// Most recent claim this player made in the current round.
    pub last_claim: Option<Claim>,
}

/// Read-only view of a session used by status queries and relays.
#[derive(Clone, Debug, Serialize)]
pub struct GameSnapshot {
    pub id: String,
    pub status: GameStatus,
    pub round: u32,
    pub ante: u64,
    pub current_player: Option<PlayerId>,
    pub current_cup: usize,
    pub last_winner: Option<PlayerId>,
    pub last_loser: Option<PlayerId>,
    pub player_order: Vec<PlayerId>,
    pub cups: Vec<CupView>,
    pub claims: Vec<Claim>,
    pub eliminated: Vec<PlayerId>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cup_with(player: &str, dice: &[Face]) -> Cup {
        Cup {
            player: PlayerId::new(player),
            dice: dice.to_vec(),
            outs: 0,
            active: true,
        }
    }

    #[test]
    fn test_player_id_trims_whitespace() {
        assert_eq!(PlayerId::new("  0xabc \n").as_str(), "0xabc");
        assert!(PlayerId::new("   ").is_empty());
    }

    #[test]
    fn test_player_id_keeps_long_ids_distinct() {
        let prefix = format!("0x{}", "a".repeat(62));
        let alice = PlayerId::new(&format!("{prefix}ALICE"));
        let mallory = PlayerId::new(&format!("{prefix}MALLORY"));
        assert_ne!(alice, mallory);
        assert!(alice.is_too_long());
        assert!(!PlayerId::new(&"a".repeat(MAX_PLAYER_ID_LENGTH)).is_too_long());
    }

    #[test]
    fn test_player_id_deserialize_rejects_long_ids() {
        let json = format!("\"{}\"", "a".repeat(MAX_PLAYER_ID_LENGTH + 1));
        assert!(serde_json::from_str::<PlayerId>(&json).is_err());
    }

    #[test]
    fn test_player_id_deserialize_normalizes() {
        let id: PlayerId = serde_json::from_str("\" bob \"").unwrap();
        assert_eq!(id, PlayerId::new("bob"));
    }

    #[test]
    fn test_status_display_matches_serde() {
        for status in [
            GameStatus::Open,
            GameStatus::Playing,
            GameStatus::RoundOver,
            GameStatus::GameOver,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn test_tally_counts_every_face() {
        let cups = [
            cup_with("a", &[1, 2, 3, 4, 5]),
            cup_with("b", &[6, 6, 6, 1, 2]),
        ];
        let tally = DiceTally::from_cups(&cups);

        assert_eq!(tally.count(1), 2);
        assert_eq!(tally.count(2), 2);
        assert_eq!(tally.count(3), 1);
        assert_eq!(tally.count(4), 1);
        assert_eq!(tally.count(5), 1);
        assert_eq!(tally.count(6), 3);
        assert_eq!(tally.total(), 10);
    }

    #[test]
    fn test_tally_six_does_not_alias_other_faces() {
        let cups = [cup_with("a", &[6, 6, 6, 6, 6])];
        let tally = DiceTally::from_cups(&cups);

        assert_eq!(tally.count(6), 5);
        for face in 1..=5 {
            assert_eq!(tally.count(face), 0);
        }
        assert_eq!(tally.count(0), 0);
        assert_eq!(tally.count(7), 0);
    }

    #[test]
    fn test_claim_ordering() {
        let claim = Claim {
            player: PlayerId::new("a"),
            number: 2,
            suit: 3,
            sequence: 1,
        };

        assert!(claim.exceeds(2, 4));
        assert!(claim.exceeds(3, 1));
        assert!(!claim.exceeds(2, 3));
        assert!(!claim.exceeds(1, 6));
    }

    #[test]
    fn test_round_result_serializes_tagged() {
        let json = serde_json::to_value(RoundResult::Continue { players_left: 2 }).unwrap();
        assert_eq!(json["result"], "continue");
        assert_eq!(json["players_left"], 2);
    }
}
