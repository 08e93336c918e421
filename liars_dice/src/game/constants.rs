/// Dice rolled into every cup at the start of a round.
pub const DICE_PER_CUP: usize = 5;

/// Highest face on a die. Faces run from 1 through this value.
pub const FACES: u8 = 6;

/// Outs that knock a player out at the next round boundary.
pub const MAX_OUTS: u8 = 3;

/// Players needed before a game can start.
pub const MIN_PLAYERS: usize = 2;

pub const MAX_PLAYER_ID_LENGTH: usize = 64;
