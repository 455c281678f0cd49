//! Fixed Gin Rummy rule constants.

pub const PLAYERS: usize = 2;
pub const HAND_SIZE: usize = 10;
pub const DECK_SIZE: usize = 52;

/// Highest deadwood a player may knock with.
pub const KNOCK_LIMIT: u32 = 10;
pub const GIN_BONUS: u32 = 25;
pub const UNDERCUT_BONUS: u32 = 25;

/// Cumulative score that ends the game.
pub const GAME_TARGET: u32 = 100;

/// A discard that leaves this many stock cards or fewer ends the round
/// with no score.
pub const STOCK_FLOOR: usize = 2;

/// Payload version stamped on every event this build produces.
pub const EVENT_VERSION: u32 = 1;

pub const MIN_MELD_SIZE: usize = 3;
pub const MAX_SET_SIZE: usize = 4;
pub const MAX_RUN_SIZE: usize = 13;
