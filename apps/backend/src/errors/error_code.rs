//! Error codes for the gin backend.
//!
//! This module defines all error codes used throughout the application.
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that callers surface to players.

use core::fmt;

use super::domain::ValidationKind;

/// Centralized error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Move validation
    /// Action submitted by a player who does not hold the turn
    OutOfTurn,
    /// Action not allowed in the current phase
    PhaseMismatch,
    /// Card not in hand
    CardNotInHand,
    /// Discard pile is empty
    EmptyDiscardPile,
    /// Stock pile is empty
    EmptyStock,
    /// Meld is not a valid set or run
    InvalidMeld,
    /// Meld references a card outside the hand
    MeldCardNotInHand,
    /// Card used in more than one meld
    MeldCardReused,
    /// Deadwood above the knock limit
    DeadwoodTooHigh,
    /// Gin declared with deadwood remaining
    NotGin,
    /// Lay-off does not extend the target meld
    InvalidLayOff,
    /// Card token could not be parsed
    ParseCard,
    /// Card id does not match `<suit>_<rank>`
    InvalidCardId,

    // Seating / lifecycle
    /// Player is not seated in the game
    PlayerNotSeated,
    /// Player already holds a seat
    AlreadySeated,
    /// Both seats are taken
    GameFull,
    /// Not every seated player is ready
    PlayersNotReady,
    /// Game already over
    GameOver,
    /// General validation error
    ValidationError,

    // Resource Not Found
    /// Game not found
    GameNotFound,
    /// Player not found
    PlayerNotFound,
    /// General not found error
    NotFound,

    // Conflicts
    /// Optimistic lock conflict (stale expected version)
    OptimisticLock,
    /// Game stream already exists
    GameExists,
    /// Generic conflict (fallback for unmatched conflicts)
    Conflict,

    // System Errors
    /// Event log unavailable
    EventLogUnavailable,
    /// Replay could not produce a consistent state
    ReplayFailed,
    /// Data corruption detected
    DataCorruption,
    /// Internal error
    Internal,
    /// AI failed to produce a move
    AiFailure,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OutOfTurn => "OUT_OF_TURN",
            Self::PhaseMismatch => "PHASE_MISMATCH",
            Self::CardNotInHand => "CARD_NOT_IN_HAND",
            Self::EmptyDiscardPile => "EMPTY_DISCARD_PILE",
            Self::EmptyStock => "EMPTY_STOCK",
            Self::InvalidMeld => "INVALID_MELD",
            Self::MeldCardNotInHand => "MELD_CARD_NOT_IN_HAND",
            Self::MeldCardReused => "MELD_CARD_REUSED",
            Self::DeadwoodTooHigh => "DEADWOOD_TOO_HIGH",
            Self::NotGin => "NOT_GIN",
            Self::InvalidLayOff => "INVALID_LAY_OFF",
            Self::ParseCard => "PARSE_CARD",
            Self::InvalidCardId => "INVALID_CARD_ID",

            Self::PlayerNotSeated => "PLAYER_NOT_SEATED",
            Self::AlreadySeated => "ALREADY_SEATED",
            Self::GameFull => "GAME_FULL",
            Self::PlayersNotReady => "PLAYERS_NOT_READY",
            Self::GameOver => "GAME_OVER",
            Self::ValidationError => "VALIDATION_ERROR",

            Self::GameNotFound => "GAME_NOT_FOUND",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::OptimisticLock => "OPTIMISTIC_LOCK",
            Self::GameExists => "GAME_EXISTS",
            Self::Conflict => "CONFLICT",

            Self::EventLogUnavailable => "EVENT_LOG_UNAVAILABLE",
            Self::ReplayFailed => "REPLAY_FAILED",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::Internal => "INTERNAL",
            Self::AiFailure => "AI_FAILURE",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl From<&ValidationKind> for ErrorCode {
    fn from(kind: &ValidationKind) -> Self {
        match kind {
            ValidationKind::OutOfTurn => Self::OutOfTurn,
            ValidationKind::PhaseMismatch => Self::PhaseMismatch,
            ValidationKind::CardNotInHand => Self::CardNotInHand,
            ValidationKind::EmptyDiscardPile => Self::EmptyDiscardPile,
            ValidationKind::EmptyStock => Self::EmptyStock,
            ValidationKind::InvalidMeld => Self::InvalidMeld,
            ValidationKind::MeldCardNotInHand => Self::MeldCardNotInHand,
            ValidationKind::MeldCardReused => Self::MeldCardReused,
            ValidationKind::DeadwoodTooHigh => Self::DeadwoodTooHigh,
            ValidationKind::NotGin => Self::NotGin,
            ValidationKind::InvalidLayOff => Self::InvalidLayOff,
            ValidationKind::ParseCard => Self::ParseCard,
            ValidationKind::InvalidCardId => Self::InvalidCardId,
            ValidationKind::PlayerNotSeated => Self::PlayerNotSeated,
            ValidationKind::AlreadySeated => Self::AlreadySeated,
            ValidationKind::GameFull => Self::GameFull,
            ValidationKind::PlayersNotReady => Self::PlayersNotReady,
            ValidationKind::GameOver => Self::GameOver,
            ValidationKind::Other(_) => Self::ValidationError,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
