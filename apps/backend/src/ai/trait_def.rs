//! AI player trait definition.

use std::fmt;

use crate::domain::moves::GameAction;
use crate::domain::player_view::VisibleGameState;

/// Errors that can occur during AI decision-making.
#[derive(Debug)]
pub enum AiError {
    /// AI failed to make a decision within timeout
    Timeout,
    /// AI encountered an internal error
    Internal(String),
    /// AI produced, or could only produce, an invalid move
    InvalidMove(String),
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiError::Timeout => write!(f, "AI decision timeout"),
            AiError::Internal(msg) => write!(f, "AI internal error: {msg}"),
            AiError::InvalidMove(msg) => write!(f, "AI invalid move: {msg}"),
        }
    }
}

impl std::error::Error for AiError {}

/// A chosen action plus display-only commentary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiMove {
    pub action: GameAction,
    /// Cosmetic; never derived from the numbers behind `action`.
    pub thoughts: Vec<String>,
}

impl AiMove {
    pub fn silent(action: GameAction) -> Self {
        Self {
            action,
            thoughts: Vec::new(),
        }
    }
}

/// Trait for AI players.
///
/// Implementations receive the game state visible to their seat and must
/// choose one action. Moves are submitted through the turn controller like
/// any human move, so an illegal choice is rejected, not applied.
pub trait AiPlayer: Send + Sync {
    /// Choose the next action for `view.viewer_id`.
    ///
    /// Query `view.legal_actions()` for the options the engine accepts.
    fn choose_action(&self, view: &VisibleGameState) -> Result<AiMove, AiError>;
}
