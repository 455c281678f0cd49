//! Random AI player - makes random legal moves.
//!
//! [`RandomPlayer`] is the baseline implementation of the
//! [`AiPlayer`](super::AiPlayer) trait: it picks uniformly among
//! `legal_actions()` and is seedable for tests.

use std::sync::Mutex;

use rand::prelude::*;

use super::trait_def::{AiError, AiMove, AiPlayer};
use crate::domain::player_view::VisibleGameState;

/// AI that makes random legal moves.
///
/// # Usage
///
/// ```rust,ignore
/// use gin_backend::ai::RandomPlayer;
///
/// // Non-deterministic (uses system entropy)
/// let random_ai = RandomPlayer::new(None);
///
/// // Deterministic (uses seed for reproducible behavior)
/// let seeded_ai = RandomPlayer::new(Some(12345));
/// ```
pub struct RandomPlayer {
    /// `AiPlayer` methods take `&self`; the RNG needs mutable access.
    rng: Mutex<StdRng>,
}

impl RandomPlayer {
    pub const NAME: &'static str = "RandomPlayer";
    pub const VERSION: &'static str = "1.0.0";

    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl AiPlayer for RandomPlayer {
    fn choose_action(&self, view: &VisibleGameState) -> Result<AiMove, AiError> {
        let legal = view.legal_actions();
        if legal.is_empty() {
            return Err(AiError::InvalidMove(format!(
                "No legal actions during {:?}",
                view.phase
            )));
        }

        let mut rng = self
            .rng
            .lock()
            .map_err(|e| AiError::Internal(format!("RNG lock poisoned: {e}")))?;

        let action = legal
            .choose(&mut *rng)
            .cloned()
            .ok_or_else(|| AiError::Internal("Failed to choose random action".into()))?;

        Ok(AiMove::silent(action))
    }
}
