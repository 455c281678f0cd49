//! Runs one game from lobby to `GAME_FINISHED` through the turn controller.

use std::sync::Arc;

use gin_backend::ai::AiConfig;
use gin_backend::config::EngineConfig;
use gin_backend::domain::seed_derivation::derive_ai_seed;
use gin_backend::domain::state::{GameId, GameState, PlayerId};
use gin_backend::error::AppError;
use gin_backend::errors::ErrorCode;
use gin_backend::services::{AiCoordinator, AiTurnOutcome, TurnController};
use tracing::debug;

pub const PLAYER_ONE: PlayerId = 1;
pub const PLAYER_TWO: PlayerId = 2;

/// Final state of a simulated game plus how many AI steps it took.
pub struct GameResult {
    pub state: GameState,
    pub steps: u32,
}

pub struct Simulator {
    controller: Arc<TurnController>,
    p1: String,
    p2: String,
}

impl Simulator {
    pub fn new(config: EngineConfig, p1: &str, p2: &str) -> Self {
        Self {
            controller: Arc::new(TurnController::in_memory(config)),
            p1: p1.to_string(),
            p2: p2.to_string(),
        }
    }

    /// Play game `game_id` with the deal derived from `seed`. AI seeds are
    /// derived from the same seed, so a rerun reproduces the game.
    pub async fn simulate_game(&self, game_id: GameId, seed: i64) -> Result<GameResult, AppError> {
        self.controller
            .create_game(game_id, PLAYER_ONE, "player1", seed)
            .await?;
        self.controller
            .join_game(game_id, PLAYER_TWO, "player2")
            .await?;

        let coordinator = AiCoordinator::new(Arc::clone(&self.controller));
        coordinator.register_named(
            game_id,
            PLAYER_ONE,
            &self.p1,
            AiConfig::with_seed(derive_ai_seed(seed, 0)),
        )?;
        coordinator.register_named(
            game_id,
            PLAYER_TWO,
            &self.p2,
            AiConfig::with_seed(derive_ai_seed(seed, 1)),
        )?;

        let summary = coordinator.drive(game_id).await?;
        debug!(game_id, steps = summary.steps, last = ?summary.last, "Drive finished");
        if summary.last != AiTurnOutcome::GameOver {
            return Err(AppError::internal(
                ErrorCode::AiFailure,
                format!("Game {game_id} stopped before finishing: {:?}", summary.last),
            ));
        }

        let state = self.controller.load_state(game_id).await?.state;
        Ok(GameResult {
            state,
            steps: summary.steps,
        })
    }
}
