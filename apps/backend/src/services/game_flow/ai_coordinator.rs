//! Drives AI seats through the turn controller.
//!
//! AI moves get no bypass: each one is submitted at the version the AI saw,
//! so a stale choice is rejected as a conflict and re-decided on fresh state.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, error, info, warn};

use super::{Submitted, TurnController};
use crate::ai::{create_ai, AiConfig, AiPlayer};
use crate::domain::player_view::VisibleGameState;
use crate::domain::state::{GameId, GameState, Phase, PlayerId};
use crate::error::AppError;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::errors::ErrorCode;

/// What one call to [`AiCoordinator::run_ai_turn`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiTurnOutcome {
    Acted {
        player_id: PlayerId,
        action: &'static str,
        version: i64,
    },
    /// No registered AI seat has anything to do.
    NotAiTurn,
    /// Another request for this game is still being processed.
    AlreadyInFlight,
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveSummary {
    pub steps: u32,
    pub last: AiTurnOutcome,
}

pub struct AiCoordinator {
    controller: Arc<TurnController>,
    seats: DashMap<(GameId, PlayerId), Arc<dyn AiPlayer>>,
    in_flight: DashMap<GameId, ()>,
}

/// Holds a game's in-flight slot; released on drop.
struct InFlight<'a> {
    map: &'a DashMap<GameId, ()>,
    game_id: GameId,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.map.remove(&self.game_id);
    }
}

impl AiCoordinator {
    pub fn new(controller: Arc<TurnController>) -> Self {
        Self {
            controller,
            seats: DashMap::new(),
            in_flight: DashMap::new(),
        }
    }

    pub fn controller(&self) -> &Arc<TurnController> {
        &self.controller
    }

    /// Let `ai` play `player_id` in `game_id`.
    pub fn register_ai(&self, game_id: GameId, player_id: PlayerId, ai: Box<dyn AiPlayer>) {
        self.seats.insert((game_id, player_id), Arc::from(ai));
    }

    /// Register a registry AI such as `heuristic:hard`. The engine's draw
    /// margin applies unless `config` sets its own.
    pub fn register_named(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        ai_name: &str,
        config: AiConfig,
    ) -> Result<(), AppError> {
        let config = config.with_default_draw_margin(self.controller.config().ai_draw_margin);
        let ai = create_ai(ai_name, &config).ok_or_else(|| {
            DomainError::validation(
                ValidationKind::Other("UNKNOWN_AI".into()),
                format!("No AI registered as '{ai_name}'"),
            )
        })?;
        self.register_ai(game_id, player_id, ai);
        Ok(())
    }

    pub fn is_ai(&self, game_id: GameId, player_id: PlayerId) -> bool {
        self.seats.contains_key(&(game_id, player_id))
    }

    fn claim(&self, game_id: GameId) -> Option<InFlight<'_>> {
        match self.in_flight.entry(game_id) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(());
                Some(InFlight {
                    map: &self.in_flight,
                    game_id,
                })
            }
        }
    }

    /// The first AI seat with something to do, and its view.
    fn pending_ai(
        &self,
        state: &GameState,
    ) -> Result<Option<(PlayerId, Arc<dyn AiPlayer>, VisibleGameState)>, AppError> {
        for player in &state.players {
            let Some(ai) = self
                .seats
                .get(&(state.id, player.id))
                .map(|entry| Arc::clone(entry.value()))
            else {
                continue;
            };
            let view = VisibleGameState::for_player(state, player.id)?;
            if !view.legal_actions().is_empty() {
                return Ok(Some((player.id, ai, view)));
            }
        }
        Ok(None)
    }

    /// Make one AI move for `game_id`, if an AI seat is due.
    ///
    /// A concurrent request for the same game is a no-op. Version conflicts
    /// are retried up to `GIN_AI_MAX_RETRIES` times on fresh state; replay
    /// failures and rejected moves abort.
    pub async fn run_ai_turn(&self, game_id: GameId) -> Result<AiTurnOutcome, AppError> {
        let Some(_slot) = self.claim(game_id) else {
            debug!(game_id, "AI request already in flight");
            return Ok(AiTurnOutcome::AlreadyInFlight);
        };

        let max_retries = self.controller.config().ai_max_retries;
        let mut attempt = 0;
        loop {
            let loaded = self.controller.load_state(game_id).await?;
            if loaded.state.phase == Phase::GameOver {
                return Ok(AiTurnOutcome::GameOver);
            }
            let Some((player_id, ai, view)) = self.pending_ai(&loaded.state)? else {
                return Ok(AiTurnOutcome::NotAiTurn);
            };

            let chosen = ai.choose_action(&view)?;
            debug!(
                game_id,
                player_id,
                action = chosen.action.name(),
                version = view.version,
                "AI decided"
            );
            let action_name = chosen.action.name();

            match self
                .controller
                .submit(game_id, player_id, chosen.action, view.version)
                .await
            {
                Ok(Submitted { state, .. }) => {
                    return Ok(AiTurnOutcome::Acted {
                        player_id,
                        action: action_name,
                        version: state.version,
                    });
                }
                Err(err) if err.is_conflict() && attempt < max_retries => {
                    attempt += 1;
                    debug!(game_id, player_id, attempt, "AI move hit a version conflict, retrying");
                }
                Err(err) => {
                    if matches!(err, AppError::Replay(_)) {
                        error!(game_id, player_id, error = %err, "Aborting AI move after replay failure");
                    } else {
                        warn!(game_id, player_id, error = %err, "AI move failed");
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Run AI moves until a human must act, the game ends, or the step
    /// limit is reached.
    pub async fn drive(&self, game_id: GameId) -> Result<DriveSummary, AppError> {
        let max_steps = self.controller.config().ai_max_steps;
        let mut steps = 0;
        loop {
            if steps >= max_steps {
                warn!(game_id, steps, "AI step limit reached");
                return Err(AppError::internal(
                    ErrorCode::AiFailure,
                    format!("AI did not settle game {game_id} within {max_steps} steps"),
                ));
            }
            match self.run_ai_turn(game_id).await? {
                AiTurnOutcome::Acted { .. } => steps += 1,
                last => {
                    if last == AiTurnOutcome::GameOver {
                        info!(game_id, steps, "AI drive reached game over");
                    }
                    return Ok(DriveSummary { steps, last });
                }
            }
        }
    }
}
