//! Scenario builders shared by the integration tests.

use std::sync::Arc;

use gin_backend::config::EngineConfig;
use gin_backend::domain::{GameAction, GameId, PlayerId, VisibleGameState};
use gin_backend::error::AppError;
use gin_backend::services::{InMemoryEventLog, InMemorySnapshotStore, Submitted, TurnController};

pub const ALICE: PlayerId = 1;
pub const BOB: PlayerId = 2;

pub fn controller() -> Arc<TurnController> {
    Arc::new(TurnController::in_memory(EngineConfig::default()))
}

/// Controller over caller-owned stores, so tests can inspect or damage them.
pub fn controller_with(
    config: EngineConfig,
    log: Arc<InMemoryEventLog>,
    snapshots: Arc<InMemorySnapshotStore>,
) -> Arc<TurnController> {
    Arc::new(TurnController::new(log, config).with_snapshots(snapshots))
}

/// Created and joined, nobody ready yet.
pub async fn lobby(controller: &TurnController, game_id: GameId, seed: i64) -> Result<Submitted, AppError> {
    controller.create_game(game_id, ALICE, "alice", seed).await?;
    controller.join_game(game_id, BOB, "bob").await
}

/// Started through the controller; the non-dealer holds the upcard option.
pub async fn started_game(
    controller: &TurnController,
    game_id: GameId,
    seed: i64,
) -> Result<Submitted, AppError> {
    lobby(controller, game_id, seed).await?;
    controller.mark_ready(game_id, ALICE).await?;
    controller.mark_ready(game_id, BOB).await?;
    controller
        .submit_current(game_id, ALICE, GameAction::StartGame)
        .await
}

/// The seat due to act and its view.
pub async fn current_view(
    controller: &TurnController,
    game_id: GameId,
) -> Result<VisibleGameState, AppError> {
    let state = controller.load_state(game_id).await?.state;
    let player = state.current_player_id.unwrap_or(ALICE);
    controller.view_for(game_id, player).await
}

/// Submit the first legal action of whoever is due. Returns `None` when no
/// one has anything to do.
pub async fn play_first_legal(
    controller: &TurnController,
    game_id: GameId,
) -> Result<Option<Submitted>, AppError> {
    let view = current_view(controller, game_id).await?;
    let Some(action) = view.legal_actions().into_iter().next() else {
        return Ok(None);
    };
    controller
        .submit(game_id, view.viewer_id, action, view.version)
        .await
        .map(Some)
}
