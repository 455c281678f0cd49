//! Game creation and lobby helpers.

use time::OffsetDateTime;
use tracing::info;

use super::mutation::fold_checked;
use super::{Submitted, TurnController};
use crate::domain::actions::game_created_event;
use crate::domain::game_transition::{derive_game_transitions, GameLifecycleView};
use crate::domain::moves::GameAction;
use crate::domain::state::{GameId, GameState, PlayerId};
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError};

impl TurnController {
    /// Open a new stream with `GAME_CREATED`, seating the creator.
    pub async fn create_game(
        &self,
        game_id: GameId,
        creator: PlayerId,
        username: &str,
        seed: i64,
    ) -> Result<Submitted, AppError> {
        let lock = self.game_lock(game_id);
        let _guard = lock.lock().await;

        if self.log.current_version(game_id).await? != 0 {
            return Err(DomainError::conflict(
                ConflictKind::GameExists,
                format!("Game {game_id} already exists"),
            )
            .into());
        }

        let mut state = GameState::new(game_id);
        let before = GameLifecycleView::of(&state);
        let event = game_created_event(game_id, creator, username, seed, OffsetDateTime::now_utc());
        fold_checked(&mut state, &event)?;
        self.log.append(game_id, 0, event.clone()).await?;

        info!(game_id, player_id = creator, seed, "Game created");

        let after = GameLifecycleView::of(&state);
        Ok(Submitted {
            transitions: derive_game_transitions(&before, &after),
            events: vec![event],
            state,
            old_version: 0,
        })
    }

    /// Submit at the current version. For lobby actions, which carry no
    /// version from the caller.
    pub async fn submit_current(
        &self,
        game_id: GameId,
        actor: PlayerId,
        action: GameAction,
    ) -> Result<Submitted, AppError> {
        let version = self.current_version(game_id).await?;
        self.submit(game_id, actor, action, version).await
    }

    pub async fn join_game(
        &self,
        game_id: GameId,
        player: PlayerId,
        username: &str,
    ) -> Result<Submitted, AppError> {
        self.submit_current(
            game_id,
            player,
            GameAction::Join {
                username: username.to_string(),
            },
        )
        .await
    }

    pub async fn mark_ready(&self, game_id: GameId, player: PlayerId) -> Result<Submitted, AppError> {
        self.submit_current(game_id, player, GameAction::SetReady).await
    }
}
