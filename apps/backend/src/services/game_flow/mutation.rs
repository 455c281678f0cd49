use time::OffsetDateTime;
use tracing::{debug, info, warn};

use super::TurnController;
use crate::domain::actions::{game_finished_event, validate_action};
use crate::domain::events::GameEvent;
use crate::domain::game_transition::{derive_game_transitions, GameLifecycleView, GameTransition};
use crate::domain::moves::GameAction;
use crate::domain::replay::{apply_event, check_card_conservation, StateSnapshot};
use crate::domain::state::{GameId, GameState, GameStatus, PlayerId};
use crate::error::AppError;
use crate::errors::ErrorCode;

/// Result of an accepted submission.
#[derive(Debug, Clone)]
pub struct Submitted {
    /// The action's event, followed by `GAME_FINISHED` when the action
    /// ended the game.
    pub events: Vec<GameEvent>,
    pub state: GameState,
    pub old_version: i64,
    pub transitions: Vec<GameTransition>,
}

impl Submitted {
    pub fn final_version(&self) -> i64 {
        self.state.version
    }
}

impl TurnController {
    /// Validate `action` against freshly replayed state and append its event.
    ///
    /// Fails with a conflict when `expected_version` is stale and with a
    /// validation error when the move is illegal. Nothing is appended in
    /// either case.
    pub async fn submit(
        &self,
        game_id: GameId,
        actor: PlayerId,
        action: GameAction,
        expected_version: i64,
    ) -> Result<Submitted, AppError> {
        let lock = self.game_lock(game_id);
        let _guard = lock.lock().await;

        let current = self.log.current_version(game_id).await?;
        if current != expected_version {
            debug!(
                game_id,
                player_id = actor,
                expected_version,
                current_version = current,
                "Rejected stale submission"
            );
            return Err(AppError::conflict(
                ErrorCode::OptimisticLock,
                format!(
                    "Game version mismatch: expected {expected_version}, but stream has version {current}"
                ),
            ));
        }

        let loaded = self.load_state(game_id).await?;
        let mut state = loaded.state;
        let before = GameLifecycleView::of(&state);
        let now = OffsetDateTime::now_utc();

        let event = validate_action(&state, actor, &action, now)?;
        let mut events = vec![event];
        fold_checked(&mut state, &events[0])?;

        if let Some(finished) = game_finished_event(&state, now) {
            fold_checked(&mut state, &finished)?;
            events.push(finished);
        }

        let version = self
            .log
            .append_all(game_id, expected_version, events.clone())
            .await?;

        debug!(
            game_id,
            player_id = actor,
            action = action.name(),
            version,
            "Action accepted"
        );
        if state.status == GameStatus::Finished {
            info!(game_id, winner = ?state.winner, version, "Game finished");
            self.release_lock(game_id);
        }

        self.maybe_snapshot(game_id, expected_version, &state).await;

        let after = GameLifecycleView::of(&state);
        Ok(Submitted {
            transitions: derive_game_transitions(&before, &after),
            events,
            state,
            old_version: expected_version,
        })
    }

    /// Save a snapshot if the stream crossed a multiple of the interval.
    /// Snapshots are an optimization; failures are logged, not returned.
    async fn maybe_snapshot(&self, game_id: GameId, old_version: i64, state: &GameState) {
        let Some(store) = &self.snapshots else {
            return;
        };
        let crossed = ((old_version + 1)..=state.version).any(|v| self.config.should_snapshot(v));
        if !crossed {
            return;
        }
        let snapshot = StateSnapshot {
            state: state.clone(),
            sequence_number: state.version,
        };
        match store.save(game_id, snapshot).await {
            Ok(()) => debug!(game_id, sequence_number = state.version, "Saved snapshot"),
            Err(err) => warn!(game_id, error = %err, "Failed to save snapshot"),
        }
    }
}

/// Fold a freshly validated event. Failure here means the decision and fold
/// layers disagree, so nothing is appended.
pub(super) fn fold_checked(state: &mut GameState, event: &GameEvent) -> Result<(), AppError> {
    apply_event(state, event).map_err(|err| {
        AppError::internal(
            ErrorCode::Internal,
            format!(
                "Validated {} event failed to fold: {err}",
                event.event_type()
            ),
        )
    })?;
    if state.status != GameStatus::Waiting {
        check_card_conservation(state).map_err(|detail| AppError::DataCorruption {
            detail: format!("After sequence {}: {detail}", event.sequence_number),
        })?;
    }
    Ok(())
}
