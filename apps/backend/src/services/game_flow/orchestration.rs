use tracing::{error, warn};

use super::TurnController;
use crate::domain::player_view::VisibleGameState;
use crate::domain::replay::replay_from;
use crate::domain::state::{GameId, GameState, PlayerId};
use crate::error::AppError;
use crate::errors::domain::{DomainError, NotFoundKind};

/// A freshly folded game.
#[derive(Debug, Clone)]
pub struct LoadedGame {
    pub state: GameState,
    /// Events that failed to fold and were skipped.
    pub skipped: usize,
    pub recovered_sequence: bool,
    /// Sequence number of the snapshot the fold started from.
    pub snapshot_sequence: Option<i64>,
}

impl TurnController {
    /// Fold the game's stream, starting from the latest usable snapshot.
    ///
    /// Replay failures abort the load; no partially folded state is
    /// returned.
    pub async fn load_state(&self, game_id: GameId) -> Result<LoadedGame, AppError> {
        let events = self.log.load(game_id).await?;
        if events.is_empty() {
            return Err(DomainError::not_found(
                NotFoundKind::Game,
                format!("Game {game_id} not found"),
            )
            .into());
        }

        let last = events.iter().map(|e| e.sequence_number).max().unwrap_or(0);
        let snapshot = match &self.snapshots {
            Some(store) => store.load_latest(game_id).await?,
            None => None,
        }
        .filter(|s| s.sequence_number <= last);

        let outcome = replay_from(snapshot.as_ref(), &events).map_err(|err| {
            error!(game_id, error = %err, "Replay failed");
            AppError::from(err)
        })?;

        if !outcome.skipped.is_empty() {
            warn!(
                game_id,
                skipped = outcome.skipped.len(),
                version = outcome.state.version,
                "Game loaded with skipped events"
            );
        }

        Ok(LoadedGame {
            state: outcome.state,
            skipped: outcome.skipped.len(),
            recovered_sequence: outcome.recovered_sequence,
            snapshot_sequence: snapshot.map(|s| s.sequence_number),
        })
    }

    /// What `player` may see of the game right now.
    pub async fn view_for(
        &self,
        game_id: GameId,
        player: PlayerId,
    ) -> Result<VisibleGameState, AppError> {
        let loaded = self.load_state(game_id).await?;
        Ok(VisibleGameState::for_player(&loaded.state, player)?)
    }

    pub async fn current_version(&self, game_id: GameId) -> Result<i64, AppError> {
        Ok(self.log.current_version(game_id).await?)
    }
}
