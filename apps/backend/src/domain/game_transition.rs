// apps/backend/src/domain/game_transition.rs

use crate::domain::state::{GameState, GameStatus, Phase, PlayerId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLifecycleView {
    pub version: i64,
    pub turn: Option<PlayerId>,
    pub status: GameStatus,
    pub phase: Phase,
    pub round_number: u32,
    pub seated: Vec<PlayerId>,
}

impl GameLifecycleView {
    pub fn of(state: &GameState) -> Self {
        Self {
            version: state.version,
            turn: state.current_player_id,
            status: state.status,
            phase: state.phase,
            round_number: state.round_number,
            seated: state.players.iter().map(|p| p.id).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameTransition {
    /// Edge-triggered: the turn became a specific player.
    TurnBecame { player_id: PlayerId },

    /// Edge-triggered: Waiting -> Active
    GameStarted,

    /// Edge-triggered: a round finished scoring (or was drawn).
    RoundEnded { round_number: u32 },

    /// Edge-triggered: phase reached GameOver
    GameEnded,

    /// Explicit: player took a seat
    PlayerJoined { player_id: PlayerId },
}

fn round_closed(phase: Phase) -> bool {
    matches!(phase, Phase::RoundOver | Phase::GameOver)
}

/// Derive domain transitions from before/after lifecycle state.
pub fn derive_game_transitions(
    before: &GameLifecycleView,
    after: &GameLifecycleView,
) -> Vec<GameTransition> {
    let mut transitions = Vec::new();

    for id in &after.seated {
        if !before.seated.contains(id) {
            transitions.push(GameTransition::PlayerJoined { player_id: *id });
        }
    }

    if before.status == GameStatus::Waiting && after.status == GameStatus::Active {
        transitions.push(GameTransition::GameStarted);
    }

    if let Some(player_id) = after.turn {
        if before.turn != Some(player_id) && !round_closed(after.phase) {
            transitions.push(GameTransition::TurnBecame { player_id });
        }
    }

    if !round_closed(before.phase) && round_closed(after.phase) {
        transitions.push(GameTransition::RoundEnded {
            round_number: after.round_number,
        });
    }

    if before.phase != Phase::GameOver && after.phase == Phase::GameOver {
        transitions.push(GameTransition::GameEnded);
    }

    transitions
}
