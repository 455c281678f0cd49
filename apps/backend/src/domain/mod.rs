//! Domain layer: pure game logic types and helpers.

pub mod actions;
pub mod cards_logic;
pub mod cards_parsing;
pub mod cards_serde;
pub mod cards_types;
pub mod dealing;
pub mod events;
pub mod layoffs;
pub mod melds;
pub mod moves;
pub mod player_view;

pub mod game_transition;
pub mod replay;
pub mod rules;
pub mod scoring;
pub mod seed_derivation;
pub mod state;
#[cfg(test)]
mod test_state_helpers;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod test_prelude;
#[cfg(test)]
mod tests_melds;
#[cfg(test)]
mod tests_moves;
#[cfg(test)]
mod tests_props_conservation;
#[cfg(test)]
mod tests_props_melds;
#[cfg(test)]
mod tests_replay;
#[cfg(test)]
mod tests_scoring;

// Re-exports for ergonomics
pub use actions::{validate_action, game_created_event, game_finished_event};
pub use cards_logic::{card_value, hand_value, is_valid_run, is_valid_set};
pub use cards_parsing::parse_card_id;
pub use cards_types::{Card, Rank, Suit};
pub use dealing::{create_deck, deal_round, Deal};
pub use events::{EventPayload, EventType, GameEvent};
pub use melds::{calculate_deadwood, find_optimal_melds, Meld, MeldKind};
pub use moves::{validate_move, GameAction};
pub use player_view::VisibleGameState;
pub use replay::{replay, replay_from, ReplayError, StateSnapshot};
pub use seed_derivation::{derive_ai_seed, derive_dealing_seed};
pub use state::{GameId, GameState, GameStatus, Phase, PlayerId};
