//! AI player module - handles automated game decisions.
//!
//! This module provides:
//! - AI trait for different AI implementations
//! - Heuristic: the default player, scaled by difficulty
//! - RandomPlayer: makes random legal moves (seedable for tests)
//! - A registry of named factories

pub mod config;
mod heuristic;
mod random;
pub mod registry;
mod thoughts;
mod trait_def;

pub use config::{AiConfig, Difficulty, DifficultyProfile};
pub use heuristic::{Heuristic, DEFAULT_DRAW_MARGIN};
pub use random::RandomPlayer;
pub use registry::{by_name, registered_ais, AiFactory};
pub use trait_def::{AiError, AiMove, AiPlayer};

/// Create an AI player from a name like `heuristic` or `heuristic:hard`.
///
/// The optional `:difficulty` suffix overrides `config.difficulty`.
/// Returns None if the name or difficulty is unrecognized.
pub fn create_ai(ai_name: &str, config: &AiConfig) -> Option<Box<dyn AiPlayer>> {
    let (name, difficulty) = match ai_name.split_once(':') {
        Some((name, level)) => {
            let level: Difficulty =
                serde_json::from_value(serde_json::Value::String(level.to_ascii_lowercase())).ok()?;
            (name, Some(level))
        }
        None => (ai_name, None),
    };
    let factory = by_name(name)?;
    let mut config = config.clone();
    if let Some(level) = difficulty {
        config.difficulty = level;
    }
    Some((factory.make)(&config))
}
