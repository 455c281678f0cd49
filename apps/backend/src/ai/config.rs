//! AI configuration handling.
//!
//! Provides a typed interface for AI configuration, extracting standard
//! fields from a JSON config while preserving AI-specific custom fields.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Skill level of an AI seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Knobs a difficulty level maps to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    /// Probability of replacing the heuristic choice with a weak move.
    pub suboptimal_move_chance: f64,
    /// Highest deadwood the AI is willing to knock with.
    pub knock_threshold: u32,
    /// Probability of discarding a random unmelded card instead of the
    /// lowest keep value.
    pub discard_randomness: f64,
    /// Smallest total lay-off value worth laying off.
    pub layoff_threshold: u32,
}

impl Difficulty {
    pub fn profile(self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                suboptimal_move_chance: 0.3,
                knock_threshold: 10,
                discard_randomness: 0.2,
                layoff_threshold: 5,
            },
            Difficulty::Medium => DifficultyProfile {
                suboptimal_move_chance: 0.15,
                knock_threshold: 8,
                discard_randomness: 0.1,
                layoff_threshold: 8,
            },
            Difficulty::Hard => DifficultyProfile {
                suboptimal_move_chance: 0.05,
                knock_threshold: 4,
                discard_randomness: 0.0,
                layoff_threshold: 10,
            },
        }
    }
}

/// Standard configuration for AI players.
///
/// # Standard Fields
///
/// - `seed`: Optional RNG seed for deterministic behavior. Seeded AIs make
///   the same choices for the same views, which tests and the simulator
///   rely on.
/// - `difficulty`: `easy`, `medium` (default) or `hard`.
///
/// # Example JSON Config
///
/// ```json
/// {"seed": 12345, "difficulty": "hard", "drawMargin": 3}
/// ```
///
/// Unknown fields land in `custom`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    #[serde(default)]
    pub difficulty: Difficulty,

    /// AI-specific configuration.
    #[serde(flatten)]
    pub custom: JsonValue,
}

impl AiConfig {
    /// Create an AiConfig from an optional JSON value.
    ///
    /// Malformed input yields the empty config.
    pub fn from_json(config: Option<&JsonValue>) -> Self {
        config
            .and_then(|json| serde_json::from_value(json.clone()).ok())
            .unwrap_or_default()
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Get a custom configuration field by key.
    pub fn get_custom(&self, key: &str) -> Option<&JsonValue> {
        self.custom.get(key)
    }

    pub fn empty() -> Self {
        Self {
            seed: None,
            difficulty: Difficulty::default(),
            custom: JsonValue::Object(serde_json::Map::new()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::empty()
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Set `drawMargin` unless the config already carries one.
    pub fn with_default_draw_margin(mut self, margin: u32) -> Self {
        if self.get_custom("drawMargin").is_none() {
            if !self.custom.is_object() {
                self.custom = JsonValue::Object(serde_json::Map::new());
            }
            if let Some(map) = self.custom.as_object_mut() {
                map.insert("drawMargin".into(), JsonValue::from(margin));
            }
        }
        self
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::empty()
    }
}
