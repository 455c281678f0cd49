//! How to register your AI
//!
//! 1) Implement `AiPlayer` for your type in its module.
//! 2) Add a new `AiFactory` entry to the static list with stable `name` and `version`.
//! 3) Keep ordering stable; avoid side effects in constructors.
//! 4) Determinism: same seed ⇒ same behavior.

use super::config::AiConfig;
use super::heuristic::Heuristic;
use super::random::RandomPlayer;
use super::trait_def::AiPlayer;

/// Factory definition for constructing AI implementations.
pub struct AiFactory {
    pub name: &'static str,
    pub version: &'static str,
    /// Short lowercase name accepted on command lines.
    pub alias: &'static str,
    pub make: fn(config: &AiConfig) -> Box<dyn AiPlayer>,
}

static AI_FACTORIES: &[AiFactory] = &[
    AiFactory {
        name: Heuristic::NAME,
        version: Heuristic::VERSION,
        alias: "heuristic",
        make: make_heuristic,
    },
    AiFactory {
        name: RandomPlayer::NAME,
        version: RandomPlayer::VERSION,
        alias: "random",
        make: make_random_player,
    },
];

/// Returns the statically registered AI factories.
pub fn registered_ais() -> &'static [AiFactory] {
    AI_FACTORIES
}

/// Finds a registered AI factory by name or alias, ignoring ASCII case.
pub fn by_name(name: &str) -> Option<&'static AiFactory> {
    registered_ais().iter().find(|factory| {
        factory.name.eq_ignore_ascii_case(name) || factory.alias.eq_ignore_ascii_case(name)
    })
}

fn make_heuristic(config: &AiConfig) -> Box<dyn AiPlayer> {
    Box::new(Heuristic::from_config(config))
}

fn make_random_player(config: &AiConfig) -> Box<dyn AiPlayer> {
    Box::new(RandomPlayer::new(config.seed()))
}
