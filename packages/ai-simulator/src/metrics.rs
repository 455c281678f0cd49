//! Per-game metrics and the run summary.

use std::collections::BTreeMap;

use gin_backend::domain::state::{GameState, PlayerId, RoundOutcome};
use serde::Serialize;

use crate::simulator::{GameResult, PLAYER_ONE, PLAYER_TWO};

/// One JSON line per finished game.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMetrics {
    pub game: u32,
    pub seed: i64,
    pub winner: Option<PlayerId>,
    pub scores: BTreeMap<PlayerId, u32>,
    pub rounds: usize,
    pub knocks: u32,
    pub gins: u32,
    pub undercuts: u32,
    pub drawn: u32,
    pub steps: u32,
    pub duration_ms: f64,
}

pub fn build_game_metrics(game: u32, seed: i64, result: &GameResult, duration_ms: f64) -> GameMetrics {
    let state = &result.state;
    let mut metrics = GameMetrics {
        game,
        seed,
        winner: state.winner,
        scores: final_scores(state),
        rounds: state.round_scores.len(),
        knocks: 0,
        gins: 0,
        undercuts: 0,
        drawn: 0,
        steps: result.steps,
        duration_ms,
    };
    for round in &state.round_scores {
        match round.outcome {
            RoundOutcome::Knock => metrics.knocks += 1,
            RoundOutcome::Gin => metrics.gins += 1,
            RoundOutcome::Undercut => metrics.undercuts += 1,
            RoundOutcome::Drawn => metrics.drawn += 1,
        }
    }
    metrics
}

fn final_scores(state: &GameState) -> BTreeMap<PlayerId, u32> {
    state.players.iter().map(|p| (p.id, p.score)).collect()
}

/// Totals across a run.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub games: u32,
    pub errors: u32,
    pub wins: BTreeMap<PlayerId, u32>,
    pub average_score: BTreeMap<PlayerId, f64>,
    pub average_rounds: f64,
    pub knocks: u32,
    pub gins: u32,
    pub undercuts: u32,
    pub drawn: u32,
}

impl Summary {
    pub fn from_games(games: &[GameMetrics], errors: u32) -> Self {
        let mut summary = Summary {
            games: games.len() as u32,
            errors,
            ..Summary::default()
        };
        let mut totals: BTreeMap<PlayerId, u64> = BTreeMap::new();
        let mut rounds = 0usize;
        for id in [PLAYER_ONE, PLAYER_TWO] {
            summary.wins.insert(id, 0);
            totals.insert(id, 0);
        }
        for game in games {
            if let Some(winner) = game.winner {
                *summary.wins.entry(winner).or_default() += 1;
            }
            for (id, score) in &game.scores {
                *totals.entry(*id).or_default() += u64::from(*score);
            }
            rounds += game.rounds;
            summary.knocks += game.knocks;
            summary.gins += game.gins;
            summary.undercuts += game.undercuts;
            summary.drawn += game.drawn;
        }
        if !games.is_empty() {
            let n = games.len() as f64;
            summary.average_score = totals
                .into_iter()
                .map(|(id, total)| (id, total as f64 / n))
                .collect();
            summary.average_rounds = rounds as f64 / n;
        }
        summary
    }
}
