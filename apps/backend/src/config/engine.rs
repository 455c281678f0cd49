use std::env;
use std::str::FromStr;

use crate::error::AppError;

pub const DEFAULT_SNAPSHOT_INTERVAL: i64 = 20;
pub const DEFAULT_AI_MAX_RETRIES: u32 = 3;
/// A two-AI game to 100 takes a few hundred actions; this leaves headroom
/// for long runs of drawn rounds.
pub const DEFAULT_AI_MAX_STEPS: u32 = 10_000;
pub const DEFAULT_AI_DRAW_MARGIN: u32 = 5;

/// Tunables for the turn controller and the AI coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Save a snapshot when the stream version reaches a multiple of this.
    /// Zero disables snapshots.
    pub snapshot_interval: i64,
    /// Retries after a version conflict for one AI action.
    pub ai_max_retries: u32,
    /// Upper bound on consecutive AI actions driven for one game.
    pub ai_max_steps: u32,
    /// Deadwood a heuristic AI must save to take a discard.
    pub ai_draw_margin: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snapshot_interval: DEFAULT_SNAPSHOT_INTERVAL,
            ai_max_retries: DEFAULT_AI_MAX_RETRIES,
            ai_max_steps: DEFAULT_AI_MAX_STEPS,
            ai_draw_margin: DEFAULT_AI_DRAW_MARGIN,
        }
    }
}

impl EngineConfig {
    /// Read `GIN_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let snapshot_interval = parse_var(&lookup, "GIN_SNAPSHOT_INTERVAL", DEFAULT_SNAPSHOT_INTERVAL)?;
        if snapshot_interval < 0 {
            return Err(AppError::config(format!(
                "GIN_SNAPSHOT_INTERVAL must not be negative, got {snapshot_interval}"
            )));
        }
        Ok(Self {
            snapshot_interval,
            ai_max_retries: parse_var(&lookup, "GIN_AI_MAX_RETRIES", DEFAULT_AI_MAX_RETRIES)?,
            ai_max_steps: parse_var(&lookup, "GIN_AI_MAX_STEPS", DEFAULT_AI_MAX_STEPS)?,
            ai_draw_margin: parse_var(&lookup, "GIN_AI_DRAW_MARGIN", DEFAULT_AI_DRAW_MARGIN)?,
        })
    }

    pub fn should_snapshot(&self, version: i64) -> bool {
        self.snapshot_interval > 0 && version > 0 && version % self.snapshot_interval == 0
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|e| {
            AppError::config(format!("Invalid value '{raw}' for {name}: {e}"))
        }),
    }
}
