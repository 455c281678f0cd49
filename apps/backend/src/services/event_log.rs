//! Append-only event log contract and its in-memory implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;

use crate::domain::events::GameEvent;
use crate::domain::state::GameId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventLogError {
    #[error("version conflict: expected {expected}, stream has {actual}")]
    Conflict { expected: i64, actual: i64 },
    #[error("event carries sequence {found}, log expected {expected}")]
    SequenceMismatch { expected: i64, found: i64 },
    #[error("{0}")]
    Unavailable(String),
}

/// Per-game append-only stream of events.
///
/// The version of a stream is the sequence number of its last event; an
/// unknown game has version 0.
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Append `events` as one unit if the stream is still at
    /// `expected_version`. Sequence numbers must continue the stream without
    /// gaps. Either every event is stored or none is.
    ///
    /// Returns the new version.
    async fn append_all(
        &self,
        game_id: GameId,
        expected_version: i64,
        events: Vec<GameEvent>,
    ) -> Result<i64, EventLogError>;

    /// Append a single event. Returns its sequence number.
    async fn append(
        &self,
        game_id: GameId,
        expected_version: i64,
        event: GameEvent,
    ) -> Result<i64, EventLogError> {
        self.append_all(game_id, expected_version, vec![event]).await
    }

    /// All events of the game, in stored order.
    async fn load(&self, game_id: GameId) -> Result<Vec<GameEvent>, EventLogError>;

    async fn current_version(&self, game_id: GameId) -> Result<i64, EventLogError>;
}

#[derive(Default)]
pub struct InMemoryEventLog {
    streams: RwLock<HashMap<GameId, Vec<GameEvent>>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `event` as-is, skipping version checks. Used to seed damaged
    /// or reordered streams.
    pub fn force_push(&self, game_id: GameId, event: GameEvent) {
        self.streams.write().entry(game_id).or_default().push(event);
    }

    pub fn game_ids(&self) -> Vec<GameId> {
        let mut ids: Vec<GameId> = self.streams.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

fn version_of(stream: &[GameEvent]) -> i64 {
    stream.iter().map(|e| e.sequence_number).max().unwrap_or(0)
}

#[async_trait]
impl EventLog for InMemoryEventLog {
    async fn append_all(
        &self,
        game_id: GameId,
        expected_version: i64,
        events: Vec<GameEvent>,
    ) -> Result<i64, EventLogError> {
        let mut streams = self.streams.write();
        let stream = streams.entry(game_id).or_default();
        let actual = version_of(stream);
        if actual != expected_version {
            return Err(EventLogError::Conflict {
                expected: expected_version,
                actual,
            });
        }
        let mut next = actual;
        for event in &events {
            if event.sequence_number != next + 1 {
                return Err(EventLogError::SequenceMismatch {
                    expected: next + 1,
                    found: event.sequence_number,
                });
            }
            next = event.sequence_number;
        }
        stream.extend(events);
        Ok(next)
    }

    async fn load(&self, game_id: GameId) -> Result<Vec<GameEvent>, EventLogError> {
        Ok(self
            .streams
            .read()
            .get(&game_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn current_version(&self, game_id: GameId) -> Result<i64, EventLogError> {
        Ok(self
            .streams
            .read()
            .get(&game_id)
            .map_or(0, |s| version_of(s)))
    }
}
