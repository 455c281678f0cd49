//! Optional snapshot store: folded state at a known sequence number.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::replay::StateSnapshot;
use crate::domain::state::GameId;
use crate::services::event_log::EventLogError;

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load_latest(&self, game_id: GameId) -> Result<Option<StateSnapshot>, EventLogError>;

    async fn save(&self, game_id: GameId, snapshot: StateSnapshot) -> Result<(), EventLogError>;
}

/// Keeps the newest snapshot per game.
#[derive(Default)]
pub struct InMemorySnapshotStore {
    latest: DashMap<GameId, StateSnapshot>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn load_latest(&self, game_id: GameId) -> Result<Option<StateSnapshot>, EventLogError> {
        Ok(self.latest.get(&game_id).map(|s| s.value().clone()))
    }

    async fn save(&self, game_id: GameId, snapshot: StateSnapshot) -> Result<(), EventLogError> {
        match self.latest.entry(game_id) {
            Entry::Occupied(mut existing) => {
                if existing.get().sequence_number < snapshot.sequence_number {
                    existing.insert(snapshot);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(snapshot);
            }
        }
        Ok(())
    }
}
