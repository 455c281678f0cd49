//! Turn controller - the single writer of each game's event stream.
//!
//! Every mutation, human or AI, goes through [`TurnController::submit`]:
//! version check, fresh replay, validation, append. Submissions for one game
//! are serialized by a per-game async mutex; different games never contend.

mod ai_coordinator;
mod mutation;
mod orchestration;
pub mod seats;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

pub use ai_coordinator::{AiCoordinator, AiTurnOutcome, DriveSummary};
pub use mutation::Submitted;
pub use orchestration::LoadedGame;

use crate::config::EngineConfig;
use crate::domain::state::GameId;
use crate::services::event_log::{EventLog, InMemoryEventLog};
use crate::services::snapshot_store::{InMemorySnapshotStore, SnapshotStore};

pub struct TurnController {
    log: Arc<dyn EventLog>,
    snapshots: Option<Arc<dyn SnapshotStore>>,
    locks: DashMap<GameId, Arc<Mutex<()>>>,
    config: EngineConfig,
}

impl TurnController {
    pub fn new(log: Arc<dyn EventLog>, config: EngineConfig) -> Self {
        Self {
            log,
            snapshots: None,
            locks: DashMap::new(),
            config,
        }
    }

    pub fn with_snapshots(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.snapshots = Some(store);
        self
    }

    /// In-memory log and snapshot store.
    pub fn in_memory(config: EngineConfig) -> Self {
        Self::new(Arc::new(InMemoryEventLog::new()), config)
            .with_snapshots(Arc::new(InMemorySnapshotStore::new()))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn event_log(&self) -> &Arc<dyn EventLog> {
        &self.log
    }

    fn game_lock(&self, game_id: GameId) -> Arc<Mutex<()>> {
        self.locks.entry(game_id).or_default().value().clone()
    }

    /// Forget a finished game's lock. Late submissions get a fresh lock and
    /// are rejected by validation.
    fn release_lock(&self, game_id: GameId) {
        self.locks.remove(&game_id);
    }
}
