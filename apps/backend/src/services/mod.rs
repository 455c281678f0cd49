pub mod event_log;
pub mod game_flow;
pub mod snapshot_store;

pub use event_log::{EventLog, EventLogError, InMemoryEventLog};
pub use game_flow::{AiCoordinator, AiTurnOutcome, DriveSummary, LoadedGame, Submitted, TurnController};
pub use snapshot_store::{InMemorySnapshotStore, SnapshotStore};
