//! Backend test support utilities
//!
//! Shared by the engine's unit and integration tests. Provides logging
//! initialization, proptest settings and collision-free game ids.

pub mod logging;
pub mod proptest_config;
pub mod unique_helpers;

pub use proptest_config::proptest_config;
