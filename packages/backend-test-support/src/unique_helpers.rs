//! Test helpers for generating unique identifiers
//!
//! Integration tests share one process and, with a shared event log, one
//! id space. These helpers hand out ids that never collide within a run and
//! are unlikely to collide across runs.

use std::sync::atomic::{AtomicI64, Ordering};

use once_cell::sync::Lazy;
use rand::Rng;

static NEXT_ID: Lazy<AtomicI64> =
    Lazy::new(|| AtomicI64::new(rand::rng().random_range(1_000_000..1_000_000_000)));

/// A positive id not returned before in this process.
///
/// # Examples
/// ```
/// use backend_test_support::unique_helpers::unique_id;
///
/// let a = unique_id();
/// let b = unique_id();
/// assert_ne!(a, b);
/// assert!(a > 0);
/// ```
pub fn unique_id() -> i64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// A unique username with the given prefix, in the form `{prefix}-{id}`.
///
/// # Examples
/// ```
/// use backend_test_support::unique_helpers::unique_username;
///
/// let name = unique_username("bot");
/// assert!(name.starts_with("bot-"));
/// ```
pub fn unique_username(prefix: &str) -> String {
    format!("{}-{}", prefix, unique_id())
}
