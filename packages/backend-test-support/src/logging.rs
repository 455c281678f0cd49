//! Unified test logging initialization
//!
//! One subscriber per test binary, installed lazily from a `ctor` hook in
//! each binary (or by hand). Replay diagnostics such as skipped events show
//! up here when the level allows it.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Initialize structured logging for tests.
///
/// Idempotent and race-safe. The level is read in this order of precedence:
///
/// 1. `TEST_LOG` environment variable (preferred)
/// 2. `RUST_LOG` environment variable (fallback)
/// 3. `"warn"` (default, quiet)
///
/// Output goes through `with_test_writer()` so cargo/nextest capture it, and
/// timestamps are omitted to keep it stable across runs.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .with_target(false)
            .try_init()
            .ok();
    });
}

/// Whether [`init`] has run in this process.
pub fn is_initialized() -> bool {
    INITIALIZED.get().is_some()
}
