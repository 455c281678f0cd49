use std::env;

use proptest::test_runner::Config as ProptestConfig;

/// Case count from `PROPTEST_CASES`, with a low default for fast CI.
///
/// Increase locally with e.g. `PROPTEST_CASES=800 cargo test`.
pub fn proptest_config() -> ProptestConfig {
    let cases = env::var("PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(32);

    ProptestConfig {
        cases,
        ..ProptestConfig::default()
    }
}
