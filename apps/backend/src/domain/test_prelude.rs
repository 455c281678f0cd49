//! Shared settings for in-crate property tests.

pub use backend_test_support::proptest_config;
