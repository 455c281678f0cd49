//! RNG seed derivation utilities for deterministic game behavior.
//!
//! Provides functions to derive unique-but-deterministic seeds for different
//! game contexts (dealing, AI decisions) from a base game seed.

/// Derive a seed for dealing cards in a round.
///
/// Creates a unique seed for dealing each round's hands.
///
/// # Arguments
///
/// * `game_seed` - Base RNG seed recorded in `GAME_CREATED`
/// * `round_no` - Round number (1-based)
///
/// # Returns
///
/// Derived seed that is unique per (game, round) combination.
pub fn derive_dealing_seed(game_seed: i64, round_no: u32) -> u64 {
    // Cast i64 to u64 for RNG (sign doesn't matter for seed)
    let base = game_seed as u64;

    base.wrapping_add((round_no as u64).wrapping_mul(1_000_000))
        .wrapping_add(2) // Offset to distinguish from AI seed
}

/// Derive a seed for an AI seat.
///
/// Same game + seat = same AI decision stream, so simulated games are
/// reproducible end to end.
pub fn derive_ai_seed(game_seed: i64, player_seat: u8) -> u64 {
    let base = game_seed as u64;

    base.wrapping_add((player_seat as u64).wrapping_mul(100))
        .wrapping_add(1)
}
