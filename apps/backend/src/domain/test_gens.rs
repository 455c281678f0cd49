// Proptest generators for domain types.
// These generators ensure unique cards for property-based testing.

use proptest::prelude::*;

use crate::domain::dealing::create_deck;
use crate::domain::{Card, Rank, Suit};

/// Generate a random Suit
pub fn suit() -> impl Strategy<Value = Suit> {
    prop::sample::select(Suit::ALL.to_vec())
}

/// Generate a random Rank
pub fn rank() -> impl Strategy<Value = Rank> {
    prop::sample::select(Rank::ALL.to_vec())
}

/// Generate a single Card
pub fn card() -> impl Strategy<Value = Card> {
    (suit(), rank()).prop_map(|(suit, rank)| Card { suit, rank })
}

/// Generate a vector of N unique cards efficiently
pub fn unique_cards(count: usize) -> impl Strategy<Value = Vec<Card>> {
    // Shuffled prefix of a fresh deck
    Just(()).prop_perturb(move |_, mut rng| {
        let mut all_cards = create_deck();
        for i in 0..count.min(all_cards.len()) {
            let j = rng.random_range(i..all_cards.len());
            all_cards.swap(i, j);
        }
        all_cards.truncate(count);
        all_cards
    })
}

/// A dealt hand: ten unique cards.
pub fn hand() -> impl Strategy<Value = Vec<Card>> {
    unique_cards(10)
}

/// A hand mid-turn: eleven unique cards (after drawing).
pub fn full_hand() -> impl Strategy<Value = Vec<Card>> {
    unique_cards(11)
}

/// Hands that are likely to contain melds: up to eleven cards drawn from
/// two suits only.
pub fn meldy_hand() -> impl Strategy<Value = Vec<Card>> {
    (suit(), suit(), 3usize..=11).prop_perturb(|(a, b, count), mut rng| {
        let mut pool: Vec<Card> = create_deck()
            .into_iter()
            .filter(|c| c.suit == a || c.suit == b)
            .collect();
        let count = count.min(pool.len());
        for i in 0..count {
            let j = rng.random_range(i..pool.len());
            pool.swap(i, j);
        }
        pool.truncate(count);
        pool
    })
}

/// Game seed
pub fn seed() -> impl Strategy<Value = i64> {
    any::<i64>()
}

/// Indexes used to pick among legal actions while driving a game.
pub fn action_picks(max_len: usize) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(any::<usize>(), 1..max_len)
}
