//! Card values and meld shape checks.

use super::cards_types::{Card, Rank};
use super::rules::{MAX_RUN_SIZE, MAX_SET_SIZE, MIN_MELD_SIZE};

/// Deadwood value: Ace 1, pips at face value, court cards 10.
pub fn card_value(card: Card) -> u32 {
    match card.rank {
        Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
        r => r.order() as u32,
    }
}

/// Adjacency order, A=1 … K=13. King does not wrap to Ace.
pub fn rank_order(rank: Rank) -> u8 {
    rank.order()
}

pub fn hand_value(cards: &[Card]) -> u32 {
    cards.iter().map(|c| card_value(*c)).sum()
}

/// 3–4 cards of one rank, all suits distinct.
pub fn is_valid_set(cards: &[Card]) -> bool {
    if !(MIN_MELD_SIZE..=MAX_SET_SIZE).contains(&cards.len()) {
        return false;
    }
    let rank = cards[0].rank;
    if cards.iter().any(|c| c.rank != rank) {
        return false;
    }
    let mut suits: Vec<_> = cards.iter().map(|c| c.suit).collect();
    suits.sort();
    suits.dedup();
    suits.len() == cards.len()
}

/// 3–13 cards of one suit forming a contiguous rank sequence.
/// Input order does not matter.
pub fn is_valid_run(cards: &[Card]) -> bool {
    if !(MIN_MELD_SIZE..=MAX_RUN_SIZE).contains(&cards.len()) {
        return false;
    }
    let suit = cards[0].suit;
    if cards.iter().any(|c| c.suit != suit) {
        return false;
    }
    let mut orders: Vec<u8> = cards.iter().map(|c| rank_order(c.rank)).collect();
    orders.sort_unstable();
    orders.windows(2).all(|w| w[1] == w[0] + 1)
}
