//! Deck construction, shuffling and deterministic round deals.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::cards_types::{Card, Rank, Suit};
use super::rules::{DECK_SIZE, HAND_SIZE};

/// Generate a full 52-card deck in standard order.
pub fn create_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card { suit, rank });
        }
    }
    deck
}

/// Uniform Fisher-Yates shuffle.
pub fn shuffle<R: Rng + ?Sized>(deck: &mut [Card], rng: &mut R) {
    for i in (1..deck.len()).rev() {
        let j = rng.random_range(0..=i);
        deck.swap(i, j);
    }
}

pub fn shuffle_with_seed(deck: &mut [Card], seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    shuffle(deck, &mut rng);
}

/// One round's starting layout. The last element of `stock` is the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deal {
    pub player1_hand: Vec<Card>,
    pub player2_hand: Vec<Card>,
    pub upcard: Card,
    pub stock: Vec<Card>,
}

/// Shuffle a fresh deck with `seed` and deal ten cards to each seat, one
/// upcard and the rest to stock.
///
/// Hands are sorted for convenience.
pub fn deal_round(seed: u64) -> Deal {
    let mut deck = create_deck();
    shuffle_with_seed(&mut deck, seed);

    let mut rest = deck.split_off(2 * HAND_SIZE);
    let mut player2_hand = deck.split_off(HAND_SIZE);
    let mut player1_hand = deck;
    player1_hand.sort();
    player2_hand.sort();

    let upcard = rest.remove(0);
    Deal {
        player1_hand,
        player2_hand,
        upcard,
        stock: rest,
    }
}
