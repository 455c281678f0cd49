//! Lay-offs: attaching deadwood cards to the knocker's exposed melds.

use serde::{Deserialize, Serialize};

use super::cards_logic::{card_value, rank_order};
use super::cards_types::Card;
use super::melds::{Meld, MeldKind};
use super::rules::{MAX_RUN_SIZE, MAX_SET_SIZE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayOff {
    pub cards_layed_off: Vec<Card>,
    /// Index into the knocker's meld list.
    pub target_meld: usize,
}

impl LayOff {
    pub fn value(&self) -> u32 {
        self.cards_layed_off.iter().map(|c| card_value(*c)).sum()
    }
}

/// Whether `card` extends `meld` by itself: same rank with a new suit for a
/// set, same suit at either open end for a run.
pub fn can_lay_off(card: Card, meld: &Meld) -> bool {
    if meld.cards.is_empty() || meld.contains(card) {
        return false;
    }
    match meld.kind {
        MeldKind::Set => {
            meld.cards.len() < MAX_SET_SIZE
                && meld.cards.iter().all(|c| c.rank == card.rank && c.suit != card.suit)
        }
        MeldKind::Run => {
            if meld.cards.len() >= MAX_RUN_SIZE || meld.cards.iter().any(|c| c.suit != card.suit) {
                return false;
            }
            let lo = meld.cards.iter().map(|c| rank_order(c.rank)).min().unwrap_or(0);
            let hi = meld.cards.iter().map(|c| rank_order(c.rank)).max().unwrap_or(0);
            let r = rank_order(card.rank);
            r + 1 == lo || r == hi + 1
        }
    }
}

/// Attach `cards` to `meld`, one at a time in any workable order.
///
/// Returns `None` if some card can never attach (e.g. a run gap).
pub fn extend_meld(meld: &Meld, cards: &[Card]) -> Option<Meld> {
    let mut current = meld.clone();
    let mut pending: Vec<Card> = cards.to_vec();
    while !pending.is_empty() {
        let pos = pending.iter().position(|c| can_lay_off(*c, &current))?;
        let card = pending.remove(pos);
        let mut next = current.cards.clone();
        next.push(card);
        current = Meld::new(current.kind, next);
    }
    Some(current)
}

/// Greedy lay-off plan for `deadwood` against `melds`.
///
/// Each meld is extended as far as possible from the remaining cards before
/// moving to the next; a card is offered to one meld at most.
pub fn find_layoff_options(deadwood: &[Card], melds: &[Meld]) -> Vec<LayOff> {
    let mut remaining: Vec<Card> = deadwood.to_vec();
    let mut out = Vec::new();
    for (idx, meld) in melds.iter().enumerate() {
        let mut current = meld.clone();
        let mut taken = Vec::new();
        while let Some(pos) = remaining.iter().position(|c| can_lay_off(*c, &current)) {
            let card = remaining.remove(pos);
            taken.push(card);
            let mut next = current.cards.clone();
            next.push(card);
            current = Meld::new(current.kind, next);
        }
        if !taken.is_empty() {
            out.push(LayOff {
                cards_layed_off: taken,
                target_meld: idx,
            });
        }
    }
    out
}
