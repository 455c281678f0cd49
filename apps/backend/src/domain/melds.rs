//! Meld search and deadwood.
//!
//! `find_optimal_melds` enumerates every candidate set and run in a hand and
//! searches non-overlapping combinations for the minimum deadwood. Hands are
//! at most eleven cards, so an exhaustive memoized search over "decided card"
//! bitmasks is cheap.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::cards_logic::{card_value, is_valid_run, is_valid_set, rank_order};
use super::cards_types::Card;
use super::rules::{KNOCK_LIMIT, MAX_RUN_SIZE, MAX_SET_SIZE, MIN_MELD_SIZE};
use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeldKind {
    Set,
    Run,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meld {
    #[serde(rename = "type")]
    pub kind: MeldKind,
    pub cards: Vec<Card>,
}

impl Meld {
    pub fn new(kind: MeldKind, mut cards: Vec<Card>) -> Self {
        cards.sort_by_key(|c| (rank_order(c.rank), c.suit));
        Self { kind, cards }
    }

    pub fn is_valid(&self) -> bool {
        match self.kind {
            MeldKind::Set => is_valid_set(&self.cards),
            MeldKind::Run => is_valid_run(&self.cards),
        }
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }
}

/// Result of an optimal meld search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeldAnalysis {
    pub melds: Vec<Meld>,
    pub deadwood: u32,
    pub deadwood_cards: Vec<Card>,
}

struct Candidate {
    mask: u64,
    kind: MeldKind,
}

fn candidate_melds(cards: &[Card]) -> Vec<Candidate> {
    let mut out = Vec::new();

    // Sets: every 3-subset and the full 4-set of each rank group.
    let mut by_rank: HashMap<u8, Vec<usize>> = HashMap::new();
    for (i, c) in cards.iter().enumerate() {
        by_rank.entry(rank_order(c.rank)).or_default().push(i);
    }
    let mut ranks: Vec<_> = by_rank.into_iter().collect();
    ranks.sort_by_key(|(r, _)| *r);
    for (_, idx) in ranks {
        if idx.len() < MIN_MELD_SIZE {
            continue;
        }
        for a in 0..idx.len() {
            for b in (a + 1)..idx.len() {
                for c in (b + 1)..idx.len() {
                    out.push(Candidate {
                        mask: (1 << idx[a]) | (1 << idx[b]) | (1 << idx[c]),
                        kind: MeldKind::Set,
                    });
                }
            }
        }
        if idx.len() == MAX_SET_SIZE {
            out.push(Candidate {
                mask: idx.iter().fold(0u64, |m, i| m | (1 << i)),
                kind: MeldKind::Set,
            });
        }
    }

    // Runs: every window of length >= 3 inside each maximal same-suit sequence.
    let mut order: Vec<usize> = (0..cards.len()).collect();
    order.sort_by_key(|&i| (cards[i].suit, rank_order(cards[i].rank)));
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() {
            let prev = cards[order[end - 1]];
            let next = cards[order[end]];
            if next.suit == prev.suit && rank_order(next.rank) == rank_order(prev.rank) + 1 {
                end += 1;
            } else {
                break;
            }
        }
        let seq = &order[start..end];
        if seq.len() >= MIN_MELD_SIZE {
            for lo in 0..seq.len() {
                for hi in (lo + MIN_MELD_SIZE)..=seq.len() {
                    out.push(Candidate {
                        mask: seq[lo..hi].iter().fold(0u64, |m, i| m | (1 << i)),
                        kind: MeldKind::Run,
                    });
                }
            }
        }
        start = end;
    }

    out
}

#[derive(Clone, Copy)]
enum Choice {
    Deadwood,
    Meld(usize),
}

struct Search<'a> {
    cards: &'a [Card],
    candidates: Vec<Candidate>,
    full: u64,
    memo: HashMap<u64, (u32, Choice)>,
}

impl Search<'_> {
    fn solve(&mut self, decided: u64) -> u32 {
        if decided == self.full {
            return 0;
        }
        if let Some((best, _)) = self.memo.get(&decided) {
            return *best;
        }
        let i = (!decided).trailing_zeros() as usize;
        let bit = 1u64 << i;

        let mut best = u32::MAX;
        let mut choice = Choice::Deadwood;
        for ci in 0..self.candidates.len() {
            let mask = self.candidates[ci].mask;
            if mask & bit == 0 || mask & decided != 0 {
                continue;
            }
            let v = self.solve(decided | mask);
            if v < best {
                best = v;
                choice = Choice::Meld(ci);
            }
        }
        let as_deadwood = card_value(self.cards[i]) + self.solve(decided | bit);
        if as_deadwood < best {
            best = as_deadwood;
            choice = Choice::Deadwood;
        }

        self.memo.insert(decided, (best, choice));
        best
    }
}

/// Minimum-deadwood partition of `hand` into melds and deadwood.
///
/// Any minimal partition is acceptable; the search is deterministic for a
/// given card order. Duplicate cards are ignored.
pub fn find_optimal_melds(hand: &[Card]) -> MeldAnalysis {
    let cards: Vec<Card> = hand
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .take(64)
        .collect();
    let full = if cards.len() == 64 {
        u64::MAX
    } else {
        (1u64 << cards.len()) - 1
    };

    let mut search = Search {
        cards: &cards,
        candidates: candidate_melds(&cards),
        full,
        memo: HashMap::new(),
    };
    let deadwood = search.solve(0);

    let mut melds = Vec::new();
    let mut deadwood_cards = Vec::new();
    let mut decided = 0u64;
    while decided != full {
        let i = (!decided).trailing_zeros() as usize;
        match search.memo.get(&decided).map(|(_, c)| *c) {
            Some(Choice::Meld(ci)) => {
                let cand = &search.candidates[ci];
                let meld_cards = (0..cards.len())
                    .filter(|j| cand.mask & (1 << j) != 0)
                    .map(|j| cards[j])
                    .collect();
                melds.push(Meld::new(cand.kind, meld_cards));
                decided |= cand.mask;
            }
            _ => {
                deadwood_cards.push(cards[i]);
                decided |= 1 << i;
            }
        }
    }

    MeldAnalysis {
        melds,
        deadwood,
        deadwood_cards,
    }
}

/// Cards of `hand` not covered by any of `melds`.
pub fn unmelded_cards(hand: &[Card], melds: &[Meld]) -> Vec<Card> {
    hand.iter()
        .copied()
        .filter(|c| !melds.iter().any(|m| m.contains(*c)))
        .collect()
}

/// Sum of values of cards in `hand` not covered by `melds`.
pub fn calculate_deadwood(hand: &[Card], melds: &[Meld]) -> u32 {
    unmelded_cards(hand, melds)
        .into_iter()
        .map(card_value)
        .sum()
}

pub fn can_knock(hand: &[Card]) -> bool {
    find_optimal_melds(hand).deadwood <= KNOCK_LIMIT
}

pub fn has_gin(hand: &[Card]) -> bool {
    find_optimal_melds(hand).deadwood == 0
}

/// Check that `melds` are individually valid, drawn from `hand`, and
/// pairwise disjoint.
pub fn validate_melds(melds: &[Meld], hand: &[Card]) -> Result<(), DomainError> {
    let mut used: BTreeSet<Card> = BTreeSet::new();
    for (i, meld) in melds.iter().enumerate() {
        if meld.cards.len() < MIN_MELD_SIZE {
            return Err(DomainError::validation(
                ValidationKind::InvalidMeld,
                format!("Meld {i} has fewer than {MIN_MELD_SIZE} cards"),
            ));
        }
        let too_long = match meld.kind {
            MeldKind::Set => meld.cards.len() > MAX_SET_SIZE,
            MeldKind::Run => meld.cards.len() > MAX_RUN_SIZE,
        };
        if too_long || !meld.is_valid() {
            return Err(DomainError::validation(
                ValidationKind::InvalidMeld,
                format!("Meld {i} is not a valid {:?}", meld.kind),
            ));
        }
        for card in &meld.cards {
            if !hand.contains(card) {
                return Err(DomainError::validation(
                    ValidationKind::MeldCardNotInHand,
                    format!("Meld card {} is not in hand", card.id()),
                ));
            }
            if !used.insert(*card) {
                return Err(DomainError::validation(
                    ValidationKind::MeldCardReused,
                    format!("Card {} used in more than one meld", card.id()),
                ));
            }
        }
    }
    Ok(())
}
