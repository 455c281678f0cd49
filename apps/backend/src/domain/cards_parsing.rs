//! Card parsing and formatting.
//!
//! Two textual forms exist:
//! - the card id `"<suit>_<rank>"` (e.g. `"hearts_A"`, `"spades_10"`), which is
//!   the stable identity stored in events;
//! - the short token (e.g. `"AH"`, `"TD"`), accepted by `FromStr` for tests
//!   and tooling.

use std::str::FromStr;

use super::cards_types::{Card, Rank, Suit};
use crate::errors::domain::{DomainError, ValidationKind};

pub(crate) fn suit_word(suit: Suit) -> &'static str {
    match suit {
        Suit::Clubs => "clubs",
        Suit::Diamonds => "diamonds",
        Suit::Hearts => "hearts",
        Suit::Spades => "spades",
    }
}

pub(crate) fn rank_token(rank: Rank) -> &'static str {
    match rank {
        Rank::Ace => "A",
        Rank::Two => "2",
        Rank::Three => "3",
        Rank::Four => "4",
        Rank::Five => "5",
        Rank::Six => "6",
        Rank::Seven => "7",
        Rank::Eight => "8",
        Rank::Nine => "9",
        Rank::Ten => "10",
        Rank::Jack => "J",
        Rank::Queen => "Q",
        Rank::King => "K",
    }
}

pub(crate) fn parse_suit_word(s: &str) -> Option<Suit> {
    match s {
        "clubs" => Some(Suit::Clubs),
        "diamonds" => Some(Suit::Diamonds),
        "hearts" => Some(Suit::Hearts),
        "spades" => Some(Suit::Spades),
        _ => None,
    }
}

pub(crate) fn parse_rank_token(s: &str) -> Option<Rank> {
    match s {
        "A" => Some(Rank::Ace),
        "2" => Some(Rank::Two),
        "3" => Some(Rank::Three),
        "4" => Some(Rank::Four),
        "5" => Some(Rank::Five),
        "6" => Some(Rank::Six),
        "7" => Some(Rank::Seven),
        "8" => Some(Rank::Eight),
        "9" => Some(Rank::Nine),
        "10" => Some(Rank::Ten),
        "J" => Some(Rank::Jack),
        "Q" => Some(Rank::Queen),
        "K" => Some(Rank::King),
        _ => None,
    }
}

impl Card {
    /// Deterministic identity derived from suit and rank.
    pub fn id(&self) -> String {
        format!("{}_{}", suit_word(self.suit), rank_token(self.rank))
    }
}

/// Parse a card id of the form `"<suit>_<rank>"`.
///
/// Anything else is a data-integrity error (`InvalidCardId`).
pub fn parse_card_id(id: &str) -> Result<Card, DomainError> {
    let invalid = || DomainError::validation(ValidationKind::InvalidCardId, format!("Invalid card id: {id}"));
    let (suit_s, rank_s) = id.split_once('_').ok_or_else(invalid)?;
    let suit = parse_suit_word(suit_s).ok_or_else(invalid)?;
    let rank = parse_rank_token(rank_s).ok_or_else(invalid)?;
    Ok(Card { suit, rank })
}

impl FromStr for Card {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err = || DomainError::validation(ValidationKind::ParseCard, format!("Parse card: {s}"));
        if s.len() != 2 {
            return Err(parse_err());
        }
        let mut chars = s.chars();
        let rank_ch = chars.next().ok_or_else(parse_err)?;
        let suit_ch = chars.next().ok_or_else(parse_err)?;
        let rank = match rank_ch {
            'A' => Rank::Ace,
            '2' => Rank::Two,
            '3' => Rank::Three,
            '4' => Rank::Four,
            '5' => Rank::Five,
            '6' => Rank::Six,
            '7' => Rank::Seven,
            '8' => Rank::Eight,
            '9' => Rank::Nine,
            'T' => Rank::Ten,
            'J' => Rank::Jack,
            'Q' => Rank::Queen,
            'K' => Rank::King,
            _ => return Err(parse_err()),
        };
        let suit = match suit_ch {
            'C' => Suit::Clubs,
            'D' => Suit::Diamonds,
            'H' => Suit::Hearts,
            'S' => Suit::Spades,
            _ => return Err(parse_err()),
        };
        Ok(Card { suit, rank })
    }
}

/// Non-panicking helper to parse short tokens (e.g., "AS", "TC") into cards.
pub fn try_parse_cards<I, S>(tokens: I) -> Result<Vec<Card>, DomainError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|s| s.as_ref().parse::<Card>())
        .collect()
}
