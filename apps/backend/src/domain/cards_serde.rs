//! Serde implementations for card types
//!
//! Wire shape of a card is `{"suit":"hearts","rank":"10","id":"hearts_10"}`.
//! The `id` is redundant on the wire and is checked on the way in.

use serde::de::Error as _;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::cards_parsing::{parse_rank_token, parse_suit_word, rank_token, suit_word};
use super::cards_types::{Card, Rank, Suit};

impl Serialize for Suit {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(suit_word(*self))
    }
}

impl<'de> Deserialize<'de> for Suit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_suit_word(&s).ok_or_else(|| D::Error::custom(format!("Invalid suit: {s}")))
    }
}

impl Serialize for Rank {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(rank_token(*self))
    }
}

impl<'de> Deserialize<'de> for Rank {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_rank_token(&s).ok_or_else(|| D::Error::custom(format!("Invalid rank: {s}")))
    }
}

impl Serialize for Card {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut st = serializer.serialize_struct("Card", 3)?;
        st.serialize_field("suit", &self.suit)?;
        st.serialize_field("rank", &self.rank)?;
        st.serialize_field("id", &self.id())?;
        st.end()
    }
}

#[derive(Deserialize)]
struct CardWire {
    suit: Suit,
    rank: Rank,
    #[serde(default)]
    id: Option<String>,
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = CardWire::deserialize(deserializer)?;
        let card = Card::new(wire.suit, wire.rank);
        if let Some(id) = wire.id {
            if id != card.id() {
                return Err(D::Error::custom(format!(
                    "Card id {id} does not match {}",
                    card.id()
                )));
            }
        }
        Ok(card)
    }
}
