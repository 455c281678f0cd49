//! Test-only stream builder for domain unit tests.
//!
//! A `Stream` decides each action against its own folded state and applies
//! the resulting event, keeping the produced events so tests can replay them.

use time::OffsetDateTime;

use crate::domain::actions::{game_created_event, validate_action};
use crate::domain::cards_parsing::try_parse_cards;
use crate::domain::dealing::create_deck;
use crate::domain::events::{create_game_event, EventPayload, GameEvent, GameStarted, InitialDeal};
use crate::domain::moves::GameAction;
use crate::domain::replay::apply_event;
use crate::domain::state::{GameId, GameState, PlayerId};
use crate::domain::Card;
use crate::errors::domain::DomainError;

/// Dealer in every started test game.
pub const P1: PlayerId = 101;
/// Non-dealer; holds the first upcard option.
pub const P2: PlayerId = 202;
pub const GAME: GameId = 7;

pub fn t0() -> OffsetDateTime {
    OffsetDateTime::UNIX_EPOCH
}

pub fn cards(tokens: &[&str]) -> Vec<Card> {
    try_parse_cards(tokens).unwrap()
}

pub fn card(token: &str) -> Card {
    token.parse().unwrap()
}

pub struct Stream {
    pub state: GameState,
    pub events: Vec<GameEvent>,
}

impl Stream {
    pub fn created(seed: i64) -> Self {
        let mut stream = Self {
            state: GameState::new(GAME),
            events: Vec::new(),
        };
        stream.push(game_created_event(GAME, P1, "alice", seed, t0()));
        stream
    }

    /// Both players seated and ready, still in `Waiting`.
    pub fn lobby(seed: i64) -> Self {
        let mut stream = Self::created(seed);
        stream.act(P2, GameAction::Join { username: "bob".into() }).unwrap();
        stream.act(P1, GameAction::SetReady).unwrap();
        stream.act(P2, GameAction::SetReady).unwrap();
        stream
    }

    /// Started with a seeded deal.
    pub fn started(seed: i64) -> Self {
        let mut stream = Self::lobby(seed);
        stream.act(P1, GameAction::StartGame).unwrap();
        stream
    }

    /// Started with fixed hands. The rest of the deck forms the stock in
    /// deck order.
    pub fn started_with_hands(p1: &[&str], p2: &[&str], upcard: &str) -> Self {
        let mut stream = Self::lobby(1);
        let p1_hand = cards(p1);
        let p2_hand = cards(p2);
        let up = card(upcard);
        let stock: Vec<Card> = create_deck()
            .into_iter()
            .filter(|c| !p1_hand.contains(c) && !p2_hand.contains(c) && *c != up)
            .collect();
        let payload = EventPayload::GameStarted(GameStarted {
            player1_id: P1,
            player2_id: P2,
            dealer_id: P1,
            starting_player_id: P2,
            initial_deal: InitialDeal {
                player1_hand: p1_hand,
                player2_hand: p2_hand,
                top_discard_card: up,
                stock_pile: stock,
            },
        });
        let seq = stream.state.version + 1;
        stream.push(create_game_event(GAME, Some(P1), seq, payload, t0()));
        stream
    }

    pub fn act(&mut self, actor: PlayerId, action: GameAction) -> Result<&GameEvent, DomainError> {
        let ev = validate_action(&self.state, actor, &action, t0())?;
        self.push(ev);
        Ok(self.last())
    }

    pub fn push(&mut self, ev: GameEvent) {
        apply_event(&mut self.state, &ev).unwrap();
        self.events.push(ev);
    }

    pub fn last(&self) -> &GameEvent {
        self.events.last().unwrap()
    }

    pub fn hand(&self, player: PlayerId) -> Vec<Card> {
        self.state.player(player).unwrap().hand.clone()
    }

    pub fn current(&self) -> PlayerId {
        self.state.current_player_id.unwrap()
    }
}
