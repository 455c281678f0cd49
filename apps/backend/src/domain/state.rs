use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::layoffs::LayOff;
use crate::domain::melds::{find_optimal_melds, Meld};
use crate::domain::scoring::KnockScore;
use crate::domain::Card;
use crate::errors::domain::{DomainError, ValidationKind};

pub type PlayerId = i64;
pub type GameId = i64;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    /// Seats filling up.
    Waiting,
    Active,
    /// `GAME_FINISHED` folded.
    Finished,
}

/// Overall game progression phases.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Game created but not yet started.
    Waiting,
    /// Non-dealer, then dealer, may take the first upcard.
    UpcardDecision,
    Draw,
    Discard,
    /// Knock exposed; opponent may lay off before settlement.
    Layoff,
    /// Round scored; waiting for `START_NEW_ROUND`.
    RoundOver,
    /// A player reached the target score.
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub id: PlayerId,
    pub username: String,
    pub hand: Vec<Card>,
    pub hand_size: usize,
    /// Cumulative across rounds; only finalizing events add to it.
    pub score: u32,
    /// Best melds for the current hand (derived).
    pub melds: Vec<Meld>,
    /// Deadwood of the current hand (derived).
    pub deadwood: u32,
    pub has_knocked: bool,
    pub has_gin: bool,
    pub is_ready: bool,
    pub is_ready_for_next_round: bool,
    pub last_drawn_card_id: Option<String>,
}

impl PlayerState {
    pub fn new(id: PlayerId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            hand: Vec::new(),
            hand_size: 0,
            score: 0,
            melds: Vec::new(),
            deadwood: 0,
            has_knocked: false,
            has_gin: false,
            is_ready: false,
            is_ready_for_next_round: false,
            last_drawn_card_id: None,
        }
    }

    /// Recompute the fields derived from `hand`.
    pub fn refresh(&mut self) {
        let analysis = find_optimal_melds(&self.hand);
        self.hand_size = self.hand.len();
        self.melds = analysis.melds;
        self.deadwood = analysis.deadwood;
    }

    pub fn holds(&self, card: Card) -> bool {
        self.hand.contains(&card)
    }

    pub fn reset_for_round(&mut self) {
        self.has_knocked = false;
        self.has_gin = false;
        self.is_ready_for_next_round = false;
        self.last_drawn_card_id = None;
    }
}

/// Knock scored but not yet committed; lay-offs may still change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSettlement {
    pub knocker_id: PlayerId,
    pub opponent_id: PlayerId,
    pub knocker_deadwood: u32,
    pub opponent_deadwood_before: u32,
    /// Opponent melds that fix which of their cards count as deadwood.
    pub opponent_melds: Vec<Meld>,
    /// Score as it stands with no lay-offs.
    pub preview: KnockScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundOutcome {
    Knock,
    Gin,
    Undercut,
    /// Stock ran down; nobody scores.
    Drawn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    pub round_number: u32,
    pub outcome: RoundOutcome,
    pub knocker_id: Option<PlayerId>,
    pub points: BTreeMap<PlayerId, u32>,
}

impl RoundResult {
    /// The player credited with points this round, if any.
    pub fn scorer(&self) -> Option<PlayerId> {
        self.points
            .iter()
            .find(|(_, p)| **p > 0)
            .map(|(id, _)| *id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerScore {
    pub player_id: PlayerId,
    pub score: u32,
}

/// Authoritative game state. Produced only by the replay fold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub id: GameId,
    pub status: GameStatus,
    pub phase: Phase,
    pub current_player_id: Option<PlayerId>,
    /// Seat order; at most two.
    pub players: Vec<PlayerState>,
    /// Last element is the top of the stock.
    pub stock_pile: Vec<Card>,
    pub stock_pile_count: usize,
    /// Last element is the top of the discard pile.
    pub discard_pile: Vec<Card>,
    pub round_number: u32,
    pub dealer_id: Option<PlayerId>,
    pub upcard_passes: u8,
    pub winner: Option<PlayerId>,
    pub game_over: bool,
    pub round_scores: Vec<RoundResult>,
    pub last_knocker: Option<PlayerId>,
    pub last_knocker_melds: Vec<Meld>,
    pub last_lay_offs: Vec<LayOff>,
    pub pending_settlement: Option<PendingSettlement>,
    pub seed: i64,
    /// Sequence number of the last folded event.
    pub version: i64,
}

impl GameState {
    pub fn new(id: GameId) -> Self {
        Self {
            id,
            status: GameStatus::Waiting,
            phase: Phase::Waiting,
            current_player_id: None,
            players: Vec::new(),
            stock_pile: Vec::new(),
            stock_pile_count: 0,
            discard_pile: Vec::new(),
            round_number: 0,
            dealer_id: None,
            upcard_passes: 0,
            winner: None,
            game_over: false,
            round_scores: Vec::new(),
            last_knocker: None,
            last_knocker_melds: Vec::new(),
            last_lay_offs: Vec::new(),
            pending_settlement: None,
            seed: 0,
            version: 0,
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerState> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn seat_of(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    pub fn opponent_of(&self, id: PlayerId) -> Option<PlayerId> {
        self.seat_of(id)?;
        self.players.iter().find(|p| p.id != id).map(|p| p.id)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() == crate::domain::rules::PLAYERS
    }

    pub fn top_discard(&self) -> Option<Card> {
        self.discard_pile.last().copied()
    }

    pub fn scores(&self) -> Vec<PlayerScore> {
        self.players
            .iter()
            .map(|p| PlayerScore {
                player_id: p.id,
                score: p.score,
            })
            .collect()
    }

    /// Every card in stock, discard pile and hands, duplicates included.
    pub fn card_census(&self) -> Vec<Card> {
        let mut all = Vec::with_capacity(crate::domain::rules::DECK_SIZE);
        all.extend(self.stock_pile.iter().copied());
        all.extend(self.discard_pile.iter().copied());
        for p in &self.players {
            all.extend(p.hand.iter().copied());
        }
        all
    }

    /// Recompute everything derived from hands and piles.
    pub fn refresh_derived(&mut self) {
        self.stock_pile_count = self.stock_pile.len();
        for p in &mut self.players {
            p.refresh();
        }
    }
}

pub fn require_player<'a>(
    state: &'a GameState,
    id: PlayerId,
) -> Result<&'a PlayerState, DomainError> {
    state.player(id).ok_or_else(|| {
        DomainError::validation(
            ValidationKind::PlayerNotSeated,
            format!("Player {id} is not seated in game {}", state.id),
        )
    })
}

pub fn require_opponent(state: &GameState, id: PlayerId) -> Result<PlayerId, DomainError> {
    state.opponent_of(id).ok_or_else(|| {
        DomainError::validation(
            ValidationKind::PlayerNotSeated,
            format!("Player {id} has no opponent in game {}", state.id),
        )
    })
}

pub fn require_dealer(state: &GameState) -> Result<PlayerId, DomainError> {
    state.dealer_id.ok_or_else(|| {
        DomainError::validation_other("Invariant violated: dealer must be set")
    })
}
