//! Player view of game state - what information is visible to a player.
//!
//! This module provides [`VisibleGameState`], which represents everything a
//! player can see at a decision point, including the legal actions open to
//! them. The opponent's hand and the order of the stock are never part of it.

use serde::Serialize;

use crate::domain::actions::layoff_pool;
use crate::domain::layoffs::{can_lay_off, LayOff};
use crate::domain::melds::{find_optimal_melds, Meld};
use crate::domain::moves::GameAction;
use crate::domain::rules::KNOCK_LIMIT;
use crate::domain::state::{require_player, GameId, GameState, GameStatus, Phase, PlayerId, PlayerScore};
use crate::domain::Card;
use crate::errors::domain::DomainError;

/// Public facts about the other seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentView {
    pub player_id: PlayerId,
    pub username: String,
    pub hand_size: usize,
    pub score: u32,
    pub is_ready: bool,
    pub has_knocked: bool,
}

/// Information visible to one player.
///
/// This is the primary interface between the game engine and AI players,
/// and what a UI would render for a human seat.
///
/// # For AI Developers
///
/// When implementing [`crate::ai::AiPlayer`], you receive this struct in
/// every decision. It contains everything you can see as a player at that
/// point in the game.
///
/// ## Key Fields
///
/// - **Your hand**: [`hand`](Self::hand)
/// - **Current phase**: [`phase`](Self::phase)
/// - **Piles**: [`discard_pile`](Self::discard_pile) (fully visible) and
///   [`stock_count`](Self::stock_count) (size only)
/// - **Knock state**: [`knocker_melds`](Self::knocker_melds) and
///   [`layoff_pool`](Self::layoff_pool) while a knock awaits lay-offs
///
/// ## Helper Methods
///
/// **Always use** [`legal_actions()`](Self::legal_actions) instead of
/// re-implementing phase and turn rules yourself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleGameState {
    pub game_id: GameId,
    pub viewer_id: PlayerId,
    pub status: GameStatus,
    pub phase: Phase,
    pub current_player_id: Option<PlayerId>,
    pub round_number: u32,
    pub dealer_id: Option<PlayerId>,

    /// Your hand, sorted.
    pub hand: Vec<Card>,
    pub is_ready: bool,
    /// `None` until a second player is seated.
    pub opponent: Option<OpponentView>,

    /// Last element is the top.
    pub discard_pile: Vec<Card>,
    pub stock_count: usize,
    pub upcard_passes: u8,

    pub scores: Vec<PlayerScore>,

    /// Melds exposed by the last knock, including lay-offs so far.
    pub knocker_melds: Vec<Meld>,
    pub lay_offs: Vec<LayOff>,
    /// Your deadwood cards that may still be laid off. Empty unless you are
    /// the player laying off.
    pub layoff_pool: Vec<Card>,

    pub winner: Option<PlayerId>,
    /// Stream version this view was taken at.
    pub version: i64,
}

impl VisibleGameState {
    /// Project `state` onto what `viewer` is allowed to see.
    pub fn for_player(state: &GameState, viewer: PlayerId) -> Result<Self, DomainError> {
        let me = require_player(state, viewer)?;
        let mut hand = me.hand.clone();
        hand.sort();

        let opponent = state
            .players
            .iter()
            .find(|p| p.id != viewer)
            .map(|p| OpponentView {
                player_id: p.id,
                username: p.username.clone(),
                hand_size: p.hand.len(),
                score: p.score,
                is_ready: p.is_ready,
                has_knocked: p.has_knocked,
            });

        let layoff_pool = match &state.pending_settlement {
            Some(pending) if state.phase == Phase::Layoff && pending.opponent_id == viewer => {
                layoff_pool(state, pending)?
            }
            _ => Vec::new(),
        };

        Ok(Self {
            game_id: state.id,
            viewer_id: viewer,
            status: state.status,
            phase: state.phase,
            current_player_id: state.current_player_id,
            round_number: state.round_number,
            dealer_id: state.dealer_id,
            hand,
            is_ready: me.is_ready,
            opponent,
            discard_pile: state.discard_pile.clone(),
            stock_count: state.stock_pile.len(),
            upcard_passes: state.upcard_passes,
            scores: state.scores(),
            knocker_melds: state.last_knocker_melds.clone(),
            lay_offs: state.last_lay_offs.clone(),
            layoff_pool,
            winner: state.winner,
            version: state.version,
        })
    }

    pub fn is_my_turn(&self) -> bool {
        self.current_player_id == Some(self.viewer_id)
    }

    pub fn top_discard(&self) -> Option<Card> {
        self.discard_pile.last().copied()
    }

    /// Every action the viewer could submit right now.
    ///
    /// Knock and gin are offered with `melds: None`, letting the engine
    /// expose the optimal melds. Lay-offs are offered one card at a time.
    pub fn legal_actions(&self) -> Vec<GameAction> {
        match self.phase {
            Phase::GameOver => Vec::new(),
            Phase::Waiting => self.lobby_actions(),
            Phase::RoundOver => vec![GameAction::StartNewRound],
            Phase::Layoff => self.layoff_actions(),
            _ if !self.is_my_turn() => Vec::new(),
            Phase::UpcardDecision => {
                let mut actions = Vec::with_capacity(2);
                if self.top_discard().is_some() {
                    actions.push(GameAction::TakeUpcard);
                }
                actions.push(GameAction::PassUpcard);
                actions
            }
            Phase::Draw => {
                let mut actions = Vec::with_capacity(2);
                if self.stock_count > 0 {
                    actions.push(GameAction::DrawStock);
                }
                if self.top_discard().is_some() {
                    actions.push(GameAction::DrawDiscard);
                }
                actions
            }
            Phase::Discard => self.discard_actions(),
        }
    }

    fn lobby_actions(&self) -> Vec<GameAction> {
        if !self.is_ready {
            return vec![GameAction::SetReady];
        }
        match &self.opponent {
            Some(o) if o.is_ready => vec![GameAction::StartGame],
            _ => Vec::new(),
        }
    }

    fn discard_actions(&self) -> Vec<GameAction> {
        let mut actions = Vec::new();
        for (i, card) in self.hand.iter().enumerate() {
            actions.push(GameAction::Discard { card: *card });
            let rest: Vec<Card> = self
                .hand
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, c)| *c)
                .collect();
            let deadwood = find_optimal_melds(&rest).deadwood;
            if deadwood == 0 {
                actions.push(GameAction::Gin {
                    card: *card,
                    melds: None,
                });
            } else if deadwood <= KNOCK_LIMIT {
                actions.push(GameAction::Knock {
                    card: *card,
                    melds: None,
                });
            }
        }
        actions
    }

    fn layoff_actions(&self) -> Vec<GameAction> {
        if !self.is_my_turn() {
            return Vec::new();
        }
        let mut actions = Vec::new();
        for card in &self.layoff_pool {
            for (idx, meld) in self.knocker_melds.iter().enumerate() {
                if can_lay_off(*card, meld) {
                    actions.push(GameAction::LayOff {
                        cards: vec![*card],
                        target_meld: idx,
                    });
                }
            }
        }
        actions.push(GameAction::CompleteLayoff);
        actions
    }
}
