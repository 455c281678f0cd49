//! Heuristic - the default gin rummy AI.
//!
//! Drawing:
//! - Compare the best deadwood reachable with the top discard against the
//!   current deadwood; take the discard only if it saves more than the draw
//!   margin.
//!
//! Discarding:
//! - Try every single-card removal. Deadwood 0 means gin; deadwood within
//!   the difficulty's knock threshold means knock.
//! - Otherwise discard the unmelded card with the lowest keep value, where
//!   near same-suit cards and same-rank cards make a card worth keeping and
//!   its point value makes it worth shedding.
//!
//! Laying off:
//! - Plan lay-offs greedily against the knocker's melds and commit them in
//!   one decision when the saved value clears the difficulty threshold.
//!
//! Difficulty adds noise: with `suboptimal_move_chance` the move is replaced
//! by a weak one (draw stock, or discard a random unmelded card).

use std::sync::Mutex;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use super::config::{AiConfig, DifficultyProfile};
use super::thoughts::ThoughtSampler;
use super::trait_def::{AiError, AiMove, AiPlayer};
use crate::domain::cards_logic::{card_value, rank_order};
use crate::domain::layoffs::{find_layoff_options, LayOff};
use crate::domain::melds::find_optimal_melds;
use crate::domain::moves::GameAction;
use crate::domain::player_view::VisibleGameState;
use crate::domain::rules::KNOCK_LIMIT;
use crate::domain::state::Phase;
use crate::domain::Card;

/// Deadwood points a drawn discard must save.
pub const DEFAULT_DRAW_MARGIN: u32 = 5;

/// Lay-off value always worth committing regardless of difficulty.
const LAYOFF_ALWAYS: u32 = 15;

/// Rank distance still counted as run potential.
const NEAR_RANKS: u8 = 2;

pub struct Heuristic {
    profile: DifficultyProfile,
    draw_margin: u32,
    rng: Mutex<ChaCha8Rng>,
    thoughts: ThoughtSampler,
}

impl Heuristic {
    pub const NAME: &'static str = "Heuristic";
    pub const VERSION: &'static str = "1.0.0";

    pub fn new(seed: Option<u64>) -> Self {
        let config = AiConfig {
            seed,
            ..AiConfig::empty()
        };
        Self::from_config(&config)
    }

    /// Reads `seed`, `difficulty` and the custom `drawMargin` field.
    pub fn from_config(config: &AiConfig) -> Self {
        let draw_margin = config
            .get_custom("drawMargin")
            .and_then(|v| v.as_u64())
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(DEFAULT_DRAW_MARGIN);
        let rng = match config.seed() {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_os_rng(),
        };
        Self {
            profile: config.difficulty().profile(),
            draw_margin,
            rng: Mutex::new(rng),
            thoughts: ThoughtSampler::new(config.seed()),
        }
    }

    pub fn draw_margin(&self) -> u32 {
        self.draw_margin
    }

    fn roll(&self, chance: f64) -> Result<bool, AiError> {
        if chance <= 0.0 {
            return Ok(false);
        }
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| AiError::Internal(format!("RNG lock poisoned: {e}")))?;
        Ok(rng.random_bool(chance.min(1.0)))
    }

    fn pick_random(&self, cards: &[Card]) -> Result<Option<Card>, AiError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| AiError::Internal(format!("RNG lock poisoned: {e}")))?;
        Ok(cards.choose(&mut *rng).copied())
    }

    fn wants_discard(&self, view: &VisibleGameState) -> bool {
        match view.top_discard() {
            Some(top) => discard_gain(&view.hand, top) > i64::from(self.draw_margin),
            None => false,
        }
    }

    fn choose_upcard(&self, view: &VisibleGameState) -> Result<GameAction, AiError> {
        if self.roll(self.profile.suboptimal_move_chance)? || !self.wants_discard(view) {
            return Ok(GameAction::PassUpcard);
        }
        Ok(GameAction::TakeUpcard)
    }

    fn choose_draw(&self, view: &VisibleGameState) -> Result<GameAction, AiError> {
        if view.stock_count == 0 {
            return Ok(GameAction::DrawDiscard);
        }
        if self.roll(self.profile.suboptimal_move_chance)? || !self.wants_discard(view) {
            return Ok(GameAction::DrawStock);
        }
        Ok(GameAction::DrawDiscard)
    }

    fn choose_discard(&self, view: &VisibleGameState) -> Result<GameAction, AiError> {
        let hand = &view.hand;
        let unmelded = find_optimal_melds(hand).deadwood_cards;

        if self.roll(self.profile.suboptimal_move_chance)? {
            if let Some(card) = self.pick_random(&unmelded)? {
                return Ok(GameAction::Discard { card });
            }
        }

        let (card, deadwood) = best_discard(hand)
            .ok_or_else(|| AiError::InvalidMove("No cards to discard".into()))?;
        if deadwood == 0 {
            return Ok(GameAction::Gin { card, melds: None });
        }
        if deadwood <= self.profile.knock_threshold.min(KNOCK_LIMIT) {
            return Ok(GameAction::Knock { card, melds: None });
        }

        if self.roll(self.profile.discard_randomness)? {
            if let Some(card) = self.pick_random(&unmelded)? {
                return Ok(GameAction::Discard { card });
            }
        }
        let card = lowest_keep_value(&unmelded, hand).unwrap_or(card);
        Ok(GameAction::Discard { card })
    }

    fn choose_layoffs(&self, view: &VisibleGameState) -> GameAction {
        let options = find_layoff_options(&view.layoff_pool, &view.knocker_melds);
        let total: u32 = options.iter().map(LayOff::value).sum();
        let worth_it = total > 0 && (total >= LAYOFF_ALWAYS || total >= self.profile.layoff_threshold);
        GameAction::AiLayoffDecision {
            layoffs: if worth_it { options } else { Vec::new() },
        }
    }
}

impl AiPlayer for Heuristic {
    fn choose_action(&self, view: &VisibleGameState) -> Result<AiMove, AiError> {
        let action = match view.phase {
            Phase::Waiting => view
                .legal_actions()
                .into_iter()
                .next()
                .ok_or_else(|| AiError::InvalidMove("Nothing to do in the lobby".into()))?,
            Phase::RoundOver => GameAction::StartNewRound,
            Phase::GameOver => return Err(AiError::InvalidMove("Game is over".into())),
            _ if !view.is_my_turn() => {
                return Err(AiError::InvalidMove(format!(
                    "Not player {}'s turn",
                    view.viewer_id
                )))
            }
            Phase::UpcardDecision => self.choose_upcard(view)?,
            Phase::Draw => self.choose_draw(view)?,
            Phase::Discard => self.choose_discard(view)?,
            Phase::Layoff => self.choose_layoffs(view),
        };

        debug!(
            game_id = view.game_id,
            player_id = view.viewer_id,
            phase = ?view.phase,
            action = action.name(),
            "Heuristic chose action"
        );

        Ok(AiMove {
            action,
            thoughts: self.thoughts.sample(view.phase).into_iter().collect(),
        })
    }
}

/// Deadwood saved by taking `upcard` and then making the best discard.
/// Never negative: discarding the upcard again restores the hand.
pub(crate) fn discard_gain(hand: &[Card], upcard: Card) -> i64 {
    let without = i64::from(find_optimal_melds(hand).deadwood);
    let mut with = hand.to_vec();
    with.push(upcard);
    let best_with = best_discard(&with).map_or(without, |(_, d)| i64::from(d));
    without - best_with
}

/// The removal leaving the least deadwood. Ties shed the higher card.
pub(crate) fn best_discard(hand: &[Card]) -> Option<(Card, u32)> {
    let mut best: Option<(Card, u32)> = None;
    for (i, card) in hand.iter().enumerate() {
        let rest: Vec<Card> = hand
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, c)| *c)
            .collect();
        let deadwood = find_optimal_melds(&rest).deadwood;
        let better = match best {
            None => true,
            Some((b, d)) => deadwood < d || (deadwood == d && card_value(*card) > card_value(b)),
        };
        if better {
            best = Some((*card, deadwood));
        }
    }
    best
}

fn run_potential(card: Card, hand: &[Card]) -> i32 {
    let r = rank_order(card.rank);
    hand.iter()
        .filter(|c| c.suit == card.suit && **c != card && rank_order(c.rank).abs_diff(r) <= NEAR_RANKS)
        .count() as i32
}

fn set_potential(card: Card, hand: &[Card]) -> i32 {
    hand.iter()
        .filter(|c| c.rank == card.rank && **c != card)
        .count() as i32
}

/// Higher means more worth holding on to.
pub(crate) fn keep_value(card: Card, hand: &[Card]) -> i32 {
    3 * run_potential(card, hand) + 2 * set_potential(card, hand) - card_value(card) as i32
}

fn lowest_keep_value(candidates: &[Card], hand: &[Card]) -> Option<Card> {
    candidates
        .iter()
        .copied()
        .min_by_key(|c| (keep_value(*c, hand), std::cmp::Reverse(card_value(*c))))
}
