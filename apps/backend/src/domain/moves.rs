//! Move validation: per-phase, per-move legality against a hand/discard
//! snapshot. Pure; never touches `GameState`.

use serde::{Deserialize, Serialize};

use crate::domain::layoffs::LayOff;
use crate::domain::melds::{calculate_deadwood, find_optimal_melds, validate_melds, Meld};
use crate::domain::rules::KNOCK_LIMIT;
use crate::domain::state::{Phase, PlayerId};
use crate::domain::Card;
use crate::errors::domain::{DomainError, ValidationKind};

/// A move a player (human or AI) asks to make.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameAction {
    Join {
        username: String,
    },
    SetReady,
    StartGame,
    TakeUpcard,
    PassUpcard,
    DrawStock,
    DrawDiscard,
    Discard {
        card: Card,
    },
    /// `melds: None` lets the engine pick the optimal melds.
    Knock {
        card: Card,
        #[serde(default)]
        melds: Option<Vec<Meld>>,
    },
    Gin {
        card: Card,
        #[serde(default)]
        melds: Option<Vec<Meld>>,
    },
    #[serde(rename_all = "camelCase")]
    LayOff {
        cards: Vec<Card>,
        target_meld: usize,
    },
    CompleteLayoff,
    AiLayoffDecision {
        layoffs: Vec<LayOff>,
    },
    StartNewRound,
}

impl GameAction {
    /// Actions any seated player may send regardless of whose turn it is.
    pub fn bypasses_turn(&self) -> bool {
        matches!(
            self,
            GameAction::Join { .. }
                | GameAction::SetReady
                | GameAction::StartGame
                | GameAction::AiLayoffDecision { .. }
                | GameAction::StartNewRound
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            GameAction::Join { .. } => "JOIN",
            GameAction::SetReady => "SET_READY",
            GameAction::StartGame => "START_GAME",
            GameAction::TakeUpcard => "TAKE_UPCARD",
            GameAction::PassUpcard => "PASS_UPCARD",
            GameAction::DrawStock => "DRAW_STOCK",
            GameAction::DrawDiscard => "DRAW_DISCARD",
            GameAction::Discard { .. } => "DISCARD",
            GameAction::Knock { .. } => "KNOCK",
            GameAction::Gin { .. } => "GIN",
            GameAction::LayOff { .. } => "LAY_OFF",
            GameAction::CompleteLayoff => "COMPLETE_LAYOFF",
            GameAction::AiLayoffDecision { .. } => "AI_LAYOFF_DECISION",
            GameAction::StartNewRound => "START_NEW_ROUND",
        }
    }
}

/// Snapshot of what a move is validated against.
#[derive(Debug, Clone, Copy)]
pub struct MoveContext<'a> {
    pub phase: Phase,
    pub current_player_id: Option<PlayerId>,
    pub actor_id: PlayerId,
    pub hand: &'a [Card],
    pub discard_pile: &'a [Card],
    pub stock_count: usize,
}

/// Melds and deadwood a knock or gin would expose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnockCheck {
    pub hand_after: Vec<Card>,
    pub melds: Vec<Meld>,
    pub deadwood: u32,
}

fn phase_mismatch(action: &GameAction, phase: Phase) -> DomainError {
    DomainError::validation(
        ValidationKind::PhaseMismatch,
        format!("{} is not allowed during {phase:?}", action.name()),
    )
}

fn require_phase(action: &GameAction, phase: Phase, allowed: &[Phase]) -> Result<(), DomainError> {
    if allowed.contains(&phase) {
        Ok(())
    } else {
        Err(phase_mismatch(action, phase))
    }
}

fn require_in_hand(hand: &[Card], card: Card) -> Result<(), DomainError> {
    if hand.contains(&card) {
        Ok(())
    } else {
        Err(DomainError::validation(
            ValidationKind::CardNotInHand,
            format!("Card {} is not in hand", card.id()),
        ))
    }
}

fn require_discard(discard_pile: &[Card]) -> Result<(), DomainError> {
    if discard_pile.is_empty() {
        Err(DomainError::validation(
            ValidationKind::EmptyDiscardPile,
            "Discard pile is empty",
        ))
    } else {
        Ok(())
    }
}

/// Validate the melds a knock or gin exposes after discarding `card`.
///
/// With `melds: None` the optimal melds for the remaining hand are used.
pub fn check_knock(
    hand: &[Card],
    card: Card,
    melds: Option<&[Meld]>,
    require_gin: bool,
) -> Result<KnockCheck, DomainError> {
    require_in_hand(hand, card)?;
    let hand_after: Vec<Card> = hand.iter().copied().filter(|c| *c != card).collect();
    let melds = match melds {
        Some(m) => {
            validate_melds(m, &hand_after)?;
            m.to_vec()
        }
        None => find_optimal_melds(&hand_after).melds,
    };
    let deadwood = calculate_deadwood(&hand_after, &melds);

    if require_gin && deadwood != 0 {
        return Err(DomainError::validation(
            ValidationKind::NotGin,
            format!("Gin requires zero deadwood, hand has {deadwood}"),
        ));
    }
    if deadwood > KNOCK_LIMIT {
        return Err(DomainError::validation(
            ValidationKind::DeadwoodTooHigh,
            format!("Deadwood {deadwood} exceeds knock limit {KNOCK_LIMIT}"),
        ));
    }
    Ok(KnockCheck {
        hand_after,
        melds,
        deadwood,
    })
}

/// Validate `action` for `ctx.actor_id`.
///
/// Turn ownership is checked first, except for the actions in
/// [`GameAction::bypasses_turn`].
pub fn validate_move(action: &GameAction, ctx: &MoveContext<'_>) -> Result<(), DomainError> {
    if !action.bypasses_turn() && ctx.current_player_id != Some(ctx.actor_id) {
        return Err(DomainError::validation(
            ValidationKind::OutOfTurn,
            format!("It is not player {}'s turn", ctx.actor_id),
        ));
    }

    match action {
        GameAction::Join { .. } | GameAction::StartGame => {
            require_phase(action, ctx.phase, &[Phase::Waiting])
        }
        GameAction::SetReady => {
            require_phase(action, ctx.phase, &[Phase::Waiting, Phase::RoundOver])
        }
        GameAction::TakeUpcard => {
            require_phase(action, ctx.phase, &[Phase::UpcardDecision])?;
            require_discard(ctx.discard_pile)
        }
        GameAction::PassUpcard => require_phase(action, ctx.phase, &[Phase::UpcardDecision]),
        GameAction::DrawStock => {
            require_phase(action, ctx.phase, &[Phase::Draw])?;
            if ctx.stock_count == 0 {
                return Err(DomainError::validation(
                    ValidationKind::EmptyStock,
                    "Stock pile is empty",
                ));
            }
            Ok(())
        }
        GameAction::DrawDiscard => {
            require_phase(action, ctx.phase, &[Phase::Draw, Phase::UpcardDecision])?;
            require_discard(ctx.discard_pile)
        }
        GameAction::Discard { card } => {
            require_phase(action, ctx.phase, &[Phase::Discard])?;
            require_in_hand(ctx.hand, *card)
        }
        GameAction::Knock { card, melds } => {
            require_phase(action, ctx.phase, &[Phase::Discard])?;
            check_knock(ctx.hand, *card, melds.as_deref(), false).map(|_| ())
        }
        GameAction::Gin { card, melds } => {
            require_phase(action, ctx.phase, &[Phase::Discard])?;
            check_knock(ctx.hand, *card, melds.as_deref(), true).map(|_| ())
        }
        GameAction::LayOff { cards, .. } => {
            require_phase(action, ctx.phase, &[Phase::Layoff])?;
            if cards.is_empty() {
                return Err(DomainError::validation(
                    ValidationKind::InvalidLayOff,
                    "Lay-off needs at least one card",
                ));
            }
            cards.iter().try_for_each(|c| require_in_hand(ctx.hand, *c))
        }
        GameAction::CompleteLayoff => require_phase(action, ctx.phase, &[Phase::Layoff]),
        GameAction::AiLayoffDecision { layoffs } => {
            require_phase(action, ctx.phase, &[Phase::Layoff])?;
            layoffs
                .iter()
                .flat_map(|l| l.cards_layed_off.iter())
                .try_for_each(|c| require_in_hand(ctx.hand, *c))
        }
        GameAction::StartNewRound => require_phase(action, ctx.phase, &[Phase::RoundOver]),
    }
}
