use serde::{Deserialize, Serialize};

use crate::domain::cards_logic::hand_value;
use crate::domain::cards_types::Card;
use crate::domain::melds::{calculate_deadwood, Meld};
use crate::domain::rules::{GAME_TARGET, GIN_BONUS, UNDERCUT_BONUS};
use crate::domain::state::PlayerId;

/// Outcome of a knock or gin. Exactly one of the two scores is non-zero
/// unless the round is a zero-point knock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnockScore {
    pub is_gin: bool,
    pub is_undercut: bool,
    pub knocker_deadwood: u32,
    /// Opponent deadwood after any lay-offs.
    pub opponent_deadwood: u32,
    pub knocker_score: u32,
    pub opponent_score: u32,
    pub laid_off_value: u32,
}

/// Score a round from final deadwood totals.
pub fn score_from_deadwood(knocker_deadwood: u32, opponent_deadwood: u32) -> KnockScore {
    let is_gin = knocker_deadwood == 0;
    let is_undercut = !is_gin && opponent_deadwood <= knocker_deadwood;

    let (knocker_score, opponent_score) = if is_gin {
        (opponent_deadwood + GIN_BONUS, 0)
    } else if is_undercut {
        (0, knocker_deadwood - opponent_deadwood + UNDERCUT_BONUS)
    } else {
        (opponent_deadwood - knocker_deadwood, 0)
    };

    KnockScore {
        is_gin,
        is_undercut,
        knocker_deadwood,
        opponent_deadwood,
        knocker_score,
        opponent_score,
        laid_off_value: 0,
    }
}

pub fn calculate_knock_score(
    knocker_hand: &[Card],
    knocker_melds: &[Meld],
    opponent_hand: &[Card],
    opponent_melds: &[Meld],
) -> KnockScore {
    score_from_deadwood(
        calculate_deadwood(knocker_hand, knocker_melds),
        calculate_deadwood(opponent_hand, opponent_melds),
    )
}

/// Knock scoring with the opponent's lay-offs subtracted from their
/// deadwood before gin/undercut is decided. Gin ignores lay-offs.
pub fn calculate_score_with_layoffs(
    knocker_hand: &[Card],
    knocker_melds: &[Meld],
    opponent_hand: &[Card],
    opponent_melds: &[Meld],
    laid_off: &[Card],
) -> KnockScore {
    let knocker_deadwood = calculate_deadwood(knocker_hand, knocker_melds);
    let before = calculate_deadwood(opponent_hand, opponent_melds);
    settle_with_layoffs(knocker_deadwood, before, hand_value(laid_off))
}

pub fn settle_with_layoffs(
    knocker_deadwood: u32,
    opponent_deadwood_before: u32,
    laid_off_value: u32,
) -> KnockScore {
    if knocker_deadwood == 0 {
        return score_from_deadwood(0, opponent_deadwood_before);
    }
    let after = opponent_deadwood_before.saturating_sub(laid_off_value);
    KnockScore {
        laid_off_value: opponent_deadwood_before - after,
        ..score_from_deadwood(knocker_deadwood, after)
    }
}

pub fn should_game_end(scores: &[u32]) -> bool {
    scores.iter().any(|s| *s >= GAME_TARGET)
}

/// Winner once any player reaches the target.
///
/// `players` is in seat order. The highest score wins; a tie goes to
/// `scorer` (the player credited by the finalizing event) when tied,
/// otherwise to the lower seat.
pub fn determine_winner(players: &[(PlayerId, u32)], scorer: Option<PlayerId>) -> Option<PlayerId> {
    let scores: Vec<u32> = players.iter().map(|(_, s)| *s).collect();
    if !should_game_end(&scores) {
        return None;
    }
    let top = scores.iter().copied().max()?;
    let tied: Vec<PlayerId> = players
        .iter()
        .filter(|(_, s)| *s == top)
        .map(|(id, _)| *id)
        .collect();
    match scorer {
        Some(id) if tied.contains(&id) => Some(id),
        _ => tied.first().copied(),
    }
}
