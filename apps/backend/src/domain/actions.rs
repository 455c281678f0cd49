//! Action validator: turns a requested action into a fully-populated event
//! payload, or a structured rejection.
//!
//! Deciding never mutates `GameState`; applying the resulting event is the
//! replay fold's job.

use time::OffsetDateTime;

use crate::domain::dealing::{deal_round, Deal};
use crate::domain::events::{
    create_game_event, AiLayoffDecision, DiscardCard, DrawFromDiscard, DrawFromStock,
    EventPayload, GameCreated, GameEvent, GameFinished, GameStarted, Gin, InitialDeal, Knock, LayOffCards,
    LayoffCompleted, PassUpcard, PlayerJoined, PlayerReady, StartNewRound, TakeUpcard,
};
use crate::domain::layoffs::{extend_meld, find_layoff_options, LayOff};
use crate::domain::melds::{find_optimal_melds, unmelded_cards, Meld};
use crate::domain::moves::{check_knock, validate_move, GameAction, MoveContext};
use crate::domain::rules::STOCK_FLOOR;
use crate::domain::scoring::{score_from_deadwood, settle_with_layoffs, KnockScore};
use crate::domain::seed_derivation::derive_dealing_seed;
use crate::domain::state::{
    require_dealer, require_opponent, require_player, GameId, GameState, GameStatus,
    PendingSettlement, Phase, PlayerId, PlayerScore, RoundOutcome,
};
use crate::domain::Card;
use crate::errors::domain::{DomainError, ValidationKind};

fn to_initial_deal(deal: Deal) -> InitialDeal {
    InitialDeal {
        player1_hand: deal.player1_hand,
        player2_hand: deal.player2_hand,
        top_discard_card: deal.upcard,
        stock_pile: deal.stock,
    }
}

/// Payload that opens a new stream.
pub fn game_created(creator_id: PlayerId, username: &str, seed: i64) -> EventPayload {
    EventPayload::GameCreated(GameCreated {
        player1_id: creator_id,
        username: username.to_string(),
        seed,
    })
}

/// Cumulative scores after adding `score` for a round between `knocker`
/// and `opponent`.
fn scores_after(
    state: &GameState,
    knocker: PlayerId,
    opponent: PlayerId,
    score: &KnockScore,
) -> Vec<PlayerScore> {
    state
        .players
        .iter()
        .map(|p| {
            let add = if p.id == knocker {
                score.knocker_score
            } else if p.id == opponent {
                score.opponent_score
            } else {
                0
            };
            PlayerScore {
                player_id: p.id,
                score: p.score + add,
            }
        })
        .collect()
}

fn require_pending(state: &GameState) -> Result<&PendingSettlement, DomainError> {
    state.pending_settlement.as_ref().ok_or_else(|| {
        DomainError::validation(
            ValidationKind::PhaseMismatch,
            "No knock is awaiting settlement",
        )
    })
}

/// Cards `actor` may still lay off: their deadwood under the melds fixed at
/// knock time, minus cards already laid off.
pub(crate) fn layoff_pool(
    state: &GameState,
    pending: &PendingSettlement,
) -> Result<Vec<Card>, DomainError> {
    let opponent = require_player(state, pending.opponent_id)?;
    let laid: Vec<Card> = state
        .last_lay_offs
        .iter()
        .flat_map(|l| l.cards_layed_off.iter().copied())
        .collect();
    Ok(unmelded_cards(&opponent.hand, &pending.opponent_melds)
        .into_iter()
        .filter(|c| !laid.contains(c))
        .collect())
}

/// Check one lay-off against `melds` and `pool`, returning the extended meld.
pub fn check_layoff(
    layoff: &LayOff,
    melds: &[Meld],
    pool: &[Card],
) -> Result<Meld, DomainError> {
    let target = melds.get(layoff.target_meld).ok_or_else(|| {
        DomainError::validation(
            ValidationKind::InvalidLayOff,
            format!("No knocker meld at index {}", layoff.target_meld),
        )
    })?;
    if layoff.cards_layed_off.is_empty() {
        return Err(DomainError::validation(
            ValidationKind::InvalidLayOff,
            "Lay-off needs at least one card",
        ));
    }
    for c in &layoff.cards_layed_off {
        if !pool.contains(c) {
            return Err(DomainError::validation(
                ValidationKind::InvalidLayOff,
                format!("Card {} is not available deadwood", c.id()),
            ));
        }
    }
    extend_meld(target, &layoff.cards_layed_off).ok_or_else(|| {
        DomainError::validation(
            ValidationKind::InvalidLayOff,
            format!("Cards do not extend meld {}", layoff.target_meld),
        )
    })
}

fn settle(state: &GameState, pending: &PendingSettlement, extra: &[LayOff]) -> KnockScore {
    let laid_value: u32 = state
        .last_lay_offs
        .iter()
        .chain(extra.iter())
        .map(LayOff::value)
        .sum();
    settle_with_layoffs(
        pending.knocker_deadwood,
        pending.opponent_deadwood_before,
        laid_value,
    )
}

/// Who deals the round after the current one: the loser of a scored round,
/// the same dealer after a drawn round.
pub fn next_dealer(state: &GameState) -> Result<PlayerId, DomainError> {
    let dealer = require_dealer(state)?;
    let Some(last) = state.round_scores.last() else {
        return Ok(dealer);
    };
    if last.outcome == RoundOutcome::Drawn {
        return Ok(dealer);
    }
    match last.scorer() {
        Some(scorer) => require_opponent(state, scorer),
        None => Ok(dealer),
    }
}

/// Decide the event payload for `action` by `actor` against `state`.
pub fn decide(
    state: &GameState,
    actor: PlayerId,
    action: &GameAction,
) -> Result<EventPayload, DomainError> {
    if state.status == GameStatus::Finished || state.phase == Phase::GameOver {
        return Err(DomainError::validation(
            ValidationKind::GameOver,
            format!("Game {} is over", state.id),
        ));
    }

    if let GameAction::Join { username } = action {
        return decide_join(state, actor, username);
    }

    let player = require_player(state, actor)?;
    let ctx = MoveContext {
        phase: state.phase,
        current_player_id: state.current_player_id,
        actor_id: actor,
        hand: &player.hand,
        discard_pile: &state.discard_pile,
        stock_count: state.stock_pile.len(),
    };
    validate_move(action, &ctx)?;

    match action {
        GameAction::Join { username } => decide_join(state, actor, username),
        GameAction::SetReady => Ok(EventPayload::PlayerReady(PlayerReady { player_id: actor })),
        GameAction::StartGame => decide_start(state),
        GameAction::TakeUpcard | GameAction::DrawDiscard if state.phase == Phase::UpcardDecision => {
            let card = top_discard(state)?;
            let mut after = state.discard_pile.clone();
            after.pop();
            Ok(EventPayload::TakeUpcard(TakeUpcard {
                player_id: actor,
                card_taken: card,
                discard_pile_after: after,
            }))
        }
        GameAction::PassUpcard => {
            let passes = state.upcard_passes + 1;
            let next_player_id = if passes >= 2 {
                require_opponent(state, require_dealer(state)?)?
            } else {
                require_opponent(state, actor)?
            };
            Ok(EventPayload::PassUpcard(PassUpcard {
                player_id: actor,
                passes,
                next_player_id,
            }))
        }
        GameAction::DrawStock => {
            let card = state.stock_pile.last().copied().ok_or_else(|| {
                DomainError::validation(ValidationKind::EmptyStock, "Stock pile is empty")
            })?;
            Ok(EventPayload::DrawFromStock(DrawFromStock {
                player_id: actor,
                card_drawn: card,
                stock_size_after: state.stock_pile.len() - 1,
            }))
        }
        GameAction::DrawDiscard => {
            let card = top_discard(state)?;
            let mut after = state.discard_pile.clone();
            after.pop();
            Ok(EventPayload::DrawFromDiscard(DrawFromDiscard {
                player_id: actor,
                card_drawn: card,
                discard_pile_after: after,
            }))
        }
        GameAction::TakeUpcard => Err(phase_error(action, state.phase)),
        GameAction::Discard { card } => {
            let mut after = state.discard_pile.clone();
            after.push(*card);
            Ok(EventPayload::DiscardCard(DiscardCard {
                player_id: actor,
                card_discarded: *card,
                discard_pile_after: after,
                next_player_id: require_opponent(state, actor)?,
                round_drawn: state.stock_pile.len() <= STOCK_FLOOR,
            }))
        }
        GameAction::Knock { card, melds } => {
            decide_knock(state, actor, *card, melds.as_deref(), false)
        }
        GameAction::Gin { card, melds } => decide_knock(state, actor, *card, melds.as_deref(), true),
        GameAction::LayOff { cards, target_meld } => {
            let pending = require_pending(state)?;
            require_layoff_actor(pending, actor)?;
            let layoff = LayOff {
                cards_layed_off: cards.clone(),
                target_meld: *target_meld,
            };
            let pool = layoff_pool(state, pending)?;
            let meld_after = check_layoff(&layoff, &state.last_knocker_melds, &pool)?;
            Ok(EventPayload::LayOff(LayOffCards {
                player_id: actor,
                cards_layed_off: cards.clone(),
                target_meld: *target_meld,
                meld_after,
            }))
        }
        GameAction::CompleteLayoff => {
            let pending = require_pending(state)?;
            require_layoff_actor(pending, actor)?;
            let scores = settle(state, pending, &[]);
            Ok(EventPayload::LayoffCompleted(LayoffCompleted {
                player_id: actor,
                layoffs: state.last_lay_offs.clone(),
                final_scores: scores_after(state, pending.knocker_id, pending.opponent_id, &scores),
                scores,
            }))
        }
        GameAction::AiLayoffDecision { layoffs } => {
            let pending = require_pending(state)?;
            require_layoff_actor(pending, actor)?;
            let mut pool = layoff_pool(state, pending)?;
            let mut melds = state.last_knocker_melds.clone();
            for layoff in layoffs {
                let extended = check_layoff(layoff, &melds, &pool)?;
                pool.retain(|c| !layoff.cards_layed_off.contains(c));
                melds[layoff.target_meld] = extended;
            }
            let scores = settle(state, pending, layoffs);
            Ok(EventPayload::AiLayoffDecision(AiLayoffDecision {
                player_id: actor,
                layoffs: layoffs.clone(),
                final_scores: scores_after(state, pending.knocker_id, pending.opponent_id, &scores),
                scores,
            }))
        }
        GameAction::StartNewRound => {
            let dealer_id = next_dealer(state)?;
            let starting_player_id = require_opponent(state, dealer_id)?;
            let round_number = state.round_number + 1;
            let deal = deal_round(derive_dealing_seed(state.seed, round_number));
            Ok(EventPayload::StartNewRound(StartNewRound {
                round_number,
                dealer_id,
                starting_player_id,
                requested_by: actor,
                new_deal: to_initial_deal(deal),
            }))
        }
    }
}

fn decide_join(state: &GameState, actor: PlayerId, username: &str) -> Result<EventPayload, DomainError> {
    if state.phase != Phase::Waiting {
        return Err(DomainError::validation(
            ValidationKind::PhaseMismatch,
            "Cannot join a started game",
        ));
    }
    if state.player(actor).is_some() {
        return Err(DomainError::validation(
            ValidationKind::AlreadySeated,
            format!("Player {actor} is already seated"),
        ));
    }
    if state.is_full() {
        return Err(DomainError::validation(
            ValidationKind::GameFull,
            format!("Game {} is full", state.id),
        ));
    }
    Ok(EventPayload::PlayerJoined(PlayerJoined {
        player_id: actor,
        username: username.to_string(),
    }))
}

fn phase_error(action: &GameAction, phase: Phase) -> DomainError {
    DomainError::validation(
        ValidationKind::PhaseMismatch,
        format!("{} is not allowed during {phase:?}", action.name()),
    )
}

fn top_discard(state: &GameState) -> Result<Card, DomainError> {
    state.top_discard().ok_or_else(|| {
        DomainError::validation(ValidationKind::EmptyDiscardPile, "Discard pile is empty")
    })
}

fn require_layoff_actor(pending: &PendingSettlement, actor: PlayerId) -> Result<(), DomainError> {
    if pending.opponent_id == actor {
        Ok(())
    } else {
        Err(DomainError::validation(
            ValidationKind::OutOfTurn,
            "Only the knocker's opponent may lay off",
        ))
    }
}

fn decide_start(state: &GameState) -> Result<EventPayload, DomainError> {
    if !state.is_full() {
        return Err(DomainError::validation(
            ValidationKind::PlayersNotReady,
            "Two players are required to start",
        ));
    }
    if state.players.iter().any(|p| !p.is_ready) {
        return Err(DomainError::validation(
            ValidationKind::PlayersNotReady,
            "Every seated player must be ready",
        ));
    }
    let player1_id = state.players[0].id;
    let player2_id = state.players[1].id;
    let deal = deal_round(derive_dealing_seed(state.seed, 1));
    Ok(EventPayload::GameStarted(GameStarted {
        player1_id,
        player2_id,
        dealer_id: player1_id,
        starting_player_id: player2_id,
        initial_deal: to_initial_deal(deal),
    }))
}

fn decide_knock(
    state: &GameState,
    actor: PlayerId,
    card: Card,
    melds: Option<&[Meld]>,
    require_gin: bool,
) -> Result<EventPayload, DomainError> {
    let player = require_player(state, actor)?;
    let opponent_id = require_opponent(state, actor)?;
    let opponent = require_player(state, opponent_id)?;
    let check = check_knock(&player.hand, card, melds, require_gin)?;

    let opponent_analysis = find_optimal_melds(&opponent.hand);
    let scores = score_from_deadwood(check.deadwood, opponent_analysis.deadwood);

    if check.deadwood == 0 {
        return Ok(EventPayload::Gin(Gin {
            player_id: actor,
            card_discarded: card,
            ginner_hand: check.hand_after,
            ginner_melds: check.melds,
            opponent_hand: opponent.hand.clone(),
            opponent_melds: opponent_analysis.melds,
            final_scores: scores_after(state, actor, opponent_id, &scores),
            scores,
        }));
    }

    let layoff_options = find_layoff_options(&opponent_analysis.deadwood_cards, &check.melds);
    Ok(EventPayload::Knock(Knock {
        player_id: actor,
        card_discarded: card,
        knocker_hand: check.hand_after,
        knocker_melds: check.melds,
        deadwood_value: check.deadwood,
        opponent_hand: opponent.hand.clone(),
        opponent_melds: opponent_analysis.melds,
        opponent_deadwood: opponent_analysis.deadwood,
        layoff_options,
        scores,
    }))
}

/// Validate `action` and wrap the decided payload in the next event of the
/// stream.
pub fn validate_action(
    state: &GameState,
    actor: PlayerId,
    action: &GameAction,
    now: OffsetDateTime,
) -> Result<GameEvent, DomainError> {
    let payload = decide(state, actor, action)?;
    Ok(create_game_event(
        state.id,
        Some(actor),
        state.version + 1,
        payload,
        now,
    ))
}

/// System event closing a game whose fold reached `GameOver`.
pub fn game_finished_event(state: &GameState, now: OffsetDateTime) -> Option<GameEvent> {
    if state.phase != Phase::GameOver || state.status == GameStatus::Finished {
        return None;
    }
    let winner_id = state.winner?;
    Some(create_game_event(
        state.id,
        None,
        state.version + 1,
        EventPayload::GameFinished(GameFinished {
            winner_id,
            final_scores: state.scores(),
        }),
        now,
    ))
}

/// First event of a new stream.
pub fn game_created_event(
    game_id: GameId,
    creator_id: PlayerId,
    username: &str,
    seed: i64,
    now: OffsetDateTime,
) -> GameEvent {
    create_game_event(
        game_id,
        Some(creator_id),
        1,
        game_created(creator_id, username, seed),
        now,
    )
}
