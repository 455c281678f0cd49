//! Replay engine: deterministic fold of an ordered event stream into
//! `GameState`, optionally seeded from a snapshot.
//!
//! Before folding, sequence numbers are verified to be gap-free starting
//! right after the seed. If they are not, a bounded recovery drops
//! non-positive or already-covered numbers, re-sorts by
//! `(sequence_number, created_at)` and keeps the earliest of each duplicate.
//! A gap that survives recovery is fatal.
//!
//! Per-event failures are contained: a phase mismatch is retried once with
//! the phase coerced to what the event expects; anything else, or a failed
//! retry, skips the event with an `error!` diagnostic. After the fold the
//! 52-card conservation invariant must hold or replay fails.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::actions::{check_layoff, layoff_pool, next_dealer};
use crate::domain::events::{
    AiLayoffDecision, DiscardCard, DrawFromDiscard, DrawFromStock, EventPayload, EventType,
    GameEvent, GameFinished, GameStarted, Gin, InitialDeal, Knock, LayOffCards, LayoffCompleted,
    PassUpcard, StartNewRound, TakeUpcard,
};
use crate::domain::layoffs::LayOff;
use crate::domain::melds::{calculate_deadwood, validate_melds, Meld};
use crate::domain::rules::{DECK_SIZE, EVENT_VERSION, HAND_SIZE, KNOCK_LIMIT, STOCK_FLOOR};
use crate::domain::scoring::{
    determine_winner, score_from_deadwood, settle_with_layoffs, should_game_end, KnockScore,
};
use crate::domain::state::{
    GameState, GameStatus, PendingSettlement, Phase, PlayerId, PlayerScore, PlayerState,
    RoundOutcome, RoundResult,
};
use crate::domain::Card;

/// Folded state as of `sequence_number`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub state: GameState,
    pub sequence_number: i64,
}

/// Why a single event could not be folded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyErrorKind {
    PhaseMismatch,
    OutOfTurn,
    UnknownPlayer,
    /// A card the event moves is not where the state says it is.
    CardMismatch,
    InvalidMeld,
    /// Payload disagrees with what the state implies.
    PayloadMismatch,
    UnsupportedVersion,
    WrongGame,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?}: {detail}")]
pub struct ApplyError {
    pub kind: ApplyErrorKind,
    pub detail: String,
}

impl ApplyError {
    fn new(kind: ApplyErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("event stream is empty")]
    EmptyStream,
    #[error("stream does not start with GAME_CREATED (found {found})")]
    MissingGameCreated { found: EventType },
    #[error("sequence gap: expected {expected}, found {found}")]
    SequenceGap { expected: i64, found: i64 },
    #[error("event could not be decoded: {0}")]
    Decode(String),
    #[error("card conservation violated after sequence {sequence_number}: {detail}")]
    CardConservation { sequence_number: i64, detail: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEvent {
    pub sequence_number: i64,
    pub event_type: EventType,
    pub error: ApplyError,
}

#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    pub state: GameState,
    pub applied: usize,
    pub skipped: Vec<SkippedEvent>,
    /// Sequence numbers needed re-sorting or de-duplication.
    pub recovered_sequence: bool,
    /// Events folded only after phase coercion.
    pub coerced: usize,
}

/// Decode one stored event. Card ids that do not match `<suit>_<rank>`
/// are rejected here.
pub fn decode_event(raw: &str) -> Result<GameEvent, ReplayError> {
    serde_json::from_str(raw).map_err(|e| ReplayError::Decode(e.to_string()))
}

/// Check that `events` are numbered `after + 1, after + 2, …` with no gaps.
pub fn verify_sequence(events: &[GameEvent], after: i64) -> Result<(), ReplayError> {
    for (i, ev) in events.iter().enumerate() {
        let expected = after + 1 + i as i64;
        if ev.sequence_number != expected {
            return Err(ReplayError::SequenceGap {
                expected,
                found: ev.sequence_number,
            });
        }
    }
    Ok(())
}

/// Bounded sequence recovery; see the module docs.
pub fn recover_sequence(
    mut events: Vec<GameEvent>,
    after: i64,
) -> Result<Vec<GameEvent>, ReplayError> {
    let before = events.len();
    events.retain(|e| e.sequence_number > after);
    events.sort_by(|a, b| {
        a.sequence_number
            .cmp(&b.sequence_number)
            .then(a.created_at.cmp(&b.created_at))
    });
    events.dedup_by_key(|e| e.sequence_number);
    warn!(
        dropped = before - events.len(),
        after, "Recovered event sequence"
    );
    verify_sequence(&events, after)?;
    Ok(events)
}

pub fn check_card_conservation(state: &GameState) -> Result<(), String> {
    let census = state.card_census();
    let unique: BTreeSet<Card> = census.iter().copied().collect();
    if census.len() != DECK_SIZE || unique.len() != DECK_SIZE {
        return Err(format!(
            "{} cards in play, {} unique",
            census.len(),
            unique.len()
        ));
    }
    Ok(())
}

pub fn replay(events: &[GameEvent]) -> Result<ReplayOutcome, ReplayError> {
    replay_from(None, events)
}

/// Fold `events` on top of `snapshot` (or from scratch).
///
/// Events at or before the snapshot's sequence number are ignored.
pub fn replay_from(
    snapshot: Option<&StateSnapshot>,
    events: &[GameEvent],
) -> Result<ReplayOutcome, ReplayError> {
    let after = snapshot.map(|s| s.sequence_number).unwrap_or(0);

    let tail: Vec<GameEvent> = events
        .iter()
        .filter(|e| e.sequence_number > after)
        .cloned()
        .collect();
    let (events, recovered_sequence) = match verify_sequence(&tail, after) {
        Ok(()) => (tail, false),
        Err(err) => {
            warn!(error = %err, "Event sequence failed verification, attempting recovery");
            (recover_sequence(tail, after)?, true)
        }
    };

    let mut state = match snapshot {
        Some(s) => s.state.clone(),
        None => {
            let first = events.first().ok_or(ReplayError::EmptyStream)?;
            if first.event_type() != EventType::GameCreated {
                return Err(ReplayError::MissingGameCreated {
                    found: first.event_type(),
                });
            }
            GameState::new(first.game_id)
        }
    };

    let mut applied = 0;
    let mut coerced = 0;
    let mut skipped = Vec::new();
    for ev in &events {
        match apply_with_recovery(&mut state, ev) {
            Ok(was_coerced) => {
                applied += 1;
                if was_coerced {
                    coerced += 1;
                }
            }
            Err(err) => {
                error!(
                    game_id = ev.game_id,
                    sequence_number = ev.sequence_number,
                    event_type = %ev.event_type(),
                    kind = ?err.kind,
                    detail = %err.detail,
                    "Skipping event that failed to apply"
                );
                // The stream position still advances past a skipped event.
                state.version = ev.sequence_number;
                skipped.push(SkippedEvent {
                    sequence_number: ev.sequence_number,
                    event_type: ev.event_type(),
                    error: err,
                });
            }
        }
    }

    if state.status != GameStatus::Waiting {
        check_card_conservation(&state).map_err(|detail| ReplayError::CardConservation {
            sequence_number: state.version,
            detail,
        })?;
    }

    debug!(
        game_id = state.id,
        version = state.version,
        applied,
        skipped = skipped.len(),
        "Replay complete"
    );

    Ok(ReplayOutcome {
        state,
        applied,
        skipped,
        recovered_sequence,
        coerced,
    })
}

/// Apply once; on a phase mismatch, coerce the phase and retry exactly once.
/// Returns whether coercion was needed.
fn apply_with_recovery(state: &mut GameState, ev: &GameEvent) -> Result<bool, ApplyError> {
    match apply_event(state, ev) {
        Ok(()) => Ok(false),
        Err(err) if err.kind == ApplyErrorKind::PhaseMismatch => {
            let Some(expected) = ev.payload.expected_phase() else {
                return Err(err);
            };
            let original = state.phase;
            state.phase = expected;
            match apply_event(state, ev) {
                Ok(()) => {
                    warn!(
                        game_id = ev.game_id,
                        sequence_number = ev.sequence_number,
                        from = ?original,
                        to = ?expected,
                        "Applied event after phase coercion"
                    );
                    Ok(true)
                }
                Err(retry_err) => {
                    state.phase = original;
                    Err(retry_err)
                }
            }
        }
        Err(err) => Err(err),
    }
}

/// Fold one event. On error `state` is left untouched.
pub fn apply_event(state: &mut GameState, ev: &GameEvent) -> Result<(), ApplyError> {
    if ev.event_version != EVENT_VERSION {
        return Err(ApplyError::new(
            ApplyErrorKind::UnsupportedVersion,
            format!("event version {}", ev.event_version),
        ));
    }
    if ev.game_id != state.id {
        return Err(ApplyError::new(
            ApplyErrorKind::WrongGame,
            format!("event for game {} folded into game {}", ev.game_id, state.id),
        ));
    }

    let mut next = state.clone();
    apply_payload(&mut next, ev)?;
    next.refresh_derived();
    next.version = ev.sequence_number;
    *state = next;
    Ok(())
}

fn apply_payload(state: &mut GameState, ev: &GameEvent) -> Result<(), ApplyError> {
    if let Some(actor) = ev.player_id {
        if let Some(named) = payload_player(&ev.payload) {
            if named != actor {
                return Err(ApplyError::new(
                    ApplyErrorKind::PayloadMismatch,
                    format!("event actor {actor} differs from payload player {named}"),
                ));
            }
        }
    }

    match &ev.payload {
        EventPayload::GameCreated(d) => {
            require_phase(state, Phase::Waiting)?;
            if !state.players.is_empty() {
                return Err(ApplyError::new(
                    ApplyErrorKind::PayloadMismatch,
                    "game already created",
                ));
            }
            state.seed = d.seed;
            state
                .players
                .push(PlayerState::new(d.player1_id, d.username.clone()));
            Ok(())
        }
        EventPayload::PlayerJoined(d) => {
            require_phase(state, Phase::Waiting)?;
            if state.is_full() || state.player(d.player_id).is_some() {
                return Err(ApplyError::new(
                    ApplyErrorKind::PayloadMismatch,
                    format!("player {} cannot take a seat", d.player_id),
                ));
            }
            state
                .players
                .push(PlayerState::new(d.player_id, d.username.clone()));
            Ok(())
        }
        EventPayload::PlayerReady(d) => {
            let phase = state.phase;
            let player = player_mut(state, d.player_id)?;
            match phase {
                Phase::Waiting => player.is_ready = true,
                Phase::RoundOver => player.is_ready_for_next_round = true,
                other => {
                    return Err(ApplyError::new(
                        ApplyErrorKind::PhaseMismatch,
                        format!("PLAYER_READY during {other:?}"),
                    ))
                }
            }
            Ok(())
        }
        EventPayload::GameStarted(d) => apply_game_started(state, d),
        EventPayload::TakeUpcard(d) => apply_take_upcard(state, d),
        EventPayload::PassUpcard(d) => apply_pass_upcard(state, d),
        EventPayload::DrawFromStock(d) => apply_draw_stock(state, d),
        EventPayload::DrawFromDiscard(d) => apply_draw_discard(state, d),
        EventPayload::DiscardCard(d) => apply_discard(state, d),
        EventPayload::Knock(d) => apply_knock(state, d),
        EventPayload::Gin(d) => apply_gin(state, d),
        EventPayload::LayOff(d) => apply_lay_off(state, d),
        EventPayload::LayoffCompleted(d) => apply_layoff_completed(state, d),
        EventPayload::AiLayoffDecision(d) => apply_ai_layoff_decision(state, d),
        EventPayload::StartNewRound(d) => apply_start_new_round(state, d),
        EventPayload::GameFinished(d) => apply_game_finished(state, d),
    }
}

fn payload_player(payload: &EventPayload) -> Option<PlayerId> {
    match payload {
        EventPayload::GameCreated(d) => Some(d.player1_id),
        EventPayload::PlayerJoined(d) => Some(d.player_id),
        EventPayload::PlayerReady(d) => Some(d.player_id),
        EventPayload::TakeUpcard(d) => Some(d.player_id),
        EventPayload::PassUpcard(d) => Some(d.player_id),
        EventPayload::DrawFromStock(d) => Some(d.player_id),
        EventPayload::DrawFromDiscard(d) => Some(d.player_id),
        EventPayload::DiscardCard(d) => Some(d.player_id),
        EventPayload::Knock(d) => Some(d.player_id),
        EventPayload::Gin(d) => Some(d.player_id),
        EventPayload::LayOff(d) => Some(d.player_id),
        EventPayload::LayoffCompleted(d) => Some(d.player_id),
        EventPayload::AiLayoffDecision(d) => Some(d.player_id),
        EventPayload::StartNewRound(d) => Some(d.requested_by),
        EventPayload::GameStarted(_) | EventPayload::GameFinished(_) => None,
    }
}

// ---------- helpers ----------

fn require_phase(state: &GameState, phase: Phase) -> Result<(), ApplyError> {
    if state.phase == phase {
        Ok(())
    } else {
        Err(ApplyError::new(
            ApplyErrorKind::PhaseMismatch,
            format!("expected {phase:?}, state is {:?}", state.phase),
        ))
    }
}

fn require_turn(state: &GameState, player: PlayerId) -> Result<(), ApplyError> {
    if state.current_player_id == Some(player) {
        Ok(())
    } else {
        Err(ApplyError::new(
            ApplyErrorKind::OutOfTurn,
            format!(
                "player {player} acted, current player is {:?}",
                state.current_player_id
            ),
        ))
    }
}

fn player_mut(state: &mut GameState, id: PlayerId) -> Result<&mut PlayerState, ApplyError> {
    state
        .player_mut(id)
        .ok_or_else(|| ApplyError::new(ApplyErrorKind::UnknownPlayer, format!("player {id}")))
}

fn opponent(state: &GameState, id: PlayerId) -> Result<PlayerId, ApplyError> {
    state
        .opponent_of(id)
        .ok_or_else(|| ApplyError::new(ApplyErrorKind::UnknownPlayer, format!("opponent of {id}")))
}

fn mismatch(what: &str) -> ApplyError {
    ApplyError::new(ApplyErrorKind::PayloadMismatch, what)
}

fn same_cards(a: &[Card], b: &[Card]) -> bool {
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort();
    b.sort();
    a == b
}

fn remove_from_hand(state: &mut GameState, id: PlayerId, card: Card) -> Result<(), ApplyError> {
    let player = player_mut(state, id)?;
    let pos = player.hand.iter().position(|c| *c == card).ok_or_else(|| {
        ApplyError::new(
            ApplyErrorKind::CardMismatch,
            format!("{} not in hand of player {id}", card.id()),
        )
    })?;
    player.hand.remove(pos);
    Ok(())
}

fn take_into_hand(state: &mut GameState, id: PlayerId, card: Card) -> Result<(), ApplyError> {
    let player = player_mut(state, id)?;
    player.hand.push(card);
    player.last_drawn_card_id = Some(card.id());
    Ok(())
}

fn pop_discard(state: &mut GameState, expected: Card) -> Result<(), ApplyError> {
    match state.discard_pile.last() {
        Some(top) if *top == expected => {
            state.discard_pile.pop();
            Ok(())
        }
        _ => Err(ApplyError::new(
            ApplyErrorKind::CardMismatch,
            format!("{} is not the top discard", expected.id()),
        )),
    }
}

fn install_deal(state: &mut GameState, deal: &InitialDeal) -> Result<(), ApplyError> {
    if deal.player1_hand.len() != HAND_SIZE || deal.player2_hand.len() != HAND_SIZE {
        return Err(mismatch("dealt hands must hold ten cards each"));
    }
    if state.players.len() != 2 {
        return Err(ApplyError::new(
            ApplyErrorKind::UnknownPlayer,
            "deal needs two seated players",
        ));
    }
    state.players[0].hand = deal.player1_hand.clone();
    state.players[1].hand = deal.player2_hand.clone();
    state.discard_pile = vec![deal.top_discard_card];
    state.stock_pile = deal.stock_pile.clone();
    Ok(())
}

fn check_melds(melds: &[Meld], hand: &[Card]) -> Result<u32, ApplyError> {
    validate_melds(melds, hand)
        .map_err(|e| ApplyError::new(ApplyErrorKind::InvalidMeld, e.to_string()))?;
    Ok(calculate_deadwood(hand, melds))
}

fn check_final_scores(state: &GameState, final_scores: &[PlayerScore]) -> Result<(), ApplyError> {
    if state.scores() == final_scores {
        Ok(())
    } else {
        Err(mismatch("final scores disagree with folded totals"))
    }
}

/// Add a settled round to cumulative scores and move to `RoundOver` or
/// `GameOver`.
fn commit_round(
    state: &mut GameState,
    knocker: PlayerId,
    opponent_id: PlayerId,
    score: &KnockScore,
    final_scores: &[PlayerScore],
) -> Result<(), ApplyError> {
    player_mut(state, knocker)?.score += score.knocker_score;
    player_mut(state, opponent_id)?.score += score.opponent_score;
    check_final_scores(state, final_scores)?;

    let outcome = if score.is_gin {
        RoundOutcome::Gin
    } else if score.is_undercut {
        RoundOutcome::Undercut
    } else {
        RoundOutcome::Knock
    };
    let mut points = std::collections::BTreeMap::new();
    points.insert(knocker, score.knocker_score);
    points.insert(opponent_id, score.opponent_score);
    let result = RoundResult {
        round_number: state.round_number,
        outcome,
        knocker_id: Some(knocker),
        points,
    };
    let scorer = result.scorer();
    state.round_scores.push(result);
    state.pending_settlement = None;

    let totals: Vec<u32> = state.players.iter().map(|p| p.score).collect();
    if should_game_end(&totals) {
        let seats: Vec<(PlayerId, u32)> = state.players.iter().map(|p| (p.id, p.score)).collect();
        state.winner = determine_winner(&seats, scorer);
        state.phase = Phase::GameOver;
        info!(game_id = state.id, winner = ?state.winner, "Game over");
    } else {
        state.phase = Phase::RoundOver;
        info!(
            game_id = state.id,
            round = state.round_number,
            outcome = ?outcome,
            "Round settled"
        );
    }
    Ok(())
}

// ---------- per-event folds ----------

fn apply_game_started(state: &mut GameState, d: &GameStarted) -> Result<(), ApplyError> {
    require_phase(state, Phase::Waiting)?;
    if !state.is_full()
        || state.players[0].id != d.player1_id
        || state.players[1].id != d.player2_id
    {
        return Err(ApplyError::new(
            ApplyErrorKind::UnknownPlayer,
            "seated players do not match GAME_STARTED",
        ));
    }
    if opponent(state, d.dealer_id)? != d.starting_player_id {
        return Err(mismatch("starting player must be the non-dealer"));
    }
    install_deal(state, &d.initial_deal)?;
    state.status = GameStatus::Active;
    state.phase = Phase::UpcardDecision;
    state.round_number = 1;
    state.dealer_id = Some(d.dealer_id);
    state.current_player_id = Some(d.starting_player_id);
    state.upcard_passes = 0;
    Ok(())
}

fn apply_take_upcard(state: &mut GameState, d: &TakeUpcard) -> Result<(), ApplyError> {
    require_phase(state, Phase::UpcardDecision)?;
    require_turn(state, d.player_id)?;
    pop_discard(state, d.card_taken)?;
    if state.discard_pile != d.discard_pile_after {
        return Err(mismatch("discard pile after TAKE_UPCARD"));
    }
    take_into_hand(state, d.player_id, d.card_taken)?;
    state.phase = Phase::Discard;
    Ok(())
}

fn apply_pass_upcard(state: &mut GameState, d: &PassUpcard) -> Result<(), ApplyError> {
    require_phase(state, Phase::UpcardDecision)?;
    require_turn(state, d.player_id)?;
    let passes = state.upcard_passes + 1;
    if d.passes != passes {
        return Err(mismatch("upcard pass count"));
    }
    let next = if passes >= 2 {
        let dealer = state
            .dealer_id
            .ok_or_else(|| ApplyError::new(ApplyErrorKind::UnknownPlayer, "no dealer"))?;
        state.phase = Phase::Draw;
        opponent(state, dealer)?
    } else {
        opponent(state, d.player_id)?
    };
    if next != d.next_player_id {
        return Err(mismatch("next player after PASS_UPCARD"));
    }
    state.upcard_passes = passes;
    state.current_player_id = Some(next);
    Ok(())
}

fn apply_draw_stock(state: &mut GameState, d: &DrawFromStock) -> Result<(), ApplyError> {
    require_phase(state, Phase::Draw)?;
    require_turn(state, d.player_id)?;
    match state.stock_pile.last() {
        Some(top) if *top == d.card_drawn => {
            state.stock_pile.pop();
        }
        _ => {
            return Err(ApplyError::new(
                ApplyErrorKind::CardMismatch,
                format!("{} is not the top of the stock", d.card_drawn.id()),
            ))
        }
    }
    if state.stock_pile.len() != d.stock_size_after {
        return Err(mismatch("stock size after DRAW_FROM_STOCK"));
    }
    take_into_hand(state, d.player_id, d.card_drawn)?;
    state.phase = Phase::Discard;
    Ok(())
}

fn apply_draw_discard(state: &mut GameState, d: &DrawFromDiscard) -> Result<(), ApplyError> {
    require_phase(state, Phase::Draw)?;
    require_turn(state, d.player_id)?;
    pop_discard(state, d.card_drawn)?;
    if state.discard_pile != d.discard_pile_after {
        return Err(mismatch("discard pile after DRAW_FROM_DISCARD"));
    }
    take_into_hand(state, d.player_id, d.card_drawn)?;
    state.phase = Phase::Discard;
    Ok(())
}

fn apply_discard(state: &mut GameState, d: &DiscardCard) -> Result<(), ApplyError> {
    require_phase(state, Phase::Discard)?;
    require_turn(state, d.player_id)?;
    remove_from_hand(state, d.player_id, d.card_discarded)?;
    state.discard_pile.push(d.card_discarded);
    if state.discard_pile != d.discard_pile_after {
        return Err(mismatch("discard pile after DISCARD_CARD"));
    }
    let next = opponent(state, d.player_id)?;
    if next != d.next_player_id {
        return Err(mismatch("next player after DISCARD_CARD"));
    }

    let floor_reached = state.stock_pile.len() <= STOCK_FLOOR;
    if d.round_drawn != floor_reached {
        return Err(mismatch("roundDrawn disagrees with stock size"));
    }
    if d.round_drawn {
        let points = state.players.iter().map(|p| (p.id, 0)).collect();
        state.round_scores.push(RoundResult {
            round_number: state.round_number,
            outcome: RoundOutcome::Drawn,
            knocker_id: None,
            points,
        });
        state.phase = Phase::RoundOver;
        info!(
            game_id = state.id,
            round = state.round_number,
            "Round drawn, stock exhausted"
        );
    } else {
        state.phase = Phase::Draw;
        state.current_player_id = Some(next);
    }
    Ok(())
}

/// Shared KNOCK/GIN checks: discard, then verify both exposed hands.
/// Returns (knocker deadwood, opponent id, opponent deadwood).
#[allow(clippy::too_many_arguments)]
fn expose_hands(
    state: &mut GameState,
    player_id: PlayerId,
    card: Card,
    hand: &[Card],
    melds: &[Meld],
    opponent_hand: &[Card],
    opponent_melds: &[Meld],
) -> Result<(u32, PlayerId, u32), ApplyError> {
    require_phase(state, Phase::Discard)?;
    require_turn(state, player_id)?;
    remove_from_hand(state, player_id, card)?;
    state.discard_pile.push(card);

    let opponent_id = opponent(state, player_id)?;
    let knocker_hand = player_mut(state, player_id)?.hand.clone();
    if !same_cards(&knocker_hand, hand) {
        return Err(mismatch("knocker hand"));
    }
    let actual_opponent = player_mut(state, opponent_id)?.hand.clone();
    if !same_cards(&actual_opponent, opponent_hand) {
        return Err(mismatch("opponent hand"));
    }
    let knocker_deadwood = check_melds(melds, &knocker_hand)?;
    let opponent_deadwood = check_melds(opponent_melds, &actual_opponent)?;
    Ok((knocker_deadwood, opponent_id, opponent_deadwood))
}

fn apply_knock(state: &mut GameState, d: &Knock) -> Result<(), ApplyError> {
    let (knocker_deadwood, opponent_id, opponent_deadwood) = expose_hands(
        state,
        d.player_id,
        d.card_discarded,
        &d.knocker_hand,
        &d.knocker_melds,
        &d.opponent_hand,
        &d.opponent_melds,
    )?;
    if knocker_deadwood != d.deadwood_value
        || knocker_deadwood == 0
        || knocker_deadwood > KNOCK_LIMIT
    {
        return Err(mismatch("knock deadwood"));
    }
    if opponent_deadwood != d.opponent_deadwood {
        return Err(mismatch("opponent deadwood"));
    }
    let preview = score_from_deadwood(knocker_deadwood, opponent_deadwood);
    if preview != d.scores {
        return Err(mismatch("provisional knock score"));
    }

    player_mut(state, d.player_id)?.has_knocked = true;
    state.last_knocker = Some(d.player_id);
    state.last_knocker_melds = d.knocker_melds.clone();
    state.last_lay_offs.clear();
    state.pending_settlement = Some(PendingSettlement {
        knocker_id: d.player_id,
        opponent_id,
        knocker_deadwood,
        opponent_deadwood_before: opponent_deadwood,
        opponent_melds: d.opponent_melds.clone(),
        preview,
    });
    state.phase = Phase::Layoff;
    state.current_player_id = Some(opponent_id);
    Ok(())
}

fn apply_gin(state: &mut GameState, d: &Gin) -> Result<(), ApplyError> {
    let (knocker_deadwood, opponent_id, opponent_deadwood) = expose_hands(
        state,
        d.player_id,
        d.card_discarded,
        &d.ginner_hand,
        &d.ginner_melds,
        &d.opponent_hand,
        &d.opponent_melds,
    )?;
    if knocker_deadwood != 0 {
        return Err(mismatch("gin with deadwood"));
    }
    let score = score_from_deadwood(0, opponent_deadwood);
    if score != d.scores {
        return Err(mismatch("gin score"));
    }

    player_mut(state, d.player_id)?.has_gin = true;
    state.last_knocker = Some(d.player_id);
    state.last_knocker_melds = d.ginner_melds.clone();
    state.last_lay_offs.clear();
    commit_round(state, d.player_id, opponent_id, &score, &d.final_scores)
}

fn require_settlement(state: &GameState, actor: PlayerId) -> Result<PendingSettlement, ApplyError> {
    require_phase(state, Phase::Layoff)?;
    let pending = state
        .pending_settlement
        .clone()
        .ok_or_else(|| mismatch("no pending settlement"))?;
    if pending.opponent_id != actor {
        return Err(ApplyError::new(
            ApplyErrorKind::OutOfTurn,
            format!("player {actor} may not lay off"),
        ));
    }
    Ok(pending)
}

fn fold_layoff(
    state: &mut GameState,
    pending: &PendingSettlement,
    layoff: &LayOff,
) -> Result<Meld, ApplyError> {
    let pool = layoff_pool(state, pending)
        .map_err(|e| ApplyError::new(ApplyErrorKind::UnknownPlayer, e.to_string()))?;
    let extended = check_layoff(layoff, &state.last_knocker_melds, &pool)
        .map_err(|e| ApplyError::new(ApplyErrorKind::InvalidMeld, e.to_string()))?;
    state.last_knocker_melds[layoff.target_meld] = extended.clone();
    state.last_lay_offs.push(layoff.clone());
    Ok(extended)
}

fn settled_score(state: &GameState, pending: &PendingSettlement) -> KnockScore {
    let laid: u32 = state.last_lay_offs.iter().map(LayOff::value).sum();
    settle_with_layoffs(
        pending.knocker_deadwood,
        pending.opponent_deadwood_before,
        laid,
    )
}

fn apply_lay_off(state: &mut GameState, d: &LayOffCards) -> Result<(), ApplyError> {
    let pending = require_settlement(state, d.player_id)?;
    let layoff = LayOff {
        cards_layed_off: d.cards_layed_off.clone(),
        target_meld: d.target_meld,
    };
    let extended = fold_layoff(state, &pending, &layoff)?;
    if extended != d.meld_after {
        return Err(mismatch("meld after LAY_OFF"));
    }
    Ok(())
}

fn apply_layoff_completed(state: &mut GameState, d: &LayoffCompleted) -> Result<(), ApplyError> {
    let pending = require_settlement(state, d.player_id)?;
    if state.last_lay_offs != d.layoffs {
        return Err(mismatch("lay-off summary"));
    }
    let score = settled_score(state, &pending);
    if score != d.scores {
        return Err(mismatch("settled score"));
    }
    commit_round(
        state,
        pending.knocker_id,
        pending.opponent_id,
        &score,
        &d.final_scores,
    )
}

fn apply_ai_layoff_decision(
    state: &mut GameState,
    d: &AiLayoffDecision,
) -> Result<(), ApplyError> {
    let pending = require_settlement(state, d.player_id)?;
    for layoff in &d.layoffs {
        fold_layoff(state, &pending, layoff)?;
    }
    let score = settled_score(state, &pending);
    if score != d.scores {
        return Err(mismatch("settled score"));
    }
    commit_round(
        state,
        pending.knocker_id,
        pending.opponent_id,
        &score,
        &d.final_scores,
    )
}

fn apply_start_new_round(state: &mut GameState, d: &StartNewRound) -> Result<(), ApplyError> {
    require_phase(state, Phase::RoundOver)?;
    if d.round_number != state.round_number + 1 {
        return Err(mismatch("round number"));
    }
    let expected_dealer =
        next_dealer(state).map_err(|e| ApplyError::new(ApplyErrorKind::UnknownPlayer, e.to_string()))?;
    if d.dealer_id != expected_dealer || opponent(state, d.dealer_id)? != d.starting_player_id {
        return Err(mismatch("dealer rotation"));
    }
    install_deal(state, &d.new_deal)?;
    for p in &mut state.players {
        p.reset_for_round();
    }
    state.round_number = d.round_number;
    state.dealer_id = Some(d.dealer_id);
    state.current_player_id = Some(d.starting_player_id);
    state.upcard_passes = 0;
    state.last_knocker = None;
    state.last_knocker_melds.clear();
    state.last_lay_offs.clear();
    state.pending_settlement = None;
    state.phase = Phase::UpcardDecision;
    Ok(())
}

fn apply_game_finished(state: &mut GameState, d: &GameFinished) -> Result<(), ApplyError> {
    require_phase(state, Phase::GameOver)?;
    if state.winner != Some(d.winner_id) {
        return Err(mismatch("winner"));
    }
    check_final_scores(state, &d.final_scores)?;
    state.status = GameStatus::Finished;
    state.game_over = true;
    Ok(())
}
