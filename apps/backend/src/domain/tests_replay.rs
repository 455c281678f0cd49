use time::Duration;

use crate::domain::actions::{game_finished_event, validate_action};
use crate::domain::events::{DrawFromStock, EventPayload, EventType};
use crate::domain::melds::Meld;
use crate::domain::moves::GameAction;
use crate::domain::replay::{
    apply_event, decode_event, replay, replay_from, ApplyErrorKind, ReplayError, StateSnapshot,
};
use crate::domain::state::{GameStatus, Phase, RoundOutcome};
use crate::domain::test_state_helpers::{card, t0, Stream, P1, P2};
use crate::domain::Card;

const KNOCKER: [&str; 10] = ["AS", "2S", "3S", "4H", "5H", "6H", "9C", "9D", "9H", "KC"];
// J-Q-KD melded; 7H 8H 9S TC 4C 6D 8C = 52 deadwood
const LAYER: [&str; 10] = ["7H", "8H", "9S", "QD", "JD", "TC", "4C", "6D", "8C", "KD"];

fn meld_index(melds: &[Meld], c: Card) -> usize {
    melds.iter().position(|m| m.contains(c)).unwrap()
}

/// P2 takes the 2C upcard and knocks with 2 deadwood.
fn knocked() -> Stream {
    let mut s = Stream::started_with_hands(&LAYER, &KNOCKER, "2C");
    s.act(P2, GameAction::TakeUpcard).unwrap();
    s.act(
        P2,
        GameAction::Knock {
            card: card("KC"),
            melds: None,
        },
    )
    .unwrap();
    s
}

#[test]
fn two_passes_hand_the_draw_to_the_non_dealer() {
    let mut s = Stream::started(11);
    assert_eq!(s.state.dealer_id, Some(P1));
    s.act(P2, GameAction::PassUpcard).unwrap();
    assert_eq!(s.state.phase, Phase::UpcardDecision);
    assert_eq!(s.current(), P1);
    s.act(P1, GameAction::PassUpcard).unwrap();
    assert_eq!(s.state.phase, Phase::Draw);
    assert_eq!(s.current(), P2);

    let folded = replay(&s.events).unwrap();
    assert_eq!(folded.state, s.state);
    assert_eq!(folded.applied, s.events.len());
    assert!(folded.skipped.is_empty());
}

#[test]
fn knock_defers_score_until_layoffs_complete() {
    let mut s = knocked();
    assert_eq!(s.state.phase, Phase::Layoff);
    assert_eq!(s.current(), P1);
    let pending = s.state.pending_settlement.clone().unwrap();
    assert_eq!(pending.knocker_deadwood, 2);
    assert_eq!(pending.opponent_deadwood_before, 52);
    assert_eq!(pending.preview.knocker_score, 50);
    assert_eq!(s.state.player(P2).unwrap().score, 0);

    // knocker cannot lay off
    assert!(s
        .act(
            P2,
            GameAction::LayOff {
                cards: vec![card("7H")],
                target_meld: 0
            }
        )
        .is_err());

    let run = meld_index(&s.state.last_knocker_melds, card("4H"));
    let set = meld_index(&s.state.last_knocker_melds, card("9C"));
    for (c, target) in [("7H", run), ("8H", run), ("9S", set)] {
        s.act(
            P1,
            GameAction::LayOff {
                cards: vec![card(c)],
                target_meld: target,
            },
        )
        .unwrap();
    }
    assert_eq!(s.state.last_knocker_melds[run].cards.len(), 5);

    // a card laid off once is gone from the pool
    assert!(s
        .act(
            P1,
            GameAction::LayOff {
                cards: vec![card("9S")],
                target_meld: set
            }
        )
        .is_err());

    s.act(P1, GameAction::CompleteLayoff).unwrap();
    assert_eq!(s.state.phase, Phase::RoundOver);
    assert!(s.state.pending_settlement.is_none());
    // 52 - 24 laid off = 28, minus 2
    assert_eq!(s.state.player(P2).unwrap().score, 26);
    assert_eq!(s.state.player(P1).unwrap().score, 0);
    let result = s.state.round_scores.last().unwrap();
    assert_eq!(result.outcome, RoundOutcome::Knock);
    assert_eq!(result.scorer(), Some(P2));

    assert_eq!(replay(&s.events).unwrap().state, s.state);
}

#[test]
fn ai_layoff_decision_settles_in_one_event() {
    let mut s = knocked();
    let run = meld_index(&s.state.last_knocker_melds, card("4H"));
    let layoffs = vec![crate::domain::layoffs::LayOff {
        cards_layed_off: vec![card("8H"), card("7H")],
        target_meld: run,
    }];
    s.act(P1, GameAction::AiLayoffDecision { layoffs }).unwrap();
    assert_eq!(s.state.phase, Phase::RoundOver);
    // 52 - 15 = 37, minus 2
    assert_eq!(s.state.player(P2).unwrap().score, 35);
    assert_eq!(replay(&s.events).unwrap().state, s.state);
}

#[test]
fn loser_deals_the_next_round() {
    let mut s = knocked();
    s.act(P1, GameAction::CompleteLayoff).unwrap();
    assert_eq!(s.state.player(P2).unwrap().score, 50);

    s.act(P1, GameAction::SetReady).unwrap();
    assert!(s.state.player(P1).unwrap().is_ready_for_next_round);

    // either seat may ask for the next round
    s.act(P1, GameAction::StartNewRound).unwrap();
    assert_eq!(s.state.round_number, 2);
    assert_eq!(s.state.dealer_id, Some(P1));
    assert_eq!(s.current(), P2);
    assert_eq!(s.state.phase, Phase::UpcardDecision);
    assert!(!s.state.player(P1).unwrap().is_ready_for_next_round);
    assert!(s.state.last_knocker_melds.is_empty());
    assert_eq!(s.hand(P1).len(), 10);
    assert_eq!(s.state.stock_pile.len(), 31);

    assert_eq!(replay(&s.events).unwrap().state, s.state);
}

#[test]
fn gin_settles_immediately() {
    let layer = ["QD", "JD", "KD", "TC", "4C", "6D", "8C", "9S", "8H", "2D"];
    let mut s = Stream::started_with_hands(&layer, &KNOCKER, "7H");
    s.act(P2, GameAction::TakeUpcard).unwrap();
    let ev = s
        .act(
            P2,
            GameAction::Knock {
                card: card("KC"),
                melds: None,
            },
        )
        .unwrap();
    assert!(matches!(ev.payload, EventPayload::Gin(_)));
    assert_eq!(s.state.phase, Phase::RoundOver);
    assert_eq!(s.state.player(P2).unwrap().score, 72);
    assert!(s.state.player(P2).unwrap().has_gin);
    assert_eq!(s.state.round_scores[0].outcome, RoundOutcome::Gin);
    assert_eq!(replay(&s.events).unwrap().state, s.state);
}

#[test]
fn crossing_the_target_ends_the_game() {
    let layer = ["QD", "JD", "KD", "TC", "4C", "6D", "8C", "9S", "8H", "2D"];
    let mut s = Stream::started_with_hands(&layer, &KNOCKER, "7H");
    s.state.player_mut(P2).unwrap().score = 60;
    s.act(P2, GameAction::TakeUpcard).unwrap();
    s.act(
        P2,
        GameAction::Gin {
            card: card("KC"),
            melds: None,
        },
    )
    .unwrap();
    assert_eq!(s.state.phase, Phase::GameOver);
    assert_eq!(s.state.winner, Some(P2));

    let err = s.act(P1, GameAction::StartNewRound).unwrap_err();
    assert!(err.is_validation(&crate::errors::domain::ValidationKind::GameOver));

    let fin = game_finished_event(&s.state, t0()).unwrap();
    s.push(fin);
    assert_eq!(s.state.status, GameStatus::Finished);
    assert!(s.state.game_over);
    assert!(game_finished_event(&s.state, t0()).is_none());
}

#[test]
fn exhausted_stock_draws_the_round() {
    let mut s = Stream::started(5);
    s.act(P2, GameAction::PassUpcard).unwrap();
    s.act(P1, GameAction::PassUpcard).unwrap();
    while s.state.phase != Phase::RoundOver {
        let actor = s.current();
        s.act(actor, GameAction::DrawStock).unwrap();
        let drawn = s.state.player(actor).unwrap().last_drawn_card_id.clone().unwrap();
        let drawn = crate::domain::parse_card_id(&drawn).unwrap();
        s.act(actor, GameAction::Discard { card: drawn }).unwrap();
    }
    assert_eq!(s.state.stock_pile.len(), 2);
    let result = s.state.round_scores.last().unwrap();
    assert_eq!(result.outcome, RoundOutcome::Drawn);
    assert!(result.points.values().all(|p| *p == 0));

    // a drawn round keeps the dealer
    s.act(P2, GameAction::StartNewRound).unwrap();
    assert_eq!(s.state.dealer_id, Some(P1));
    assert_eq!(replay(&s.events).unwrap().state, s.state);
}

#[test]
fn snapshot_plus_tail_equals_full_replay() {
    let mut s = Stream::started(19);
    s.act(P2, GameAction::PassUpcard).unwrap();
    let snap = StateSnapshot {
        state: s.state.clone(),
        sequence_number: s.state.version,
    };
    let cut = s.events.len();
    s.act(P1, GameAction::PassUpcard).unwrap();
    s.act(P2, GameAction::DrawStock).unwrap();

    let from_snapshot = replay_from(Some(&snap), &s.events[cut..]).unwrap();
    assert_eq!(from_snapshot.state, replay(&s.events).unwrap().state);

    // events at or before the snapshot are ignored
    let from_all = replay_from(Some(&snap), &s.events).unwrap();
    assert!(!from_all.recovered_sequence);
    assert_eq!(from_all.state, s.state);
}

#[test]
fn disordered_and_duplicated_sequence_is_recovered() {
    let mut s = Stream::started(23);
    s.act(P2, GameAction::PassUpcard).unwrap();

    let mut events = s.events.clone();
    let mut dup = events[3].clone();
    dup.created_at = t0() + Duration::seconds(5);
    events.push(dup);
    let mut stray = events[0].clone();
    stray.sequence_number = 0;
    events.push(stray);
    events.reverse();

    let out = replay(&events).unwrap();
    assert!(out.recovered_sequence);
    assert_eq!(out.state, s.state);
}

#[test]
fn gap_is_fatal() {
    let s = Stream::started(29);
    let mut events = s.events.clone();
    events.remove(2);
    assert_eq!(
        replay(&events).unwrap_err(),
        ReplayError::SequenceGap {
            expected: 3,
            found: 4
        }
    );
}

#[test]
fn stream_must_open_with_game_created() {
    assert_eq!(replay(&[]).unwrap_err(), ReplayError::EmptyStream);

    let s = Stream::lobby(31);
    let mut events: Vec<_> = s.events[1..].to_vec();
    for (i, ev) in events.iter_mut().enumerate() {
        ev.sequence_number = i as i64 + 1;
    }
    assert!(matches!(
        replay(&events).unwrap_err(),
        ReplayError::MissingGameCreated { .. }
    ));
}

#[test]
fn bad_event_is_skipped_after_one_coercion_attempt() {
    let s = Stream::started(37);
    let wrong = s
        .state
        .stock_pile
        .first()
        .copied()
        .unwrap();
    let bogus = crate::domain::events::create_game_event(
        s.state.id,
        Some(P2),
        s.state.version + 1,
        EventPayload::DrawFromStock(DrawFromStock {
            player_id: P2,
            card_drawn: wrong,
            stock_size_after: 30,
        }),
        t0(),
    );
    let mut events = s.events.clone();
    events.push(bogus);

    let out = replay(&events).unwrap();
    assert_eq!(out.skipped.len(), 1);
    assert_eq!(out.skipped[0].error.kind, ApplyErrorKind::CardMismatch);
    assert_eq!(out.state.phase, Phase::UpcardDecision);
    assert_eq!(out.state.version, s.state.version + 1);
    let mut expected = s.state.clone();
    expected.version += 1;
    assert_eq!(out.state, expected);
}

#[test]
fn phase_coercion_recovers_a_drifted_snapshot() {
    let s = Stream::started(41);
    let pass = validate_action(&s.state, P2, &GameAction::PassUpcard, t0()).unwrap();

    let mut drifted = s.state.clone();
    drifted.phase = Phase::Draw;
    let snap = StateSnapshot {
        sequence_number: drifted.version,
        state: drifted,
    };
    let out = replay_from(Some(&snap), &[pass]).unwrap();
    assert_eq!(out.coerced, 1);
    assert!(out.skipped.is_empty());
    assert_eq!(out.state.phase, Phase::UpcardDecision);
    assert_eq!(out.state.upcard_passes, 1);
    assert_eq!(out.state.current_player_id, Some(P1));
}

#[test]
fn duplicate_deal_mid_round_is_skipped_not_coerced() {
    let mut s = Stream::started(29);
    s.act(P2, GameAction::PassUpcard).unwrap();
    s.act(P1, GameAction::PassUpcard).unwrap();
    s.act(P2, GameAction::DrawStock).unwrap();
    assert_eq!(s.state.phase, Phase::Discard);

    let mut stale = s
        .events
        .iter()
        .find(|e| e.event_type() == EventType::GameStarted)
        .cloned()
        .unwrap();
    stale.sequence_number = s.state.version + 1;
    let mut events = s.events.clone();
    events.push(stale);

    let out = replay(&events).unwrap();
    assert_eq!(out.coerced, 0);
    assert_eq!(out.skipped.len(), 1);
    assert_eq!(out.skipped[0].event_type, EventType::GameStarted);
    assert_eq!(out.skipped[0].error.kind, ApplyErrorKind::PhaseMismatch);

    let mut expected = s.state.clone();
    expected.version += 1;
    assert_eq!(out.state, expected);
    assert_eq!(out.state.player(P2).unwrap().hand.len(), 11);
}

#[test]
fn lifecycle_events_are_never_phase_coerced() {
    let s = Stream::started(31);
    for ev in &s.events {
        assert_eq!(ev.payload.expected_phase(), None, "{:?}", ev.event_type());
    }
    let pass = validate_action(&s.state, P2, &GameAction::PassUpcard, t0()).unwrap();
    assert_eq!(pass.payload.expected_phase(), Some(Phase::UpcardDecision));
}

#[test]
fn unknown_event_version_is_not_folded() {
    let s = Stream::started(43);
    let mut pass = validate_action(&s.state, P2, &GameAction::PassUpcard, t0()).unwrap();
    pass.event_version = 2;

    let mut state = s.state.clone();
    let err = apply_event(&mut state, &pass).unwrap_err();
    assert_eq!(err.kind, ApplyErrorKind::UnsupportedVersion);
    assert_eq!(state, s.state);
}

#[test]
fn duplicated_card_fails_conservation() {
    let s = Stream::started(47);
    let mut broken = s.state.clone();
    let dup = broken.players[0].hand[0];
    broken.stock_pile.push(dup);
    let snap = StateSnapshot {
        sequence_number: broken.version,
        state: broken,
    };
    assert!(matches!(
        replay_from(Some(&snap), &[]).unwrap_err(),
        ReplayError::CardConservation { .. }
    ));
}

#[test]
fn malformed_card_id_fails_decoding() {
    let mut s = Stream::started_with_hands(&LAYER, &KNOCKER, "2C");
    let ev = s.act(P2, GameAction::TakeUpcard).unwrap().clone();
    let raw = serde_json::to_string(&ev).unwrap();
    assert_eq!(decode_event(&raw).unwrap(), ev);

    let tampered = raw.replace("\"clubs_2\"", "\"clubs_Z\"");
    assert!(matches!(
        decode_event(&tampered).unwrap_err(),
        ReplayError::Decode(_)
    ));
}
