use crate::domain::events::EventPayload;
use crate::domain::melds::{Meld, MeldKind};
use crate::domain::moves::{check_knock, validate_move, GameAction, MoveContext};
use crate::domain::state::Phase;
use crate::domain::test_state_helpers::{card, cards, Stream, P1, P2};
use crate::errors::domain::ValidationKind;

fn ctx<'a>(phase: Phase, hand: &'a [crate::domain::Card], discard: &'a [crate::domain::Card]) -> MoveContext<'a> {
    MoveContext {
        phase,
        current_player_id: Some(P1),
        actor_id: P1,
        hand,
        discard_pile: discard,
        stock_count: 20,
    }
}

#[test]
fn turn_is_checked_before_phase() {
    let hand = cards(&["AS"]);
    let mut c = ctx(Phase::Waiting, &hand, &[]);
    c.actor_id = P2;
    let err = validate_move(&GameAction::DrawStock, &c).unwrap_err();
    assert!(err.is_validation(&ValidationKind::OutOfTurn));
}

#[test]
fn new_round_and_ai_layoff_bypass_turn() {
    let hand = cards(&["AS"]);
    let mut c = ctx(Phase::RoundOver, &hand, &[]);
    c.actor_id = P2;
    assert!(validate_move(&GameAction::StartNewRound, &c).is_ok());

    c.phase = Phase::Layoff;
    let decision = GameAction::AiLayoffDecision { layoffs: vec![] };
    assert!(validate_move(&decision, &c).is_ok());
}

#[test]
fn draw_requires_draw_phase_and_cards() {
    let hand = cards(&["AS"]);
    let discard = cards(&["KD"]);
    let c = ctx(Phase::Discard, &hand, &discard);
    assert!(validate_move(&GameAction::DrawStock, &c)
        .unwrap_err()
        .is_validation(&ValidationKind::PhaseMismatch));

    let mut c = ctx(Phase::Draw, &hand, &[]);
    assert!(validate_move(&GameAction::DrawDiscard, &c)
        .unwrap_err()
        .is_validation(&ValidationKind::EmptyDiscardPile));
    c.stock_count = 0;
    assert!(validate_move(&GameAction::DrawStock, &c)
        .unwrap_err()
        .is_validation(&ValidationKind::EmptyStock));

    let c = ctx(Phase::UpcardDecision, &hand, &discard);
    assert!(validate_move(&GameAction::DrawStock, &c).is_err());
    assert!(validate_move(&GameAction::DrawDiscard, &c).is_ok());
}

#[test]
fn discard_requires_card_in_hand() {
    let hand = cards(&["AS", "2S"]);
    let c = ctx(Phase::Discard, &hand, &[]);
    assert!(validate_move(&GameAction::Discard { card: card("2S") }, &c).is_ok());
    assert!(validate_move(&GameAction::Discard { card: card("3S") }, &c)
        .unwrap_err()
        .is_validation(&ValidationKind::CardNotInHand));
}

#[test]
fn knock_and_gin_thresholds() {
    // after discarding KC: A-2-3S, 4-5-6H, 9C-9D-9H and 2C = 2 deadwood
    let hand = cards(&["AS", "2S", "3S", "4H", "5H", "6H", "9C", "9D", "9H", "2C", "KC"]);
    let knock = check_knock(&hand, card("KC"), None, false).unwrap();
    assert_eq!(knock.deadwood, 2);
    assert_eq!(knock.hand_after.len(), 10);

    let err = check_knock(&hand, card("KC"), None, true).unwrap_err();
    assert!(err.is_validation(&ValidationKind::NotGin));

    // discarding 2C instead leaves KC: 10 deadwood, still a knock
    assert_eq!(check_knock(&hand, card("2C"), None, false).unwrap().deadwood, 10);

    // discarding a meld card leaves too much
    let err = check_knock(&hand, card("9C"), None, false).unwrap_err();
    assert!(err.is_validation(&ValidationKind::DeadwoodTooHigh));
}

#[test]
fn knock_with_declared_melds_is_checked() {
    let hand = cards(&["AS", "2S", "3S", "4H", "5H", "6H", "9C", "9D", "9H", "2C", "KC"]);
    let bogus = vec![Meld::new(MeldKind::Run, cards(&["9C", "9D", "9H"]))];
    let err = check_knock(&hand, card("KC"), Some(&bogus), false).unwrap_err();
    assert!(err.is_validation(&ValidationKind::InvalidMeld));

    // valid but incomplete melds leave too much deadwood
    let partial = vec![Meld::new(MeldKind::Set, cards(&["9C", "9D", "9H"]))];
    let err = check_knock(&hand, card("KC"), Some(&partial), false).unwrap_err();
    assert!(err.is_validation(&ValidationKind::DeadwoodTooHigh));
}

#[test]
fn decided_events_carry_derived_payloads() {
    let mut s = Stream::started(42);
    assert_eq!(s.state.phase, Phase::UpcardDecision);
    assert_eq!(s.current(), P2);

    // the dealer cannot act first
    let err = s.act(P1, GameAction::PassUpcard).unwrap_err();
    assert!(err.is_validation(&ValidationKind::OutOfTurn));

    let upcard = s.state.top_discard().unwrap();
    let ev = s.act(P2, GameAction::DrawDiscard).unwrap().clone();
    match ev.payload {
        EventPayload::TakeUpcard(d) => {
            assert_eq!(d.card_taken, upcard);
            assert!(d.discard_pile_after.is_empty());
        }
        other => panic!("expected TAKE_UPCARD, got {:?}", other.event_type()),
    }
    assert_eq!(s.state.phase, Phase::Discard);
    assert_eq!(s.hand(P2).len(), 11);
    assert_eq!(ev.sequence_number, s.state.version);
}

#[test]
fn start_requires_ready_players() {
    let mut s = Stream::created(3);
    let err = s.act(P1, GameAction::StartGame).unwrap_err();
    assert!(err.is_validation(&ValidationKind::PlayersNotReady));

    s.act(P2, GameAction::Join { username: "bob".into() }).unwrap();
    let err = s.act(P2, GameAction::Join { username: "bob".into() }).unwrap_err();
    assert!(err.is_validation(&ValidationKind::AlreadySeated));
    let err = s.act(303, GameAction::Join { username: "carol".into() }).unwrap_err();
    assert!(err.is_validation(&ValidationKind::GameFull));

    s.act(P1, GameAction::SetReady).unwrap();
    let err = s.act(P1, GameAction::StartGame).unwrap_err();
    assert!(err.is_validation(&ValidationKind::PlayersNotReady));
}
