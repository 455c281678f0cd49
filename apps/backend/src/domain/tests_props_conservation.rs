//! Property-based tests over whole games driven by random legal actions.
//! Every reachable state must conserve the deck, and replay must reproduce
//! what incremental application built.

use proptest::prelude::*;

use crate::domain::dealing::deal_round;
use crate::domain::player_view::VisibleGameState;
use crate::domain::replay::{apply_event, check_card_conservation, replay};
use crate::domain::state::Phase;
use crate::domain::test_state_helpers::{Stream, P1};
use crate::domain::{test_gens, test_prelude, Card};

/// Drive `s` with legal actions chosen by `picks`; stops early at game over.
fn drive(s: &mut Stream, picks: &[usize]) {
    for pick in picks {
        if s.state.phase == Phase::GameOver {
            break;
        }
        let actor = s.state.current_player_id.unwrap_or(P1);
        let view = VisibleGameState::for_player(&s.state, actor).unwrap();
        let legal = view.legal_actions();
        if legal.is_empty() {
            break;
        }
        let action = legal[pick % legal.len()].clone();
        s.act(actor, action).unwrap();
    }
}

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    #[test]
    fn prop_every_deal_conserves_the_deck(seed in any::<u64>()) {
        let d = deal_round(seed);
        let mut all: Vec<Card> = d.player1_hand.clone();
        all.extend(&d.player2_hand);
        all.push(d.upcard);
        all.extend(&d.stock);
        all.sort();
        all.dedup();
        prop_assert_eq!(all.len(), 52);
    }

    #[test]
    fn prop_legal_play_conserves_cards(seed in test_gens::seed(), picks in test_gens::action_picks(120)) {
        let mut s = Stream::started(seed);
        drive(&mut s, &picks);
        prop_assert!(check_card_conservation(&s.state).is_ok());
    }

    #[test]
    fn prop_replay_is_deterministic(seed in test_gens::seed(), picks in test_gens::action_picks(80)) {
        let mut s = Stream::started(seed);
        drive(&mut s, &picks);
        let a = replay(&s.events).unwrap();
        let b = replay(&s.events).unwrap();
        prop_assert_eq!(&a.state, &b.state);
        prop_assert_eq!(&a.state, &s.state);
        prop_assert!(a.skipped.is_empty());
    }

    /// Folding [1..n] then applying n+1 equals folding [1..n+1].
    #[test]
    fn prop_prefix_replay_is_incremental(seed in test_gens::seed(), picks in test_gens::action_picks(60)) {
        let mut s = Stream::started(seed);
        drive(&mut s, &picks);
        let n = s.events.len() - 1;
        let mut prefix = replay(&s.events[..n]).unwrap().state;
        apply_event(&mut prefix, &s.events[n]).unwrap();
        prop_assert_eq!(prefix, replay(&s.events).unwrap().state);
    }
}
