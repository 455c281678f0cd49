//! Property-based tests for the meld search and knock checks.

use proptest::prelude::*;

use crate::domain::cards_logic::hand_value;
use crate::domain::melds::{calculate_deadwood, find_optimal_melds, validate_melds};
use crate::domain::moves::check_knock;
use crate::domain::rules::KNOCK_LIMIT;
use crate::domain::{test_gens, test_prelude};

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Property: the reported melds are legal, disjoint, drawn from the hand,
    /// and account for exactly the reported deadwood.
    #[test]
    fn prop_optimal_melds_are_consistent(hand in test_gens::meldy_hand()) {
        let a = find_optimal_melds(&hand);
        prop_assert!(validate_melds(&a.melds, &hand).is_ok());
        prop_assert_eq!(calculate_deadwood(&hand, &a.melds), a.deadwood);
        prop_assert_eq!(hand_value(&a.deadwood_cards), a.deadwood);
        let melded: usize = a.melds.iter().map(|m| m.cards.len()).sum();
        prop_assert_eq!(melded + a.deadwood_cards.len(), hand.len());
    }

    /// Property: melding never costs points.
    #[test]
    fn prop_optimal_never_worse_than_no_melds(hand in test_gens::full_hand()) {
        prop_assert!(find_optimal_melds(&hand).deadwood <= hand_value(&hand));
    }

    /// Property: adding a card never raises the optimal deadwood by more
    /// than that card's own value.
    #[test]
    fn prop_extra_card_bounded(cards in test_gens::unique_cards(11)) {
        let (last, rest) = cards.split_last().unwrap();
        let before = find_optimal_melds(rest).deadwood;
        let after = find_optimal_melds(&cards).deadwood;
        prop_assert!(after <= before + crate::domain::card_value(*last));
    }

    /// Property: gin means zero deadwood, and any accepted knock is at or
    /// under the limit.
    #[test]
    fn prop_knock_and_gin_thresholds(hand in test_gens::full_hand(), pick in 0usize..11) {
        let card = hand[pick];
        match check_knock(&hand, card, None, false) {
            Ok(k) => prop_assert!(k.deadwood <= KNOCK_LIMIT),
            Err(_) => {
                let rest: Vec<_> = hand.iter().copied().filter(|c| *c != card).collect();
                prop_assert!(find_optimal_melds(&rest).deadwood > KNOCK_LIMIT);
            }
        }
        match check_knock(&hand, card, None, true) {
            Ok(k) => prop_assert_eq!(k.deadwood, 0),
            Err(_) => {
                let rest: Vec<_> = hand.iter().copied().filter(|c| *c != card).collect();
                prop_assert!(find_optimal_melds(&rest).deadwood > 0);
            }
        }
    }

    /// Property: a lone card is all deadwood.
    #[test]
    fn prop_single_card_is_deadwood(card in test_gens::card()) {
        let a = find_optimal_melds(&[card]);
        prop_assert!(a.melds.is_empty());
        prop_assert_eq!(a.deadwood, crate::domain::card_value(card));
    }

    /// Property: a dealt hand with zero deadwood is fully melded, and its
    /// deadwood cards are exactly the cards outside the melds.
    #[test]
    fn prop_dealt_hand_partitions(hand in test_gens::hand()) {
        let a = find_optimal_melds(&hand);
        for card in &hand {
            let melded = a.melds.iter().any(|m| m.contains(*card));
            prop_assert_ne!(melded, a.deadwood_cards.contains(card));
        }
        if a.deadwood == 0 {
            prop_assert!(a.deadwood_cards.is_empty());
        }
    }
}
