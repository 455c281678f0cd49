use crate::domain::cards_parsing::try_parse_cards;
use crate::domain::melds::{
    calculate_deadwood, can_knock, find_optimal_melds, has_gin, unmelded_cards, validate_melds,
    Meld, MeldKind,
};
use crate::domain::Card;
use crate::errors::domain::ValidationKind;

fn cards(tokens: &[&str]) -> Vec<Card> {
    try_parse_cards(tokens).unwrap()
}

#[test]
fn mixed_runs_and_set_make_gin() {
    // A-2-3H, 4D-4C-4S, 5-6-7-8H
    let hand = cards(&["AH", "2H", "3H", "4D", "4C", "4S", "5H", "6H", "7H", "8H"]);
    let a = find_optimal_melds(&hand);
    assert_eq!(a.deadwood, 0);
    assert!(a.deadwood_cards.is_empty());
    assert!(has_gin(&hand));
    assert!(validate_melds(&a.melds, &hand).is_ok());
    let covered: usize = a.melds.iter().map(|m| m.cards.len()).sum();
    assert_eq!(covered, 10);
}

#[test]
fn face_cards_count_ten_and_ace_one() {
    let hand = cards(&["KS", "QH", "AD", "5C"]);
    let a = find_optimal_melds(&hand);
    assert_eq!(a.deadwood, 26);
    assert_eq!(a.deadwood_cards.len(), 4);
}

#[test]
fn runs_do_not_wrap_around_king() {
    let hand = cards(&["QS", "KS", "AS"]);
    assert_eq!(find_optimal_melds(&hand).deadwood, 21);
}

#[test]
fn four_card_set_beats_splitting() {
    let hand = cards(&["9C", "9D", "9H", "9S", "2C"]);
    let a = find_optimal_melds(&hand);
    assert_eq!(a.deadwood, 2);
    assert_eq!(a.melds.len(), 1);
    assert_eq!(a.melds[0].kind, MeldKind::Set);
    assert_eq!(a.melds[0].cards.len(), 4);
}

#[test]
fn shared_card_goes_where_it_saves_most() {
    // 8S can complete 6-7-8S or 8S-8D-8C; the run leaves 8D 8C (16),
    // the set leaves 6S 7S (13).
    let hand = cards(&["6S", "7S", "8S", "8D", "8C"]);
    let a = find_optimal_melds(&hand);
    assert_eq!(a.deadwood, 13);
    assert_eq!(calculate_deadwood(&hand, &a.melds), 13);
}

#[test]
fn long_run_yields_its_end_to_a_set() {
    // 3-7H with 7C 7S: 3-6H plus 7H7C7S melds everything
    let hand = cards(&["3H", "4H", "5H", "6H", "7H", "7C", "7S"]);
    let a = find_optimal_melds(&hand);
    assert_eq!(a.deadwood, 0);
    assert_eq!(a.melds.len(), 2);
    assert!(unmelded_cards(&hand, &a.melds).is_empty());
}

#[test]
fn knock_limit_is_inclusive() {
    let ten = cards(&["AH", "2H", "3H", "TD"]);
    assert!(can_knock(&ten));
    let eleven = cards(&["AH", "2H", "3H", "TD", "AC"]);
    assert!(!can_knock(&eleven));
}

#[test]
fn validate_melds_rejects_bad_shapes() {
    let hand = cards(&["AH", "2H", "3H", "4H", "5C", "5D"]);

    let short = vec![Meld::new(MeldKind::Run, cards(&["AH", "2H"]))];
    assert!(validate_melds(&short, &hand)
        .unwrap_err()
        .is_validation(&ValidationKind::InvalidMeld));

    let wrong_kind = vec![Meld::new(MeldKind::Set, cards(&["AH", "2H", "3H"]))];
    assert!(validate_melds(&wrong_kind, &hand)
        .unwrap_err()
        .is_validation(&ValidationKind::InvalidMeld));

    let foreign = vec![Meld::new(MeldKind::Set, cards(&["5C", "5D", "5S"]))];
    assert!(validate_melds(&foreign, &hand)
        .unwrap_err()
        .is_validation(&ValidationKind::MeldCardNotInHand));

    let reused = vec![
        Meld::new(MeldKind::Run, cards(&["AH", "2H", "3H"])),
        Meld::new(MeldKind::Run, cards(&["2H", "3H", "4H"])),
    ];
    assert!(validate_melds(&reused, &hand)
        .unwrap_err()
        .is_validation(&ValidationKind::MeldCardReused));

    let ok = vec![Meld::new(MeldKind::Run, cards(&["AH", "2H", "3H", "4H"]))];
    assert!(validate_melds(&ok, &hand).is_ok());
}

#[test]
fn meld_serializes_with_type_tag() {
    let m = Meld::new(MeldKind::Run, cards(&["3H", "AH", "2H"]));
    let v = serde_json::to_value(&m).unwrap();
    assert_eq!(v["type"], "run");
    assert_eq!(v["cards"][0]["id"], "hearts_A");
}
