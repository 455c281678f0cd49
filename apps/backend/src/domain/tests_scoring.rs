use crate::domain::cards_parsing::try_parse_cards;
use crate::domain::melds::{find_optimal_melds, Meld, MeldKind};
use crate::domain::scoring::{
    calculate_knock_score, calculate_score_with_layoffs, determine_winner, score_from_deadwood,
    settle_with_layoffs, should_game_end,
};
use crate::domain::Card;

fn cards(tokens: &[&str]) -> Vec<Card> {
    try_parse_cards(tokens).unwrap()
}

fn run(tokens: &[&str]) -> Meld {
    Meld::new(MeldKind::Run, cards(tokens))
}

fn set(tokens: &[&str]) -> Meld {
    Meld::new(MeldKind::Set, cards(tokens))
}

#[test]
fn plain_knock_scores_difference() {
    // knocker: two runs + 3-set, deadwood 8H = 8
    let knocker = cards(&["AS", "2S", "3S", "JD", "QD", "KD", "9C", "9H", "9D", "8H"]);
    let knocker_melds = vec![
        run(&["AS", "2S", "3S"]),
        run(&["JD", "QD", "KD"]),
        set(&["9C", "9H", "9D"]),
    ];
    // opponent: one run, deadwood 7C 8S = 15
    let opponent = cards(&["4D", "5D", "6D", "7C", "8S"]);
    let opponent_melds = vec![run(&["4D", "5D", "6D"])];

    let s = calculate_knock_score(&knocker, &knocker_melds, &opponent, &opponent_melds);
    assert_eq!(s.knocker_deadwood, 8);
    assert_eq!(s.opponent_deadwood, 15);
    assert!(!s.is_gin);
    assert!(!s.is_undercut);
    assert_eq!(s.knocker_score, 7);
    assert_eq!(s.opponent_score, 0);
}

#[test]
fn undercut_awards_opponent() {
    let s = score_from_deadwood(9, 6);
    assert!(s.is_undercut);
    assert_eq!(s.knocker_score, 0);
    assert_eq!(s.opponent_score, 28);
}

#[test]
fn equal_deadwood_is_undercut() {
    let s = score_from_deadwood(7, 7);
    assert!(s.is_undercut);
    assert_eq!(s.opponent_score, 25);
}

#[test]
fn gin_scores_bonus_plus_opponent_deadwood() {
    let s = score_from_deadwood(0, 30);
    assert!(s.is_gin);
    assert!(!s.is_undercut);
    assert_eq!(s.knocker_score, 55);
    assert_eq!(s.opponent_score, 0);
}

#[test]
fn layoffs_can_turn_a_knock_into_an_undercut() {
    let without = settle_with_layoffs(6, 12, 0);
    assert!(!without.is_undercut);
    assert_eq!(without.knocker_score, 6);

    let with = settle_with_layoffs(6, 12, 7);
    assert_eq!(with.opponent_deadwood, 5);
    assert_eq!(with.laid_off_value, 7);
    assert!(with.is_undercut);
    assert_eq!(with.opponent_score, 26);
}

#[test]
fn layoffs_never_reduce_gin() {
    let s = settle_with_layoffs(0, 20, 9);
    assert!(s.is_gin);
    assert_eq!(s.knocker_score, 45);
    assert_eq!(s.laid_off_value, 0);
}

#[test]
fn score_with_layoffs_from_hands() {
    let knocker = cards(&["2C", "3C", "4C", "5S", "5H", "5D", "9H", "TH", "JH", "4S"]);
    let knocker_melds = find_optimal_melds(&knocker).melds;
    // AC extends the knocker's 2C-4C run
    let opponent = cards(&["AC", "KS", "QH", "8D", "8S", "8C"]);
    let opponent_melds = find_optimal_melds(&opponent).melds;

    let base = calculate_knock_score(&knocker, &knocker_melds, &opponent, &opponent_melds);
    assert_eq!(base.knocker_deadwood, 4);
    assert_eq!(base.opponent_deadwood, 21);

    let laid = cards(&["AC"]);
    let s = calculate_score_with_layoffs(&knocker, &knocker_melds, &opponent, &opponent_melds, &laid);
    assert_eq!(s.opponent_deadwood, 20);
    assert_eq!(s.knocker_score, 16);
}

#[test]
fn game_end_and_winner() {
    assert!(!should_game_end(&[99, 0]));
    assert!(should_game_end(&[100, 0]));
    assert_eq!(determine_winner(&[(1, 40), (2, 99)], None), None);
    assert_eq!(determine_winner(&[(1, 104), (2, 99)], None), Some(1));
    assert_eq!(determine_winner(&[(1, 90), (2, 120)], Some(1)), Some(2));
}

#[test]
fn tie_at_target_goes_to_scorer_then_lower_seat() {
    assert_eq!(determine_winner(&[(1, 110), (2, 110)], Some(2)), Some(2));
    assert_eq!(determine_winner(&[(1, 110), (2, 110)], None), Some(1));
}
