use gongzhu_core::error::DealError;
use gongzhu_core::game::config::DealConfig;
use gongzhu_core::game::deal::{Deal, DealPhase, TRICKS_PER_DEAL};
use gongzhu_core::game::policy::FirstLegalPolicy;
use gongzhu_core::game::record::DealRecord;
use gongzhu_core::model::card::{Card, PIG, SHEEP};
use gongzhu_core::model::card_set::CardSet;
use gongzhu_core::model::declaration::Declaration;
use gongzhu_core::model::player::{Player, Seat, Team};
use gongzhu_core::model::suit::Suit;

fn players() -> [Player; 4] {
    Seat::LOOP.map(|seat| {
        Player::new(
            format!("seat-{}", seat.index()),
            seat.to_string(),
            Box::new(FirstLegalPolicy),
        )
    })
}

fn cards(text: &str) -> Vec<Card> {
    text.split_whitespace()
        .map(|card| card.parse().unwrap())
        .collect()
}

#[test]
fn every_card_is_collected_exactly_once() {
    for seed in [1_u64, 2, 3, 42, 2024] {
        let mut deal = Deal::with_seed(players(), DealConfig::with_declarations(), seed).unwrap();
        deal.play_out().unwrap();

        let mut seen = CardSet::new();
        for seat in Seat::LOOP {
            let collected = *deal.player(seat).collected();
            assert!(seen.intersect(&collected).is_empty(), "seed {seed}");
            seen = seen.union(&collected);
            assert!(deal.player(seat).hand().is_empty());
        }
        assert_eq!(seen, CardSet::full(), "seed {seed}");
        assert_eq!(deal.round_count(), TRICKS_PER_DEAL);
        assert_eq!(deal.suit_rounds().iter().map(|n| *n as usize).sum::<usize>(), 13);
    }
}

#[test]
fn team_scores_add_up() {
    let mut deal = Deal::with_seed(players(), DealConfig::default(), 77).unwrap();
    deal.play_out().unwrap();
    let scores = deal.scores();
    assert_eq!(deal.team_score(Team::NorthSouth), scores[0] + scores[2]);
    assert_eq!(deal.team_score(Team::EastWest), scores[1] + scores[3]);
    assert_eq!(
        deal.score_diff(),
        deal.team_score(Team::NorthSouth) - deal.team_score(Team::EastWest)
    );
    assert_eq!(DealRecord::capture(&deal).score_diff(), deal.score_diff());
}

#[test]
fn open_pig_waits_for_a_completed_spade_trick() {
    // West holds the pig with other spades and leads the first trick.
    let north = cards("2C 3C 4C 5C 6C 7C 8C 9C 10C JC QC KC AC");
    let east = cards("2D 3D 4D 5D 6D 7D 8D 9D 10D JD QD KD AD");
    let south = cards("2H 3H 4H 5H 6H 7H 8H 9H 10H JH QH KH AH");
    let west = cards("2S 3S 4S 5S 6S 7S 8S 9S 10S JS QS KS AS");
    let hands = [north, east, south, west].map(CardSet::from);

    let mut deal = Deal::from_hands(players(), DealConfig::with_declarations(), hands).unwrap();
    deal.declare(Seat::West, Declaration::new([PIG], CardSet::new()).unwrap())
        .unwrap();
    for seat in [Seat::North, Seat::East, Seat::South] {
        deal.declare(seat, Declaration::none()).unwrap();
    }
    assert_eq!(deal.phase(), DealPhase::Playing);
    assert!(!deal.legal_moves(Seat::West).contains(PIG));
    assert!(!deal.is_legal_move(Seat::West, PIG));
    assert!(matches!(
        deal.play_card(Seat::West, PIG),
        Err(DealError::IllegalMove { .. })
    ));

    // First spade trick completes, lifting the lockout.
    for _ in 0..4 {
        deal.advance().unwrap();
    }
    deal.advance().unwrap();
    assert_eq!(deal.suit_rounds()[Suit::Spade.index()], 1);
    assert_eq!(deal.current_player(), Some(Seat::West));
    assert!(deal.legal_moves(Seat::West).contains(PIG));
    deal.play_card(Seat::West, PIG).unwrap();
}

#[test]
fn rejected_operations_do_not_change_state() {
    let mut deal = Deal::with_seed(players(), DealConfig::default(), 13).unwrap();
    let leader = deal.current_player().unwrap();
    let before_hand = *deal.player(leader).hand();

    assert!(matches!(
        deal.next_round(),
        Err(DealError::TrickIncomplete { played: 0 })
    ));
    assert!(matches!(
        deal.declare(leader, Declaration::none()),
        Err(DealError::WrongPhase { .. })
    ));
    assert_eq!(deal.player(leader).hand(), &before_hand);
    assert!(deal.history().is_empty());
    assert_eq!(deal.current_player(), Some(leader));
}

#[test]
fn observation_hides_opponent_hands() {
    let deal = Deal::with_seed(players(), DealConfig::default(), 5).unwrap();
    let observation = deal.observation(Seat::South);
    assert_eq!(observation.hand, *deal.player(Seat::South).hand());
    for view in &observation.seats {
        assert_eq!(view.hand_size, 13);
    }
    assert_eq!(observation.unseen().size(), 39);
    let json = serde_json::to_string(&observation).unwrap();
    assert!(json.contains("\"declaration_phase\":false"));
}

#[test]
fn two_open_specials_left_in_hand_still_leave_a_lead() {
    // North leads a club into West's long clubs; West then runs every club
    // and is left holding only the two openly declared specials.
    let north = cards("2S 3S 4S 5S 6S 7S 8S 9S 10S JS KS AS 2C");
    let east = cards("2D 3D 4D 5D 6D 7D 8D 9D 10D QD KD AD 3C");
    let south = cards("2H 3H 4H 5H 6H 7H 8H 9H 10H JH QH KH AH");
    let west = cards("QS JD 4C 5C 6C 7C 8C 9C 10C JC QC KC AC");
    let hands = [north, east, south, west].map(CardSet::from);

    let mut deal = Deal::from_hands(players(), DealConfig::with_declarations(), hands).unwrap();
    for seat in [Seat::North, Seat::East, Seat::South] {
        deal.declare(seat, Declaration::none()).unwrap();
    }
    deal.declare(Seat::West, Declaration::new([PIG, SHEEP], CardSet::new()).unwrap())
        .unwrap();

    while deal.round_count() < 11 {
        deal.advance().unwrap();
    }
    assert_eq!(deal.current_player(), Some(Seat::West));
    assert_eq!(deal.suit_rounds()[Suit::Club.index()], 11);
    assert_eq!(deal.player(Seat::West).hand(), &CardSet::from(cards("QS JD")));

    let legal = deal.legal_moves(Seat::West);
    assert_eq!(legal.size(), 1);
    assert!(legal.is_subset(deal.player(Seat::West).hand()));

    deal.play_out().unwrap();
    assert!(deal.is_end_of_deal());
    assert_eq!(deal.history().len(), 52);
}
