use gongzhu_core::error::CardError;
use gongzhu_core::game::effects::{Effects, OPEN};
use gongzhu_core::game::rules::legal_moves;
use gongzhu_core::model::card::{Card, SpecialCard};
use gongzhu_core::model::card_set::CardSet;
use gongzhu_core::model::suit::Suit;
use proptest::prelude::*;

const FULL_MASK: u64 = (1 << 52) - 1;

fn card_set() -> impl Strategy<Value = CardSet> {
    any::<u64>().prop_map(|bits| {
        let bits = bits & FULL_MASK;
        (0..52)
            .filter(|i| bits & (1 << i) != 0)
            .filter_map(|i| Card::from_index(i).ok())
            .collect()
    })
}

fn suit() -> impl Strategy<Value = Suit> {
    (0usize..4).prop_map(|i| Suit::from_index(i).unwrap())
}

fn effects() -> impl Strategy<Value = Effects> {
    let level = prop_oneof![Just(1.0), Just(2.0), Just(OPEN)];
    (level.clone(), level.clone(), level.clone(), level).prop_map(|(pig, sheep, doubler, blood)| {
        Effects {
            pig,
            sheep,
            doubler,
            blood,
        }
    })
}

/// Non-empty hands built mostly or entirely from the four special cards.
fn special_heavy_hand() -> impl Strategy<Value = CardSet> {
    (1u8..16, any::<u64>(), any::<bool>()).prop_map(|(mask, extra, pad)| {
        let mut hand: CardSet = SpecialCard::ALL
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, special)| special.card())
            .collect();
        if pad {
            if let Ok(card) = Card::from_index((extra % 52) as usize) {
                hand.add(card);
            }
        }
        hand
    })
}

fn all_open() -> Effects {
    Effects {
        pig: OPEN,
        sheep: OPEN,
        doubler: OPEN,
        blood: OPEN,
    }
}

proptest! {
    #[test]
    fn index_is_a_bijection(index in 0usize..52) {
        let card = Card::from_index(index).unwrap();
        prop_assert_eq!(card.index(), index);
        prop_assert_eq!(Card::new(card.rank, card.suit), card);
        let text = card.to_string();
        prop_assert_eq!(text.parse::<Card>().unwrap(), card);
    }

    #[test]
    fn union_then_difference(a in card_set(), b in card_set()) {
        prop_assert_eq!(a.union(&b).difference(&b).unwrap(), a.without(&b));
        prop_assert!(a.intersect(&b).size() <= a.size().min(b.size()));
    }

    #[test]
    fn difference_requires_subset(a in card_set(), b in card_set()) {
        match a.difference(&b) {
            Ok(rest) => {
                prop_assert!(b.is_subset(&a));
                prop_assert_eq!(rest.size(), a.size() - b.size());
            }
            Err(CardError::InsufficientCards { missing }) => {
                prop_assert_eq!(missing, b.without(&a).size());
            }
            Err(other) => prop_assert!(false, "unexpected error {other}"),
        }
    }

    #[test]
    fn removing_absent_card_fails(set in card_set(), index in 0usize..52) {
        let card = Card::from_index(index).unwrap();
        let mut set = set;
        let _ = set.remove(card);
        prop_assert_eq!(set.remove(card), Err(CardError::CardNotPresent(card)));
    }

    #[test]
    fn legal_moves_never_empty(
        hand in card_set(),
        led in proptest::option::of(suit()),
        effects in effects(),
        rounds in any::<[u8; 4]>(),
    ) {
        let legal = legal_moves(&hand, led, &effects, &rounds);
        prop_assert!(legal.is_subset(&hand));
        if !hand.is_empty() {
            prop_assert!(!legal.is_empty());
        }
    }

    #[test]
    fn locked_specials_never_empty_the_legal_set(
        hand in special_heavy_hand(),
        led in proptest::option::of(suit()),
    ) {
        let legal = legal_moves(&hand, led, &all_open(), &[0; 4]);
        prop_assert!(!legal.is_empty());
        prop_assert!(legal.is_subset(&hand));
    }

    #[test]
    fn following_suit_when_able(
        hand in card_set(),
        led in suit(),
        effects in effects(),
        rounds in any::<[u8; 4]>(),
    ) {
        let legal = legal_moves(&hand, Some(led), &effects, &rounds);
        if !hand.by_suit(led).is_empty() {
            prop_assert!(legal.iter().all(|card| card.suit == led));
        }
    }

    #[test]
    fn neutral_effects_never_lock(hand in card_set(), led in proptest::option::of(suit())) {
        let legal = legal_moves(&hand, led, &Effects::neutral(), &[0; 4]);
        for special in SpecialCard::ALL {
            let card = special.card();
            let follows = led.map_or(true, |suit| {
                card.suit == suit || hand.by_suit(suit).is_empty()
            });
            if hand.contains(card) && follows {
                prop_assert!(legal.contains(card));
            }
        }
    }
}
