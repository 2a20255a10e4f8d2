//! End-of-deal scoring of one player's collected cards.
//!
//! The pig costs 100, the sheep earns 100, hearts carry a point table and
//! count against the holder unless all thirteen are taken. The doubler is
//! applied last: it is worth a flat 50 on its own, otherwise it multiplies
//! the running total.

use crate::game::effects::Effects;
use crate::model::card::{DOUBLER, PIG, SHEEP};
use crate::model::card_set::CardSet;
use crate::model::rank::Rank;
use crate::model::suit::Suit;

pub const PIG_POINTS: f64 = 100.0;
pub const SHEEP_POINTS: f64 = 100.0;
pub const FULL_HOUSE_BONUS: f64 = 200.0;
pub const LONE_DOUBLER_POINTS: f64 = 50.0;

/// Points of a single heart, before the blood multiplier.
pub const fn heart_points(rank: Rank) -> f64 {
    match rank {
        Rank::Two | Rank::Three | Rank::Four => 0.0,
        Rank::Five | Rank::Six | Rank::Seven | Rank::Eight | Rank::Nine | Rank::Ten => 10.0,
        Rank::Jack => 20.0,
        Rank::Queen => 30.0,
        Rank::King => 40.0,
        Rank::Ace => 50.0,
    }
}

/// Sum of the heart table over the hearts in `cards`.
pub fn blood_subtotal(cards: &CardSet) -> f64 {
    cards
        .by_suit(Suit::Heart)
        .iter()
        .map(|card| heart_points(card.rank))
        .sum()
}

pub fn score(collected: &CardSet, effects: &Effects) -> f64 {
    let hearts = collected.by_suit(Suit::Heart);
    let has_pig = collected.contains(PIG);
    let has_sheep = collected.contains(SHEEP);
    let has_doubler = collected.contains(DOUBLER);
    let has_all_blood = hearts.size() == 13;

    let mut total = 0.0;
    if has_pig {
        total -= PIG_POINTS * effects.pig;
    }
    if has_sheep {
        total += SHEEP_POINTS * effects.sheep;
    }

    let blood = blood_subtotal(collected) * effects.blood;
    if has_all_blood {
        total += blood;
    } else {
        total -= blood;
    }

    if has_pig && has_sheep && has_all_blood && has_doubler {
        total += FULL_HOUSE_BONUS * effects.pig;
    }

    if has_doubler {
        if !has_pig && !has_sheep && hearts.is_empty() {
            total += LONE_DOUBLER_POINTS * effects.doubler;
        } else {
            total *= 2.0 * effects.doubler;
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::{blood_subtotal, score};
    use crate::game::effects::Effects;
    use crate::model::card::{Card, DOUBLER, PIG, SHEEP};
    use crate::model::card_set::CardSet;
    use crate::model::suit::Suit;

    fn cards(text: &str) -> CardSet {
        text.split_whitespace()
            .map(|c| c.parse::<Card>().unwrap())
            .collect()
    }

    #[test]
    fn empty_collection_scores_zero() {
        assert_eq!(score(&CardSet::new(), &Effects::neutral()), 0.0);
    }

    #[test]
    fn partial_hearts_are_negative() {
        assert_eq!(score(&cards("AH KH 2H"), &Effects::neutral()), -90.0);
    }

    #[test]
    fn full_heart_suit_subtotal_is_200() {
        assert_eq!(blood_subtotal(&CardSet::suit(Suit::Heart)), 200.0);
    }

    #[test]
    fn lone_doubler_is_flat_fifty() {
        assert_eq!(score(&CardSet::single(DOUBLER), &Effects::neutral()), 50.0);
        let effects = Effects {
            doubler: 4.0,
            ..Effects::neutral()
        };
        assert_eq!(score(&CardSet::single(DOUBLER), &effects), 200.0);
    }

    #[test]
    fn doubler_multiplies_penalties() {
        let collected = cards("10C QS 5H");
        assert_eq!(score(&collected, &Effects::neutral()), (-100.0 - 10.0) * 2.0);
    }

    #[test]
    fn doubler_with_low_hearts_still_multiplies() {
        // 2H is worth nothing but still counts as holding a heart.
        assert_eq!(score(&cards("10C 2H"), &Effects::neutral()), 0.0);
    }

    #[test]
    fn sheep_uses_its_multiplier() {
        let effects = Effects {
            sheep: 2.0,
            ..Effects::neutral()
        };
        assert_eq!(score(&CardSet::single(SHEEP), &effects), 200.0);
        assert_eq!(score(&CardSet::single(PIG), &effects), -100.0);
    }
}
