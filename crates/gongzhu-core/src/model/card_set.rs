use crate::error::CardError;
use crate::model::card::Card;
use crate::model::suit::Suit;
use core::fmt;
use rand::Rng;
use serde::{Deserialize, Serialize};

const FULL_MASK: u64 = (1u64 << 52) - 1;
const SUIT_MASK: u64 = (1u64 << 13) - 1;

/// A set over the fixed 52-card universe, one bit per card index.
///
/// Hands, collected cards and played cards are all `CardSet`s. Iteration
/// yields cards in ascending (suit, rank) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Card>", into = "Vec<Card>")]
pub struct CardSet {
    bits: u64,
}

impl CardSet {
    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    /// All 52 cards.
    pub const fn full() -> Self {
        Self { bits: FULL_MASK }
    }

    pub const fn single(card: Card) -> Self {
        Self {
            bits: 1u64 << card.index(),
        }
    }

    /// Builds a set, rejecting any card listed twice.
    pub fn try_from_cards<I: IntoIterator<Item = Card>>(cards: I) -> Result<Self, CardError> {
        let mut set = Self::new();
        for card in cards {
            if !set.add(card) {
                return Err(CardError::DuplicateCard(card));
            }
        }
        Ok(set)
    }

    pub fn suit(suit: Suit) -> Self {
        Self {
            bits: SUIT_MASK << (suit.index() * 13),
        }
    }

    /// Adds `card`, returning `false` if it was already present.
    pub fn add(&mut self, card: Card) -> bool {
        let bit = 1u64 << card.index();
        let fresh = self.bits & bit == 0;
        self.bits |= bit;
        fresh
    }

    pub fn remove(&mut self, card: Card) -> Result<(), CardError> {
        let bit = 1u64 << card.index();
        if self.bits & bit == 0 {
            return Err(CardError::CardNotPresent(card));
        }
        self.bits &= !bit;
        Ok(())
    }

    pub const fn contains(&self, card: Card) -> bool {
        self.bits & (1u64 << card.index()) != 0
    }

    pub const fn union(&self, other: &CardSet) -> CardSet {
        CardSet {
            bits: self.bits | other.bits,
        }
    }

    pub const fn intersect(&self, other: &CardSet) -> CardSet {
        CardSet {
            bits: self.bits & other.bits,
        }
    }

    /// `self \ other`; every card of `other` must be present in `self`.
    pub fn difference(&self, other: &CardSet) -> Result<CardSet, CardError> {
        let missing = other.bits & !self.bits;
        if missing != 0 {
            return Err(CardError::InsufficientCards {
                missing: missing.count_ones() as usize,
            });
        }
        Ok(self.without(other))
    }

    /// `self \ other` without the subset requirement.
    pub const fn without(&self, other: &CardSet) -> CardSet {
        CardSet {
            bits: self.bits & !other.bits,
        }
    }

    pub const fn is_subset(&self, other: &CardSet) -> bool {
        self.bits & !other.bits == 0
    }

    pub const fn size(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn by_suit(&self, suit: Suit) -> CardSet {
        self.intersect(&CardSet::suit(suit))
    }

    pub fn by_not_suit(&self, suit: Suit) -> CardSet {
        self.without(&CardSet::suit(suit))
    }

    /// Highest-ranked card of `suit`, if any.
    pub fn highest_of(&self, suit: Suit) -> Option<Card> {
        self.by_suit(suit).iter().last()
    }

    pub fn lowest_of(&self, suit: Suit) -> Option<Card> {
        self.by_suit(suit).iter().next()
    }

    /// Uniformly picks one member without removing it.
    pub fn draw_arbitrary<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Card, CardError> {
        let size = self.size();
        if size == 0 {
            return Err(CardError::EmptyCollection);
        }
        let pick = rng.gen_range(0..size);
        self.iter().nth(pick).ok_or(CardError::EmptyCollection)
    }

    pub fn iter(&self) -> CardSetIter {
        CardSetIter { bits: self.bits }
    }

    pub fn to_vec(&self) -> Vec<Card> {
        self.iter().collect()
    }

    /// 52-slot presence vector indexed by card index.
    pub fn to_presence(&self) -> [bool; 52] {
        core::array::from_fn(|index| self.bits & (1u64 << index) != 0)
    }
}

pub struct CardSetIter {
    bits: u64,
}

impl Iterator for CardSetIter {
    type Item = Card;

    fn next(&mut self) -> Option<Card> {
        if self.bits == 0 {
            return None;
        }
        let index = self.bits.trailing_zeros() as usize;
        self.bits &= self.bits - 1;
        Card::from_index(index).ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.bits.count_ones() as usize;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for CardSetIter {
    fn next_back(&mut self) -> Option<Card> {
        if self.bits == 0 {
            return None;
        }
        let index = 63 - self.bits.leading_zeros() as usize;
        self.bits &= !(1u64 << index);
        Card::from_index(index).ok()
    }
}

impl IntoIterator for CardSet {
    type Item = Card;
    type IntoIter = CardSetIter;

    fn into_iter(self) -> CardSetIter {
        self.iter()
    }
}

impl IntoIterator for &CardSet {
    type Item = Card;
    type IntoIter = CardSetIter;

    fn into_iter(self) -> CardSetIter {
        self.iter()
    }
}

impl FromIterator<Card> for CardSet {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        let mut set = CardSet::new();
        for card in iter {
            set.add(card);
        }
        set
    }
}

impl From<Vec<Card>> for CardSet {
    fn from(cards: Vec<Card>) -> Self {
        cards.into_iter().collect()
    }
}

impl From<CardSet> for Vec<Card> {
    fn from(set: CardSet) -> Self {
        set.to_vec()
    }
}

impl fmt::Display for CardSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, card) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{card}")?;
        }
        f.write_str("]")
    }
}
