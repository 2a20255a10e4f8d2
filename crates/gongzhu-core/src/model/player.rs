use crate::error::CardError;
use crate::game::effects::Effects;
use crate::game::policy::Policy;
use crate::game::scoring;
use crate::model::card::Card;
use crate::model::card_set::CardSet;
use crate::model::declaration::Declaration;
use core::fmt;
use serde::{Deserialize, Serialize};

pub const DEFAULT_RATING: f64 = 1500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Seat {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Seat {
    pub const LOOP: [Seat; 4] = [Seat::North, Seat::East, Seat::South, Seat::West];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Seat::North),
            1 => Some(Seat::East),
            2 => Some(Seat::South),
            3 => Some(Seat::West),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn next(self) -> Seat {
        match self {
            Seat::North => Seat::East,
            Seat::East => Seat::South,
            Seat::South => Seat::West,
            Seat::West => Seat::North,
        }
    }

    /// The seat `offset` places after this one in play order.
    pub const fn offset(self, offset: usize) -> Seat {
        Self::LOOP[(self as usize + offset) % 4]
    }

    pub const fn partner(self) -> Seat {
        self.offset(2)
    }

    pub const fn team(self) -> Team {
        match self {
            Seat::North | Seat::South => Team::NorthSouth,
            Seat::East | Seat::West => Team::EastWest,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Seat::North => "North",
            Seat::East => "East",
            Seat::South => "South",
            Seat::West => "West",
        };
        f.write_str(label)
    }
}

/// Partnerships sit opposite each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    NorthSouth,
    EastWest,
}

impl Team {
    pub const fn seats(self) -> [Seat; 2] {
        match self {
            Team::NorthSouth => [Seat::North, Seat::South],
            Team::EastWest => [Seat::East, Seat::West],
        }
    }

    pub const fn opponent(self) -> Team {
        match self {
            Team::NorthSouth => Team::EastWest,
            Team::EastWest => Team::NorthSouth,
        }
    }
}

/// Per-seat state for one deal plus the persistent identity and policy.
pub struct Player {
    id: String,
    name: String,
    avatar_url: Option<String>,
    rating: f64,
    policy: Box<dyn Policy>,
    hand: CardSet,
    collected: CardSet,
    played: CardSet,
    current_trick_card: Option<Card>,
    declaration: Declaration,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>, policy: Box<dyn Policy>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar_url: None,
            rating: DEFAULT_RATING,
            policy,
            hand: CardSet::new(),
            collected: CardSet::new(),
            played: CardSet::new(),
            current_trick_card: None,
            declaration: Declaration::none(),
        }
    }

    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    /// Clears all per-deal state. Identity, rating and policy persist.
    pub fn reset(&mut self) {
        self.hand = CardSet::new();
        self.collected = CardSet::new();
        self.played = CardSet::new();
        self.current_trick_card = None;
        self.declaration = Declaration::none();
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    pub fn rating(&self) -> f64 {
        self.rating
    }

    pub fn set_rating(&mut self, rating: f64) {
        self.rating = rating;
    }

    pub fn update_rating(&mut self, change: f64) {
        self.rating += change;
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    pub fn policy_mut(&mut self) -> &mut dyn Policy {
        self.policy.as_mut()
    }

    pub fn set_policy(&mut self, policy: Box<dyn Policy>) {
        self.policy = policy;
    }

    pub fn hand(&self) -> &CardSet {
        &self.hand
    }

    pub fn collected(&self) -> &CardSet {
        &self.collected
    }

    pub fn played(&self) -> &CardSet {
        &self.played
    }

    pub fn current_trick_card(&self) -> Option<Card> {
        self.current_trick_card
    }

    pub fn declaration(&self) -> &Declaration {
        &self.declaration
    }

    pub(crate) fn receive_hand(&mut self, hand: CardSet) {
        self.hand = hand;
    }

    pub(crate) fn set_declaration(&mut self, declaration: Declaration) {
        self.declaration = declaration;
    }

    /// Moves `card` from hand to the table, revealing a matching closed
    /// declaration. Returns whether a reveal happened.
    pub(crate) fn lay_card(&mut self, card: Card) -> Result<bool, CardError> {
        self.hand.remove(card)?;
        self.played.add(card);
        self.current_trick_card = Some(card);
        Ok(self.declaration.reveal(card))
    }

    pub(crate) fn collect(&mut self, cards: &CardSet) {
        self.collected = self.collected.union(cards);
    }

    pub(crate) fn clear_trick_card(&mut self) {
        self.current_trick_card = None;
    }

    /// Score of the collected cards under the given multipliers.
    pub fn score(&self, effects: &Effects) -> f64 {
        scoring::score(&self.collected, effects)
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("rating", &self.rating)
            .field("policy", &self.policy.name())
            .field("hand", &self.hand)
            .field("collected", &self.collected)
            .field("current_trick_card", &self.current_trick_card)
            .finish()
    }
}
