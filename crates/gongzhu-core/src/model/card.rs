use crate::error::CardError;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// One of the 52 cards. Ordered by suit, then rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

pub const PIG: Card = Card::new(Rank::Queen, Suit::Spade);
pub const SHEEP: Card = Card::new(Rank::Jack, Suit::Diamond);
pub const DOUBLER: Card = Card::new(Rank::Ten, Suit::Club);
pub const BLOOD: Card = Card::new(Rank::Ace, Suit::Heart);

/// Holder of this card leads the first trick.
pub const OPENING_CARD: Card = Card::new(Rank::Two, Suit::Spade);

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { suit, rank }
    }

    /// Canonical index `suit * 13 + rank` in `0..52`.
    pub const fn index(self) -> usize {
        self.suit.index() * 13 + self.rank.index()
    }

    pub fn from_index(index: usize) -> Result<Self, CardError> {
        match (Suit::from_index(index / 13), Rank::from_index(index % 13)) {
            (Some(suit), Some(rank)) if index < 52 => Ok(Self::new(rank, suit)),
            _ => Err(CardError::InvalidCard(index.to_string())),
        }
    }

    /// Builds a card from loosely typed parts, as received at an input boundary.
    pub fn from_parts(rank: &str, suit: &str) -> Result<Self, CardError> {
        Ok(Self::new(rank.parse()?, suit.parse()?))
    }

    pub fn special(self) -> Option<SpecialCard> {
        SpecialCard::ALL.into_iter().find(|special| special.card() == self)
    }

    pub fn is_special(self) -> bool {
        self.special().is_some()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

impl FromStr for Card {
    type Err = CardError;

    /// Parses the compact form printed by `Display`, e.g. `"QS"` or `"10C"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let Some(suit_char) = trimmed.chars().last() else {
            return Err(CardError::InvalidCard(s.to_string()));
        };
        let (rank_text, suit_text) = trimmed.split_at(trimmed.len() - suit_char.len_utf8());
        let suit: Suit = suit_text
            .parse()
            .map_err(|_| CardError::InvalidCard(s.to_string()))?;
        let rank: Rank = rank_text
            .parse()
            .map_err(|_| CardError::InvalidCard(s.to_string()))?;
        Ok(Card::new(rank, suit))
    }
}

impl TryFrom<String> for Card {
    type Error = CardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.to_string()
    }
}

/// The four cards whose scoring can be amplified by declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecialCard {
    Pig,
    Sheep,
    Doubler,
    Blood,
}

impl SpecialCard {
    pub const ALL: [SpecialCard; 4] = [
        SpecialCard::Pig,
        SpecialCard::Sheep,
        SpecialCard::Doubler,
        SpecialCard::Blood,
    ];

    pub const fn card(self) -> Card {
        match self {
            SpecialCard::Pig => PIG,
            SpecialCard::Sheep => SHEEP,
            SpecialCard::Doubler => DOUBLER,
            SpecialCard::Blood => BLOOD,
        }
    }

    pub const fn suit(self) -> Suit {
        self.card().suit
    }
}

impl fmt::Display for SpecialCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SpecialCard::Pig => "pig",
            SpecialCard::Sheep => "sheep",
            SpecialCard::Doubler => "doubler",
            SpecialCard::Blood => "blood",
        };
        f.write_str(label)
    }
}
