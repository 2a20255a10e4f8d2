use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::CardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Suit {
    Club = 0,
    Diamond = 1,
    Heart = 2,
    Spade = 3,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Club, Suit::Diamond, Suit::Heart, Suit::Spade];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Suit::Club),
            1 => Some(Suit::Diamond),
            2 => Some(Suit::Heart),
            3 => Some(Suit::Spade),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn is_heart(self) -> bool {
        matches!(self, Suit::Heart)
    }

    pub const fn symbol(self) -> char {
        match self {
            Suit::Club => 'C',
            Suit::Diamond => 'D',
            Suit::Heart => 'H',
            Suit::Spade => 'S',
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Suit::Club => "club",
            Suit::Diamond => "diamond",
            Suit::Heart => "heart",
            Suit::Spade => "spade",
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Suit {
    type Err = CardError;

    /// Accepts the single-letter symbol or the full lowercase name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "club" | "clubs" => Ok(Suit::Club),
            "d" | "diamond" | "diamonds" => Ok(Suit::Diamond),
            "h" | "heart" | "hearts" => Ok(Suit::Heart),
            "s" | "spade" | "spades" => Ok(Suit::Spade),
            _ => Err(CardError::InvalidCard(s.to_string())),
        }
    }
}
