use crate::model::card::Card;
use crate::model::card_set::CardSet;
use crate::model::player::Seat;
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};

/// Cards laid so far in the active trick, in play order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trick {
    leader: Seat,
    plays: Vec<Play>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Play {
    pub seat: Seat,
    pub card: Card,
}

impl Trick {
    pub fn new(leader: Seat) -> Self {
        Self {
            leader,
            plays: Vec::with_capacity(4),
        }
    }

    pub fn leader(&self) -> Seat {
        self.leader
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    pub fn cards(&self) -> Vec<Card> {
        self.plays.iter().map(|play| play.card).collect()
    }

    pub fn card_set(&self) -> CardSet {
        self.plays.iter().map(|play| play.card).collect()
    }

    pub fn len(&self) -> usize {
        self.plays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.plays.len() == 4
    }

    pub fn led_suit(&self) -> Option<Suit> {
        self.plays.first().map(|play| play.card.suit)
    }

    /// Seat expected to play next, or `None` once four cards are down.
    pub fn next_seat(&self) -> Option<Seat> {
        if self.is_complete() {
            return None;
        }
        Some(self.leader.offset(self.plays.len()))
    }

    pub(crate) fn push(&mut self, seat: Seat, card: Card) {
        self.plays.push(Play { seat, card });
    }

    /// Highest card of the led suit so far; off-suit cards never win.
    pub fn current_winner(&self) -> Option<Play> {
        let led = self.led_suit()?;
        self.plays
            .iter()
            .filter(|play| play.card.suit == led)
            .max_by_key(|play| play.card.rank)
            .copied()
    }

    pub fn winner(&self) -> Option<Seat> {
        if !self.is_complete() {
            return None;
        }
        self.current_winner().map(|play| play.seat)
    }
}
