//! Pre-play announcements of special cards.
//!
//! An open declaration is public from the moment it is made. A closed one
//! stays hidden from opponents until the declared card is played, at which
//! point it is marked revealed.

use crate::error::DeclarationError;
use crate::model::card::Card;
use crate::model::card_set::CardSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedDeclaration {
    pub card: Card,
    pub revealed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    open: CardSet,
    closed: Vec<ClosedDeclaration>,
}

/// What opponents are allowed to see of a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicDeclaration {
    pub open: CardSet,
    pub revealed_closed: CardSet,
    pub num_unrevealed: usize,
}

impl Declaration {
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds a declaration, rejecting non-special cards and cards named twice.
    /// Membership in a hand is checked separately by [`Declaration::validate`].
    pub fn new<O, C>(open: O, closed: C) -> Result<Self, DeclarationError>
    where
        O: IntoIterator<Item = Card>,
        C: IntoIterator<Item = Card>,
    {
        let mut open_set = CardSet::new();
        for card in open {
            if !card.is_special() {
                return Err(DeclarationError::NotSpecialCard(card));
            }
            open_set.add(card);
        }

        let mut closed_set = CardSet::new();
        let mut entries = Vec::new();
        for card in closed {
            if !card.is_special() {
                return Err(DeclarationError::NotSpecialCard(card));
            }
            if open_set.contains(card) || !closed_set.add(card) {
                return Err(DeclarationError::DuplicateDeclaration(card));
            }
            entries.push(ClosedDeclaration {
                card,
                revealed: false,
            });
        }

        Ok(Self {
            open: open_set,
            closed: entries,
        })
    }

    /// Checks the declaration against the declaring player's hand.
    pub fn validate(&self, hand: &CardSet) -> Result<(), DeclarationError> {
        let mut closed_seen = CardSet::new();
        for entry in &self.closed {
            if !entry.card.is_special() {
                return Err(DeclarationError::NotSpecialCard(entry.card));
            }
            if self.open.contains(entry.card) || !closed_seen.add(entry.card) {
                return Err(DeclarationError::DuplicateDeclaration(entry.card));
            }
        }
        for card in self.open.iter().chain(closed_seen.iter()) {
            if !card.is_special() {
                return Err(DeclarationError::NotSpecialCard(card));
            }
            if !hand.contains(card) {
                return Err(DeclarationError::CardNotInHand(card));
            }
        }
        Ok(())
    }

    /// Marks a closed declaration of `card` as revealed. Returns `false` when
    /// `card` was not closed-declared or was already revealed.
    pub fn reveal(&mut self, card: Card) -> bool {
        match self
            .closed
            .iter_mut()
            .find(|entry| entry.card == card && !entry.revealed)
        {
            Some(entry) => {
                entry.revealed = true;
                true
            }
            None => false,
        }
    }

    pub fn open(&self) -> CardSet {
        self.open
    }

    pub fn closed_entries(&self) -> &[ClosedDeclaration] {
        &self.closed
    }

    /// Every closed-declared card, revealed or not.
    pub fn all_closed(&self) -> CardSet {
        self.closed.iter().map(|entry| entry.card).collect()
    }

    pub fn revealed_closed(&self) -> CardSet {
        self.closed
            .iter()
            .filter(|entry| entry.revealed)
            .map(|entry| entry.card)
            .collect()
    }

    pub fn num_unrevealed(&self) -> usize {
        self.closed.iter().filter(|entry| !entry.revealed).count()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty() && self.closed.is_empty()
    }

    pub fn public_view(&self) -> PublicDeclaration {
        PublicDeclaration {
            open: self.open,
            revealed_closed: self.revealed_closed(),
            num_unrevealed: self.num_unrevealed(),
        }
    }
}
