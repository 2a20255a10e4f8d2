use thiserror::Error;

use crate::model::card::Card;
use crate::model::player::Seat;

/// Failures raised by card construction and card-set algebra.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    #[error("invalid card: {0:?}")]
    InvalidCard(String),
    #[error("card {0} is not present in the collection")]
    CardNotPresent(Card),
    #[error("cannot remove {missing} card(s) that are not in the collection")]
    InsufficientCards { missing: usize },
    #[error("cannot draw from an empty collection")]
    EmptyCollection,
    #[error("card {0} appears more than once")]
    DuplicateCard(Card),
}

/// Reasons a declaration is rejected for a given hand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    #[error("declared card {0} is not in hand")]
    CardNotInHand(Card),
    #[error("card {0} is declared both open and closed")]
    DuplicateDeclaration(Card),
    #[error("card {0} is not one of the four special cards")]
    NotSpecialCard(Card),
}

/// Errors surfaced by the deal engine. A rejected operation leaves the deal unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DealError {
    #[error("{seat} may not play {card}")]
    IllegalMove { seat: Seat, card: Card },
    #[error("{seat} made an illegal declaration: {source}")]
    IllegalDeclaration {
        seat: Seat,
        #[source]
        source: DeclarationError,
    },
    #[error("it is {expected}'s turn, not {actual}'s")]
    OutOfTurn { expected: Seat, actual: Seat },
    #[error("no player holds the opening card")]
    NoEligibleLeader,
    #[error("operation requires the {expected} phase")]
    WrongPhase { expected: &'static str },
    #[error("the deal has already ended")]
    DealEnded,
    #[error("the current trick has {played} of 4 cards")]
    TrickIncomplete { played: usize },
    #[error("the current trick is complete and must be resolved first")]
    TrickComplete,
    #[error(transparent)]
    Card(#[from] CardError),
}
