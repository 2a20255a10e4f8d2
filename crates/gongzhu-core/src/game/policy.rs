use crate::game::observation::Observation;
use tracing::{Level, event};

use crate::model::card::{Card, OPENING_CARD};
use crate::model::card_set::CardSet;
use crate::model::declaration::Declaration;

/// Decision-making capability a [`Player`](crate::model::player::Player)
/// delegates to. The engine re-validates every answer.
pub trait Policy: Send {
    fn name(&self) -> &str;

    /// Pick one card out of `legal_moves`, which is never empty.
    fn decide_action(&mut self, legal_moves: CardSet, observation: &Observation) -> Card;

    /// Announce special cards held in `hand` before the first trick.
    fn decide_declarations(&mut self, hand: CardSet, observation: &Observation) -> Declaration;
}

/// Card a policy answers with when handed an empty legal set. The engine
/// never does this, and it rejects the answer anyway since the card cannot be
/// legal.
pub fn empty_legal_fallback(policy: &str) -> Card {
    event!(Level::WARN, policy, card = %OPENING_CARD, "no legal moves offered");
    OPENING_CARD
}

/// Plays the lowest legal card and never declares. Deterministic, which makes
/// it handy for fixtures and as a fallback seat filler.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstLegalPolicy;

impl Policy for FirstLegalPolicy {
    fn name(&self) -> &str {
        "first-legal"
    }

    fn decide_action(&mut self, legal_moves: CardSet, _observation: &Observation) -> Card {
        legal_moves
            .iter()
            .next()
            .unwrap_or_else(|| empty_legal_fallback(self.name()))
    }

    fn decide_declarations(&mut self, _hand: CardSet, _observation: &Observation) -> Declaration {
        Declaration::none()
    }
}
