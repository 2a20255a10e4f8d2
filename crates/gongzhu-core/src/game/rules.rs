use crate::game::effects::Effects;
use crate::model::card::SpecialCard;
use crate::model::card_set::CardSet;
use crate::model::suit::Suit;

/// Count of completed tricks per led suit, indexed by `Suit::index`.
pub type SuitRounds = [u8; 4];

/// Legal plays for `hand` given the suit led in the current trick.
///
/// Players follow the led suit when able, otherwise anything goes. An openly
/// declared special card is withheld until a trick led in its suit has been
/// completed, unless it is the only candidate left. The lockout applies
/// while following that suit as well as when discarding.
pub fn legal_moves(
    hand: &CardSet,
    led_suit: Option<Suit>,
    effects: &Effects,
    suit_rounds: &SuitRounds,
) -> CardSet {
    let mut candidates = match led_suit {
        Some(suit) => hand.by_suit(suit),
        None => *hand,
    };
    if candidates.is_empty() {
        candidates = *hand;
    }

    // Re-checked per card: a hand of several locked specials keeps its last one.
    for special in SpecialCard::ALL {
        let card = special.card();
        if candidates.size() > 1
            && effects.is_open(special)
            && candidates.contains(card)
            && suit_rounds[special.suit().index()] == 0
        {
            candidates = candidates.without(&CardSet::single(card));
        }
    }

    candidates
}
