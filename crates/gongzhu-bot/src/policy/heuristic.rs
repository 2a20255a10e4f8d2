use gongzhu_core::game::observation::Observation;
use gongzhu_core::game::policy::{Policy, empty_legal_fallback};
use gongzhu_core::game::scoring::heart_points;
use gongzhu_core::model::card::{BLOOD, Card, DOUBLER, PIG, SHEEP};
use gongzhu_core::model::card_set::CardSet;
use gongzhu_core::model::declaration::Declaration;
use gongzhu_core::model::rank::Rank;
use gongzhu_core::model::suit::Suit;
use tracing::{Level, event};

/// Spades held next to the pig before it is worth declaring.
const PIG_GUARD: usize = 5;
/// Diamonds (with the ace) that make an open sheep declaration safe.
const SHEEP_OPEN_DIAMONDS: usize = 4;
const SHEEP_CLOSED_DIAMONDS: usize = 3;
/// Hearts needed before declaring the blood closed.
const BLOOD_RUN_HEARTS: usize = 7;

/// Rule-of-thumb player: keeps away from the pig and hearts, dumps them on
/// opponents when void, ducks under the current winner and steers the sheep
/// towards its own partnership.
#[derive(Debug, Clone)]
pub struct HeuristicPolicy {
    declares: bool,
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicPolicy {
    pub fn new() -> Self {
        Self { declares: true }
    }

    pub fn without_declarations() -> Self {
        Self { declares: false }
    }

    fn lead(&self, legal: CardSet, observation: &Observation) -> (Card, &'static str) {
        let pig_out = !pig_seen(observation) && !observation.hand.contains(PIG);
        let safe: Vec<Card> = legal
            .iter()
            .filter(|card| !card.is_special() && card.suit != Suit::Heart)
            .filter(|card| !(pig_out && card.suit == Suit::Spade && card.rank > Rank::Queen))
            .collect();
        if let Some(card) = lowest(&safe) {
            return (card, "lead_low");
        }
        let fallback: Vec<Card> = legal.iter().filter(|card| *card != PIG).collect();
        match lowest(&fallback) {
            Some(card) => (card, "lead_forced"),
            None => (PIG, "lead_pig"),
        }
    }

    fn follow(&self, legal: CardSet, led: Suit, observation: &Observation) -> (Card, &'static str) {
        let trick = &observation.trick;
        let Some(winning) = trick.current_winner() else {
            return self.lead(legal, observation);
        };
        let win_rank = winning.card.rank;
        let partner_winning = winning.seat == observation.viewer.partner();
        let last = trick.len() == 3;

        if led == Suit::Diamond && legal.contains(SHEEP) {
            if partner_winning && win_rank > SHEEP.rank {
                return (SHEEP, "feed_sheep");
            }
            if last && SHEEP.rank > win_rank {
                return (SHEEP, "take_sheep");
            }
        }
        if led == Suit::Spade && legal.contains(PIG) && win_rank > PIG.rank && !partner_winning {
            return (PIG, "dump_pig");
        }

        let keep: Vec<Card> = legal
            .iter()
            .filter(|card| *card != PIG && *card != SHEEP)
            .collect();
        let below: Vec<Card> = keep.iter().copied().filter(|c| c.rank < win_rank).collect();
        if let Some(card) = highest(&below) {
            return (card, "duck");
        }

        let above: Vec<Card> = keep.iter().copied().filter(|c| c.rank > win_rank).collect();
        let exposure = trick_penalty(&trick.cards());
        if last && exposure <= 0 {
            if let Some(card) = highest(&above) {
                return (card, "win_clean");
            }
        }
        if let Some(card) = lowest(&above) {
            return (card, "lowest_over");
        }
        let remaining: Vec<Card> = legal.iter().collect();
        (
            lowest(&remaining).unwrap_or_else(|| empty_legal_fallback("heuristic")),
            "forced_follow",
        )
    }

    fn discard(&self, legal: CardSet, observation: &Observation) -> (Card, &'static str) {
        let partner_winning = observation
            .trick
            .current_winner()
            .is_some_and(|play| play.seat == observation.viewer.partner());

        if partner_winning {
            if legal.contains(SHEEP) {
                return (SHEEP, "feed_sheep");
            }
            let plain: Vec<Card> = legal
                .iter()
                .filter(|card| !card.is_special() && card.suit != Suit::Heart)
                .collect();
            if let Some(card) = highest(&plain) {
                return (card, "shed_high");
            }
        } else {
            if legal.contains(PIG) {
                return (PIG, "dump_pig");
            }
            let hearts: Vec<Card> = legal.by_suit(Suit::Heart).iter().collect();
            if let Some(card) = highest(&hearts) {
                return (card, "dump_blood");
            }
            let plain: Vec<Card> = legal.iter().filter(|card| *card != SHEEP).collect();
            if let Some(card) = highest(&plain) {
                return (card, "shed_high");
            }
        }
        let remaining: Vec<Card> = legal.iter().collect();
        (
            lowest(&remaining).unwrap_or_else(|| empty_legal_fallback("heuristic")),
            "forced_discard",
        )
    }
}

impl Policy for HeuristicPolicy {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn decide_action(&mut self, legal_moves: CardSet, observation: &Observation) -> Card {
        let (chosen, reason) = if legal_moves.size() == 1 {
            (
                legal_moves
                    .iter()
                    .next()
                    .unwrap_or_else(|| empty_legal_fallback("heuristic")),
                "forced",
            )
        } else {
            match observation.trick.led_suit() {
                None => self.lead(legal_moves, observation),
                Some(led) if legal_moves.iter().all(|card| card.suit == led) => {
                    self.follow(legal_moves, led, observation)
                }
                Some(_) => self.discard(legal_moves, observation),
            }
        };
        log_play_decision(observation, legal_moves, chosen, reason);
        chosen
    }

    fn decide_declarations(&mut self, hand: CardSet, observation: &Observation) -> Declaration {
        if !self.declares {
            return Declaration::none();
        }
        let mut open = Vec::new();
        let mut closed = Vec::new();

        let diamonds = hand.by_suit(Suit::Diamond).size();
        let ace_of_diamonds = Card::new(Rank::Ace, Suit::Diamond);
        if hand.contains(SHEEP) {
            if diamonds >= SHEEP_OPEN_DIAMONDS && hand.contains(ace_of_diamonds) {
                open.push(SHEEP);
            } else if diamonds >= SHEEP_CLOSED_DIAMONDS {
                closed.push(SHEEP);
            }
        }
        if hand.contains(PIG) && hand.by_suit(Suit::Spade).size() > PIG_GUARD {
            closed.push(PIG);
        }
        if hand.contains(BLOOD) && hand.by_suit(Suit::Heart).size() >= BLOOD_RUN_HEARTS {
            closed.push(BLOOD);
        }

        let declaration = Declaration::new(open, closed).unwrap_or_default();
        event!(
            target: "gongzhu_bot::declare",
            Level::DEBUG,
            seat = %observation.viewer,
            open = %declaration.open(),
            closed = %declaration.all_closed(),
        );
        declaration
    }
}

fn pig_seen(observation: &Observation) -> bool {
    observation
        .seats
        .iter()
        .any(|view| view.played.contains(PIG) || view.collected.contains(PIG))
}

/// Rough cost of taking `cards`; negative when the trick is worth having.
fn trick_penalty(cards: &[Card]) -> i32 {
    cards
        .iter()
        .map(|card| match *card {
            PIG => 100,
            SHEEP => -100,
            DOUBLER => 0,
            card if card.suit == Suit::Heart => heart_points(card.rank) as i32 + 1,
            _ => 0,
        })
        .sum()
}

fn lowest(cards: &[Card]) -> Option<Card> {
    cards.iter().copied().min_by_key(|card| (card.rank, card.suit))
}

fn highest(cards: &[Card]) -> Option<Card> {
    cards.iter().copied().max_by_key(|card| (card.rank, card.suit))
}

fn log_play_decision(observation: &Observation, legal: CardSet, chosen: Card, reason: &str) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }

    let legal_preview = if legal.size() <= 6 {
        legal.to_string()
    } else {
        format!("{} moves", legal.size())
    };

    event!(
        target: "gongzhu_bot::play",
        Level::DEBUG,
        seat = %observation.viewer,
        round = observation.round_count,
        trick_cards = observation.trick.len(),
        legal_count = legal.size(),
        legal_moves = %legal_preview,
        chosen = %chosen,
        reason,
    );
}
