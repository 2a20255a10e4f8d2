//! The deal engine: dealing, the optional declaration sub-phase, trick play
//! and trick resolution for one distribution of the deck.
//!
//! Every mutating operation validates before it writes, so an `Err` leaves
//! the deal exactly as it was. Completed tricks are not resolved implicitly:
//! [`Deal::next_round`] has to be called once four cards are down, which the
//! driver helpers ([`Deal::advance`], [`Deal::play_until`], [`Deal::play_out`])
//! do for you.

use crate::error::{CardError, DealError};
use crate::game::config::DealConfig;
use crate::game::effects::Effects;
use crate::game::observation::Observation;
use crate::game::rules::{self, SuitRounds};
use crate::model::card::{Card, OPENING_CARD};
use crate::model::card_set::CardSet;
use crate::model::deck::{Deck, HAND_SIZE};
use crate::model::declaration::Declaration;
use crate::model::player::{Player, Seat, Team};
use crate::model::suit::Suit;
use crate::model::trick::Trick;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{Level, event};

pub const TRICKS_PER_DEAL: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealPhase {
    Declaring,
    Playing,
    Ended,
}

/// Result of resolving a full trick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrickSummary {
    pub winner: Seat,
    pub led_suit: Suit,
    pub cards: CardSet,
    pub round_count: usize,
    pub deal_ended: bool,
}

/// One step taken by a driver helper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Declared { seat: Seat },
    Played { seat: Seat, card: Card },
    TrickResolved(TrickSummary),
}

pub struct Deal {
    id: String,
    seed: Option<u64>,
    config: DealConfig,
    players: [Player; 4],
    phase: DealPhase,
    round_count: usize,
    first_player: Option<Seat>,
    current_player: Option<Seat>,
    trick: Trick,
    history: Vec<Card>,
    first_player_indices: Vec<Seat>,
    suit_rounds: SuitRounds,
    effects: Effects,
    has_moved: [bool; 4],
}

impl Deal {
    /// Deals a freshly shuffled deck from an entropy seed.
    pub fn new(players: [Player; 4], config: DealConfig) -> Result<Self, DealError> {
        Self::with_seed(players, config, rand::random())
    }

    pub fn with_seed(players: [Player; 4], config: DealConfig, seed: u64) -> Result<Self, DealError> {
        let mut deal = Self::empty(players, config);
        deal.reset(seed)?;
        Ok(deal)
    }

    /// Starts a deal from explicit hands, which must partition the deck
    /// into four hands of thirteen.
    pub fn from_hands(
        players: [Player; 4],
        config: DealConfig,
        hands: [CardSet; 4],
    ) -> Result<Self, DealError> {
        check_partition(&hands)?;
        let mut rng = StdRng::seed_from_u64(rand::random());
        let mut deal = Self::empty(players, config);
        deal.setup(hands, deal_id(&mut rng), None)?;
        Ok(deal)
    }

    fn empty(players: [Player; 4], config: DealConfig) -> Self {
        Self {
            id: String::new(),
            seed: None,
            config,
            players,
            phase: DealPhase::Ended,
            round_count: 0,
            first_player: None,
            current_player: None,
            trick: Trick::new(Seat::North),
            history: Vec::new(),
            first_player_indices: Vec::new(),
            suit_rounds: [0; 4],
            effects: Effects::neutral(),
            has_moved: [false; 4],
        }
    }

    /// Reshuffles and redeals to the same players. Ratings and policies carry over.
    pub fn reset(&mut self, seed: u64) -> Result<(), DealError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let deck = Deck::shuffled(&mut rng);
        let id = deal_id(&mut rng);
        self.setup(deck.deal(), id, Some(seed))
    }

    fn setup(&mut self, hands: [CardSet; 4], id: String, seed: Option<u64>) -> Result<(), DealError> {
        let leader = hands
            .iter()
            .position(|hand| hand.contains(OPENING_CARD))
            .and_then(Seat::from_index)
            .ok_or(DealError::NoEligibleLeader)?;

        for (player, hand) in self.players.iter_mut().zip(hands) {
            player.reset();
            player.receive_hand(hand);
        }

        self.id = id;
        self.seed = seed;
        self.phase = if self.config.enable_declarations {
            DealPhase::Declaring
        } else {
            DealPhase::Playing
        };
        self.round_count = 0;
        self.first_player = Some(leader);
        self.current_player = Some(leader);
        self.trick = Trick::new(leader);
        self.history = Vec::with_capacity(52);
        self.first_player_indices = vec![leader];
        self.suit_rounds = [0; 4];
        self.effects = Effects::neutral();
        self.has_moved = [false; 4];

        event!(
            Level::DEBUG,
            deal_id = %self.id,
            leader = %leader,
            declarations = self.config.enable_declarations,
            "deal set up"
        );
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn config(&self) -> &DealConfig {
        &self.config
    }

    pub fn phase(&self) -> DealPhase {
        self.phase
    }

    pub fn player(&self, seat: Seat) -> &Player {
        &self.players[seat.index()]
    }

    /// Mutable access for identity, rating and policy changes between deals.
    pub fn player_mut(&mut self, seat: Seat) -> &mut Player {
        &mut self.players[seat.index()]
    }

    pub fn players(&self) -> &[Player; 4] {
        &self.players
    }

    pub fn into_players(self) -> [Player; 4] {
        self.players
    }

    pub fn round_count(&self) -> usize {
        self.round_count
    }

    pub fn first_player(&self) -> Option<Seat> {
        self.first_player
    }

    pub fn current_player(&self) -> Option<Seat> {
        self.current_player
    }

    /// Seat index of the player to act, `None` once the deal has ended.
    pub fn current_player_index(&self) -> Option<usize> {
        self.current_player.map(Seat::index)
    }

    pub fn trick(&self) -> &Trick {
        &self.trick
    }

    pub fn history(&self) -> &[Card] {
        &self.history
    }

    pub fn first_player_indices(&self) -> &[Seat] {
        &self.first_player_indices
    }

    pub fn suit_rounds(&self) -> &SuitRounds {
        &self.suit_rounds
    }

    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    pub fn has_moved(&self, seat: Seat) -> bool {
        self.has_moved[seat.index()]
    }

    pub fn is_declaration_phase(&self) -> bool {
        self.phase == DealPhase::Declaring
    }

    pub fn is_end_of_trick(&self) -> bool {
        self.trick.is_complete()
    }

    pub fn is_end_of_deal(&self) -> bool {
        self.phase == DealPhase::Ended
    }

    pub fn observation(&self, viewer: Seat) -> Observation {
        Observation::capture(self, viewer)
    }

    /// Legal plays for `seat` against the current trick.
    pub fn legal_moves(&self, seat: Seat) -> CardSet {
        rules::legal_moves(
            self.players[seat.index()].hand(),
            self.trick.led_suit(),
            &self.effects,
            &self.suit_rounds,
        )
    }

    pub fn is_legal_move(&self, seat: Seat, card: Card) -> bool {
        self.phase == DealPhase::Playing
            && self.current_player == Some(seat)
            && !self.trick.is_complete()
            && self.legal_moves(seat).contains(card)
    }

    pub fn is_legal_declaration(&self, seat: Seat, declaration: &Declaration) -> bool {
        declaration
            .validate(self.players[seat.index()].hand())
            .is_ok()
    }

    fn expect_turn(&self, seat: Seat) -> Result<(), DealError> {
        match self.current_player {
            Some(expected) if expected == seat => Ok(()),
            Some(expected) => Err(DealError::OutOfTurn {
                expected,
                actual: seat,
            }),
            None => Err(DealError::DealEnded),
        }
    }

    /// Records `seat`'s declaration. Once all four seats have declared the
    /// effects are computed and play starts with the opening leader.
    pub fn declare(&mut self, seat: Seat, declaration: Declaration) -> Result<(), DealError> {
        match self.phase {
            DealPhase::Declaring => {}
            DealPhase::Playing => {
                return Err(DealError::WrongPhase {
                    expected: "declaration",
                });
            }
            DealPhase::Ended => return Err(DealError::DealEnded),
        }
        self.expect_turn(seat)?;
        if let Err(source) = declaration.validate(self.players[seat.index()].hand()) {
            event!(Level::WARN, deal_id = %self.id, seat = %seat, error = %source, "declaration rejected");
            return Err(DealError::IllegalDeclaration { seat, source });
        }

        event!(
            Level::DEBUG,
            deal_id = %self.id,
            seat = %seat,
            open = %declaration.open(),
            closed = declaration.closed_entries().len(),
            "declaration accepted"
        );
        self.players[seat.index()].set_declaration(declaration);
        self.has_moved[seat.index()] = true;
        self.current_player = Some(seat.next());

        if self.has_moved.iter().all(|moved| *moved) {
            self.finish_declarations();
        }
        Ok(())
    }

    fn finish_declarations(&mut self) {
        self.has_moved = [false; 4];
        self.phase = DealPhase::Playing;
        self.current_player = self.first_player;
        self.refresh_effects();
    }

    fn refresh_effects(&mut self) {
        let before = self.effects;
        self.effects
            .absorb(self.players.iter().map(|player| player.declaration()));
        if self.effects != before {
            event!(
                Level::DEBUG,
                deal_id = %self.id,
                pig = self.effects.pig,
                sheep = self.effects.sheep,
                doubler = self.effects.doubler,
                blood = self.effects.blood,
                "effects updated"
            );
        }
    }

    /// Lays `card` from `seat`'s hand into the current trick.
    pub fn play_card(&mut self, seat: Seat, card: Card) -> Result<(), DealError> {
        match self.phase {
            DealPhase::Playing => {}
            DealPhase::Declaring => {
                return Err(DealError::WrongPhase {
                    expected: "trick play",
                });
            }
            DealPhase::Ended => return Err(DealError::DealEnded),
        }
        if self.trick.is_complete() {
            return Err(DealError::TrickComplete);
        }
        self.expect_turn(seat)?;
        if !self.legal_moves(seat).contains(card) {
            event!(Level::WARN, deal_id = %self.id, seat = %seat, card = %card, "illegal move rejected");
            return Err(DealError::IllegalMove { seat, card });
        }

        let revealed = self.players[seat.index()].lay_card(card)?;
        if revealed || card.is_special() {
            self.refresh_effects();
        }
        self.trick.push(seat, card);
        self.history.push(card);
        self.has_moved[seat.index()] = true;
        self.current_player = Some(seat.next());

        event!(Level::TRACE, deal_id = %self.id, seat = %seat, card = %card, revealed, "card played");
        Ok(())
    }

    /// Resolves a complete trick: the highest card of the led suit takes all
    /// four cards and leads next.
    pub fn next_round(&mut self) -> Result<TrickSummary, DealError> {
        match self.phase {
            DealPhase::Playing => {}
            DealPhase::Declaring => {
                return Err(DealError::WrongPhase {
                    expected: "trick play",
                });
            }
            DealPhase::Ended => return Err(DealError::DealEnded),
        }
        let incomplete = DealError::TrickIncomplete {
            played: self.trick.len(),
        };
        let (winner, led_suit) = match (self.trick.winner(), self.trick.led_suit()) {
            (Some(winner), Some(led_suit)) => (winner, led_suit),
            _ => return Err(incomplete),
        };
        let cards = self.trick.card_set();

        self.players[winner.index()].collect(&cards);
        for player in self.players.iter_mut() {
            player.clear_trick_card();
        }
        self.suit_rounds[led_suit.index()] += 1;
        self.round_count += 1;
        self.has_moved = [false; 4];

        let deal_ended = self.round_count == TRICKS_PER_DEAL;
        event!(
            Level::DEBUG,
            deal_id = %self.id,
            winner = %winner,
            led_suit = %led_suit,
            cards = %cards,
            round = self.round_count,
            "trick resolved"
        );

        if deal_ended {
            self.phase = DealPhase::Ended;
            self.first_player = None;
            self.current_player = None;
            self.trick = Trick::new(winner);
            let scores = self.scores();
            event!(
                Level::INFO,
                deal_id = %self.id,
                north = scores[0],
                east = scores[1],
                south = scores[2],
                west = scores[3],
                diff = self.score_diff(),
                "deal finished"
            );
        } else {
            self.first_player = Some(winner);
            self.current_player = Some(winner);
            self.first_player_indices.push(winner);
            self.trick = Trick::new(winner);
        }

        Ok(TrickSummary {
            winner,
            led_suit,
            cards,
            round_count: self.round_count,
            deal_ended,
        })
    }

    /// Lets the current seat's policy take one action.
    pub fn next_player(&mut self) -> Result<Progress, DealError> {
        let seat = self.current_player.ok_or(DealError::DealEnded)?;
        let observation = self.observation(seat);
        match self.phase {
            DealPhase::Declaring => {
                let hand = *self.players[seat.index()].hand();
                let declaration = self.players[seat.index()]
                    .policy_mut()
                    .decide_declarations(hand, &observation);
                self.declare(seat, declaration)?;
                Ok(Progress::Declared { seat })
            }
            DealPhase::Playing => {
                if self.trick.is_complete() {
                    return Err(DealError::TrickComplete);
                }
                let legal = self.legal_moves(seat);
                let card = self.players[seat.index()]
                    .policy_mut()
                    .decide_action(legal, &observation);
                self.play_card(seat, card)?;
                Ok(Progress::Played { seat, card })
            }
            DealPhase::Ended => Err(DealError::DealEnded),
        }
    }

    /// Resolves the trick if it is complete, otherwise asks the next policy to act.
    pub fn advance(&mut self) -> Result<Progress, DealError> {
        if self.phase == DealPhase::Playing && self.trick.is_complete() {
            return self.next_round().map(Progress::TrickResolved);
        }
        self.next_player()
    }

    /// Auto-plays other seats until `seat` must act or the deal ends.
    pub fn play_until(&mut self, seat: Seat) -> Result<(), DealError> {
        while !self.is_end_of_deal() {
            if self.current_player == Some(seat) && !self.trick.is_complete() {
                break;
            }
            self.advance()?;
        }
        Ok(())
    }

    pub fn play_out(&mut self) -> Result<(), DealError> {
        while !self.is_end_of_deal() {
            self.advance()?;
        }
        Ok(())
    }

    pub fn score(&self, seat: Seat) -> f64 {
        self.players[seat.index()].score(&self.effects)
    }

    pub fn scores(&self) -> [f64; 4] {
        Seat::LOOP.map(|seat| self.score(seat))
    }

    pub fn team_score(&self, team: Team) -> f64 {
        team.seats().iter().map(|seat| self.score(*seat)).sum()
    }

    /// North/South minus East/West.
    pub fn score_diff(&self) -> f64 {
        self.team_score(Team::NorthSouth) - self.team_score(Team::EastWest)
    }
}

fn deal_id(rng: &mut StdRng) -> String {
    format!("{:016x}{:016x}", rng.next_u64(), rng.next_u64())
}

fn check_partition(hands: &[CardSet; 4]) -> Result<(), CardError> {
    let mut seen = CardSet::new();
    for hand in hands {
        for card in hand {
            if !seen.add(card) {
                return Err(CardError::DuplicateCard(card));
            }
        }
    }
    if let Some(short) = hands.iter().find(|hand| hand.size() < HAND_SIZE) {
        return Err(CardError::InsufficientCards {
            missing: HAND_SIZE - short.size(),
        });
    }
    Ok(())
}

impl std::fmt::Debug for Deal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deal")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("round_count", &self.round_count)
            .field("current_player", &self.current_player)
            .field("trick", &self.trick)
            .field("effects", &self.effects)
            .finish()
    }
}
