//! Per-seat snapshot of a deal. Only the viewer's hand and declaration are
//! shown in full; other seats expose public information plus a count of
//! closed declarations that have not been revealed yet.

use crate::game::deal::Deal;
use crate::game::effects::Effects;
use crate::game::rules::{self, SuitRounds};
use crate::model::card::Card;
use crate::model::card_set::CardSet;
use crate::model::declaration::{Declaration, PublicDeclaration};
use crate::model::player::Seat;
use crate::model::trick::Trick;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatView {
    pub seat: Seat,
    pub hand_size: usize,
    pub collected: CardSet,
    pub played: CardSet,
    pub current_trick_card: Option<Card>,
    pub declaration: PublicDeclaration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub viewer: Seat,
    pub hand: CardSet,
    pub declaration: Declaration,
    pub seats: [SeatView; 4],
    pub history: Vec<Card>,
    pub first_player_indices: Vec<Seat>,
    pub trick: Trick,
    pub current_player: Option<Seat>,
    pub round_count: usize,
    pub suit_rounds: SuitRounds,
    pub effects: Effects,
    pub declaration_phase: bool,
}

impl Observation {
    pub fn capture(deal: &Deal, viewer: Seat) -> Self {
        let seats = Seat::LOOP.map(|seat| {
            let player = deal.player(seat);
            SeatView {
                seat,
                hand_size: player.hand().size(),
                collected: *player.collected(),
                played: *player.played(),
                current_trick_card: player.current_trick_card(),
                declaration: player.declaration().public_view(),
            }
        });
        let me = deal.player(viewer);

        Self {
            viewer,
            hand: *me.hand(),
            declaration: me.declaration().clone(),
            seats,
            history: deal.history().to_vec(),
            first_player_indices: deal.first_player_indices().to_vec(),
            trick: deal.trick().clone(),
            current_player: deal.current_player(),
            round_count: deal.round_count(),
            suit_rounds: *deal.suit_rounds(),
            effects: *deal.effects(),
            declaration_phase: deal.is_declaration_phase(),
        }
    }

    pub fn seat(&self, seat: Seat) -> &SeatView {
        &self.seats[seat.index()]
    }

    pub fn is_my_turn(&self) -> bool {
        self.current_player == Some(self.viewer)
    }

    /// Legal plays for the viewer under the snapshot's state.
    pub fn legal_moves(&self) -> CardSet {
        rules::legal_moves(
            &self.hand,
            self.trick.led_suit(),
            &self.effects,
            &self.suit_rounds,
        )
    }

    /// Cards neither in the viewer's hand nor already played by anyone.
    pub fn unseen(&self) -> CardSet {
        let played = self
            .seats
            .iter()
            .fold(CardSet::new(), |acc, view| acc.union(&view.played));
        CardSet::full().without(&played).without(&self.hand)
    }
}
