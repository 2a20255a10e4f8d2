//! Fixed-size numeric encoding of an [`Observation`] for the model policy.
//!
//! Seats are laid out relative to the viewer (viewer first, then in play
//! order). Each seat contributes six 52-slot planes:
//!
//! | plane | viewer | other seats |
//! |-------|--------|-------------|
//! | 0 | hand | cards the viewer has not seen |
//! | 1 | collected | collected |
//! | 2 | played | played |
//! | 3 | card in current trick | card in current trick |
//! | 4 | closed declarations | revealed closed declarations |
//! | 5 | open declarations | open declarations |

use gongzhu_core::game::observation::Observation;
use gongzhu_core::model::card_set::CardSet;

pub const CARD_SLOTS: usize = 52;
pub const PLANES_PER_SEAT: usize = 6;
pub const INPUT_SIZE: usize = CARD_SLOTS * PLANES_PER_SEAT * 4;
pub const SCHEMA_VERSION: &str = "gongzhu-obs-1";

pub fn encode(observation: &Observation) -> Vec<f32> {
    let mut input = vec![0.0f32; INPUT_SIZE];
    let unseen = observation.unseen();

    for offset in 0..4 {
        let seat = observation.viewer.offset(offset);
        let view = observation.seat(seat);
        let own = offset == 0;

        let current = view
            .current_trick_card
            .map(CardSet::single)
            .unwrap_or_default();
        let planes = [
            if own { observation.hand } else { unseen },
            view.collected,
            view.played,
            current,
            if own {
                observation.declaration.all_closed()
            } else {
                view.declaration.revealed_closed
            },
            view.declaration.open,
        ];

        for (plane, cards) in planes.iter().enumerate() {
            let base = (offset * PLANES_PER_SEAT + plane) * CARD_SLOTS;
            for card in cards {
                input[base + card.index()] = 1.0;
            }
        }
    }
    input
}
