//! Team Elo for partnership play.
//!
//! North/South and East/West are rated as the mean of their members. The
//! K factor grows with the logarithm of the score margin, so a lopsided deal
//! moves ratings further than a narrow one, and each member takes half of
//! the team's change.

use gongzhu_core::model::player::{Seat, Team};

/// Probability that a side rated `diff` points above its opponent wins.
pub fn expected_score(diff: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf(-diff / 400.0))
}

/// 1 for a positive margin, 0 for a negative one, 0.5 for a tie.
pub fn actual_score(margin: f64) -> f64 {
    if margin > 0.0 {
        1.0
    } else if margin < 0.0 {
        0.0
    } else {
        0.5
    }
}

pub fn adjusted_k(k_factor: f64, margin: f64) -> f64 {
    k_factor * margin.abs().ln_1p()
}

/// Rating changes per seat after a deal, indexed like [`Seat::index`].
///
/// `margin` is North/South's score minus East/West's.
pub fn team_deltas(ratings: [f64; 4], margin: f64, k_factor: f64) -> [f64; 4] {
    let team_rating = |team: Team| {
        let [a, b] = team.seats();
        (ratings[a.index()] + ratings[b.index()]) / 2.0
    };
    let north_south = team_rating(Team::NorthSouth);
    let east_west = team_rating(Team::EastWest);

    let k = adjusted_k(k_factor, margin);
    let ns_actual = actual_score(margin);
    let ns_change = k * (ns_actual - expected_score(north_south - east_west));
    let ew_change = k * ((1.0 - ns_actual) - expected_score(east_west - north_south));

    Seat::LOOP.map(|seat| match seat.team() {
        Team::NorthSouth => ns_change / 2.0,
        Team::EastWest => ew_change / 2.0,
    })
}
