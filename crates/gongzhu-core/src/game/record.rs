use crate::game::deal::Deal;
use crate::game::effects::Effects;
use crate::model::card::Card;
use crate::model::declaration::Declaration;
use crate::model::player::{Seat, Team};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatRecord {
    pub seat: Seat,
    pub player_id: String,
    pub name: String,
    pub policy: String,
    pub declaration: Declaration,
    pub score: f64,
}

/// Everything needed to persist or replay a finished deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub completed: bool,
    pub history: Vec<Card>,
    pub trick_leaders: Vec<Seat>,
    pub effects: Effects,
    pub seats: Vec<SeatRecord>,
    pub north_south: f64,
    pub east_west: f64,
}

impl DealRecord {
    pub fn capture(deal: &Deal) -> Self {
        let seats = Seat::LOOP
            .iter()
            .map(|&seat| {
                let player = deal.player(seat);
                SeatRecord {
                    seat,
                    player_id: player.id().to_string(),
                    name: player.name().to_string(),
                    policy: player.policy_name().to_string(),
                    declaration: player.declaration().clone(),
                    score: deal.score(seat),
                }
            })
            .collect();

        DealRecord {
            id: deal.id().to_string(),
            seed: deal.seed(),
            completed: deal.is_end_of_deal(),
            history: deal.history().to_vec(),
            trick_leaders: deal.first_player_indices().to_vec(),
            effects: *deal.effects(),
            seats,
            north_south: deal.team_score(Team::NorthSouth),
            east_west: deal.team_score(Team::EastWest),
        }
    }

    pub fn score_diff(&self) -> f64 {
        self.north_south - self.east_west
    }

    pub fn to_json(deal: &Deal) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&Self::capture(deal))
    }

    /// Single-line form, one record per line in a JSONL log.
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::DealRecord;
    use crate::game::config::DealConfig;
    use crate::game::deal::Deal;
    use crate::game::policy::FirstLegalPolicy;
    use crate::model::player::{Player, Seat};

    fn finished_deal(seed: u64) -> Deal {
        let players = Seat::LOOP.map(|seat| {
            Player::new(format!("p{}", seat.index()), seat.to_string(), Box::new(FirstLegalPolicy))
        });
        let mut deal = Deal::with_seed(players, DealConfig::default(), seed).unwrap();
        deal.play_out().unwrap();
        deal
    }

    #[test]
    fn record_serializes_cards_as_text() {
        let deal = finished_deal(42);
        let json = DealRecord::to_json(&deal).unwrap();
        assert!(json.contains("\"seed\": 42"));
        assert!(json.contains("\"QS\""));
        assert!(json.contains("\"policy\": \"first-legal\""));
    }

    #[test]
    fn record_roundtrips_through_json() {
        let deal = finished_deal(7);
        let record = DealRecord::capture(&deal);
        let restored = DealRecord::from_json(&record.to_json_line().unwrap()).unwrap();
        assert_eq!(restored, record);
        assert!(restored.completed);
        assert_eq!(restored.history.len(), 52);
        assert_eq!(restored.score_diff(), deal.score_diff());
    }

    #[test]
    fn legacy_record_without_seed_loads() {
        let json = r#"{
            "id": "abc",
            "completed": false,
            "history": ["2S"],
            "trick_leaders": ["West"],
            "effects": {"pig": 4.0, "sheep": 1.0, "doubler": 1.0, "blood": 1.0},
            "seats": [],
            "north_south": 0.0,
            "east_west": 0.0
        }"#;
        let record = DealRecord::from_json(json).unwrap();
        assert_eq!(record.seed, None);
        assert_eq!(record.trick_leaders, vec![Seat::West]);
        assert_eq!(record.effects.pig, 4.0);
    }
}
