use gongzhu_core::game::observation::Observation;
use gongzhu_core::game::policy::{Policy, empty_legal_fallback};
use gongzhu_core::model::card::Card;
use gongzhu_core::model::card_set::CardSet;
use gongzhu_core::model::declaration::Declaration;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Uniformly random legal play. Never declares.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &str {
        "random"
    }

    fn decide_action(&mut self, legal_moves: CardSet, _observation: &Observation) -> Card {
        legal_moves
            .draw_arbitrary(&mut self.rng)
            .unwrap_or_else(|_| empty_legal_fallback("random"))
    }

    fn decide_declarations(&mut self, _hand: CardSet, _observation: &Observation) -> Declaration {
        Declaration::none()
    }
}

#[cfg(test)]
mod tests {
    use super::RandomPolicy;
    use gongzhu_core::game::config::DealConfig;
    use gongzhu_core::game::deal::Deal;
    use gongzhu_core::game::policy::Policy;
    use gongzhu_core::model::card::OPENING_CARD;
    use gongzhu_core::model::card_set::CardSet;
    use gongzhu_core::model::player::{Player, Seat};

    fn table(seed: u64) -> [Player; 4] {
        Seat::LOOP.map(|seat| {
            Player::new(
                seat.to_string(),
                seat.to_string(),
                Box::new(RandomPolicy::new(seed + seat.index() as u64)),
            )
        })
    }

    #[test]
    fn picks_only_legal_cards() {
        let deal = Deal::with_seed(table(1), DealConfig::default(), 9).unwrap();
        let seat = deal.current_player().unwrap();
        let legal = deal.legal_moves(seat);
        let observation = deal.observation(seat);
        let mut policy = RandomPolicy::new(3);
        for _ in 0..32 {
            assert!(legal.contains(policy.decide_action(legal, &observation)));
        }
    }

    #[test]
    fn empty_legal_set_gets_the_rejectable_opening_card() {
        let deal = Deal::with_seed(table(2), DealConfig::default(), 4).unwrap();
        let seat = deal.current_player().unwrap();
        let observation = deal.observation(seat);
        let mut policy = RandomPolicy::new(8);
        assert_eq!(policy.decide_action(CardSet::new(), &observation), OPENING_CARD);
    }

    #[test]
    fn seeded_tables_replay_identically() {
        let mut a = Deal::with_seed(table(5), DealConfig::default(), 12).unwrap();
        let mut b = Deal::with_seed(table(5), DealConfig::default(), 12).unwrap();
        a.play_out().unwrap();
        b.play_out().unwrap();
        assert_eq!(a.history(), b.history());
        assert_eq!(a.scores(), b.scores());
    }
}
