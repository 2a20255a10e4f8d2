use crate::model::card::Card;
use crate::model::card_set::CardSet;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

pub const HAND_SIZE: usize = 13;

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn standard() -> Self {
        Self {
            cards: CardSet::full().to_vec(),
        }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.cards.shuffle(rng);
        deck
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Splits the deck into four consecutive 13-card hands.
    pub fn deal(&self) -> [CardSet; 4] {
        let mut hands = [CardSet::new(); 4];
        for (position, chunk) in self.cards.chunks(HAND_SIZE).take(4).enumerate() {
            hands[position] = chunk.iter().copied().collect();
        }
        hands
    }
}
