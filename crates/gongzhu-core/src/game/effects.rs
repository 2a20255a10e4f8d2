use crate::model::card::SpecialCard;
use crate::model::declaration::Declaration;
use serde::{Deserialize, Serialize};

pub const BASE: f64 = 1.0;
pub const CLOSED: f64 = 2.0;
pub const OPEN: f64 = 4.0;

/// Scoring multipliers of the four special cards for one deal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Effects {
    pub pig: f64,
    pub sheep: f64,
    pub doubler: f64,
    pub blood: f64,
}

impl Default for Effects {
    fn default() -> Self {
        Self::neutral()
    }
}

impl Effects {
    pub const fn neutral() -> Self {
        Self {
            pig: BASE,
            sheep: BASE,
            doubler: BASE,
            blood: BASE,
        }
    }

    pub fn get(&self, special: SpecialCard) -> f64 {
        match special {
            SpecialCard::Pig => self.pig,
            SpecialCard::Sheep => self.sheep,
            SpecialCard::Doubler => self.doubler,
            SpecialCard::Blood => self.blood,
        }
    }

    fn raise(&mut self, special: SpecialCard, value: f64) {
        let slot = match special {
            SpecialCard::Pig => &mut self.pig,
            SpecialCard::Sheep => &mut self.sheep,
            SpecialCard::Doubler => &mut self.doubler,
            SpecialCard::Blood => &mut self.blood,
        };
        *slot = slot.max(value);
    }

    /// Whether `special` was openly declared by someone this deal.
    pub fn is_open(&self, special: SpecialCard) -> bool {
        self.get(special) >= OPEN
    }

    /// Folds declarations into the multipliers. Open declarations count as
    /// [`OPEN`], revealed closed ones as [`CLOSED`]; unrevealed closed
    /// declarations are not yet public and are skipped. Values never drop.
    pub fn absorb<'a, I>(&mut self, declarations: I)
    where
        I: IntoIterator<Item = &'a Declaration>,
    {
        for declaration in declarations {
            for card in declaration.revealed_closed() {
                if let Some(special) = card.special() {
                    self.raise(special, CLOSED);
                }
            }
            for card in declaration.open() {
                if let Some(special) = card.special() {
                    self.raise(special, OPEN);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CLOSED, Effects, OPEN};
    use crate::model::card::{BLOOD, DOUBLER, PIG, SHEEP, SpecialCard};
    use crate::model::card_set::CardSet;
    use crate::model::declaration::Declaration;

    #[test]
    fn open_beats_closed() {
        let open = Declaration::new([PIG], CardSet::new()).unwrap();
        let mut closed = Declaration::new(CardSet::new(), [SHEEP, DOUBLER]).unwrap();
        closed.reveal(SHEEP);

        let mut effects = Effects::neutral();
        effects.absorb([&open, &closed]);

        assert_eq!(effects.pig, OPEN);
        assert_eq!(effects.sheep, CLOSED);
        assert_eq!(effects.doubler, 1.0, "unrevealed closed stays hidden");
        assert_eq!(effects.blood, 1.0);
        assert!(effects.is_open(SpecialCard::Pig));
        assert!(!effects.is_open(SpecialCard::Sheep));
    }

    #[test]
    fn multipliers_never_decrease() {
        let open = Declaration::new([BLOOD], CardSet::new()).unwrap();
        let mut effects = Effects::neutral();
        effects.absorb([&open]);
        effects.absorb([&Declaration::none()]);
        assert_eq!(effects.get(SpecialCard::Blood), OPEN);
    }
}
