//! MLP policy driven by a [`WeightManifest`].
//!
//! The network maps the observation encoding from [`features`](super::features)
//! through ReLU hidden layers to one logit per card. Play is greedy over the
//! legal cards, with an optional epsilon of uniformly random exploration.

use crate::policy::features;
use crate::policy::weights::{WeightError, WeightManifest};
use gongzhu_core::game::observation::Observation;
use gongzhu_core::game::policy::{Policy, empty_legal_fallback};
use gongzhu_core::model::card::Card;
use gongzhu_core::model::card_set::CardSet;
use gongzhu_core::model::declaration::Declaration;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

pub struct ModelPolicy {
    weights: WeightManifest,
    epsilon: f64,
    rng: StdRng,
}

impl ModelPolicy {
    pub fn new(weights: WeightManifest, epsilon: f64, seed: u64) -> Result<Self, WeightError> {
        weights.validate()?;
        Ok(Self {
            weights,
            epsilon: epsilon.clamp(0.0, 1.0),
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P, epsilon: f64, seed: u64) -> Result<Self, WeightError> {
        Self::new(WeightManifest::from_file(path)?, epsilon, seed)
    }

    /// Raw logits for all 52 cards, before legal masking.
    pub fn forward(&self, input: &[f32]) -> Vec<f32> {
        let last = self.weights.layers.len().saturating_sub(1);
        let mut activations = input.to_vec();
        for (index, layer) in self.weights.layers.iter().enumerate() {
            let mut output = vec![0.0f32; layer.outputs];
            matmul_add_bias(
                &activations,
                &layer.weights,
                &layer.biases,
                &mut output,
                layer.inputs,
            );
            if index != last {
                relu(&mut output);
            }
            activations = output;
        }
        activations
    }

    /// Estimated value of playing `card` in `observation`.
    pub fn action_value(&self, observation: &Observation, card: Card) -> f32 {
        let logits = self.forward(&features::encode(observation));
        logits.get(card.index()).copied().unwrap_or(f32::NEG_INFINITY)
    }

    fn select_card_from_logits(logits: &[f32], legal: CardSet) -> Option<Card> {
        legal.iter().max_by(|a, b| {
            let (la, lb) = (logits[a.index()], logits[b.index()]);
            la.total_cmp(&lb)
        })
    }
}

impl Policy for ModelPolicy {
    fn name(&self) -> &str {
        "model"
    }

    fn decide_action(&mut self, legal_moves: CardSet, observation: &Observation) -> Card {
        if self.epsilon > 0.0 && self.rng.gen_bool(self.epsilon) {
            if let Ok(card) = legal_moves.draw_arbitrary(&mut self.rng) {
                return card;
            }
        }
        let logits = self.forward(&features::encode(observation));
        Self::select_card_from_logits(&logits, legal_moves)
            .unwrap_or_else(|| empty_legal_fallback("model"))
    }

    // The network has no declaration head.
    fn decide_declarations(&mut self, _hand: CardSet, _observation: &Observation) -> Declaration {
        Declaration::none()
    }
}

/// `output[j] = sum_i(input[i] * weights[j * input_size + i]) + bias[j]`
fn matmul_add_bias(
    input: &[f32],
    weights: &[f32],
    biases: &[f32],
    output: &mut [f32],
    input_size: usize,
) {
    debug_assert_eq!(input.len(), input_size);
    debug_assert_eq!(weights.len(), output.len() * input_size);

    for (j, out) in output.iter_mut().enumerate() {
        let row = &weights[j * input_size..(j + 1) * input_size];
        *out = biases[j] + row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>();
    }
}

fn relu(values: &mut [f32]) {
    for value in values.iter_mut() {
        *value = value.max(0.0);
    }
}
