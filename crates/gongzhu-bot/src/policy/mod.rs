mod heuristic;
mod model;
mod random;

pub mod features;
pub mod weights;

pub use gongzhu_core::game::policy::{FirstLegalPolicy, Policy};
pub use heuristic::HeuristicPolicy;
pub use model::ModelPolicy;
pub use random::RandomPolicy;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use weights::{WeightError, WeightManifest};

/// Hidden widths used when a model seat has no weight file.
pub const DEFAULT_HIDDEN: [usize; 2] = [128, 64];

/// Policy kind enumeration for factory construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    Random,
    Heuristic,
    Model,
}

/// Tuning knobs shared by the policy variants. Each kind reads the fields it needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyParams {
    pub seed: Option<u64>,
    /// Weight manifest for `model`; seeded random weights when absent.
    pub weights: Option<PathBuf>,
    /// Exploration rate for `model`.
    pub epsilon: f64,
    /// Disable declarations for `heuristic`.
    pub no_declarations: bool,
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("unknown policy kind {0:?} (expected random, heuristic or model)")]
    UnknownKind(String),
    #[error(transparent)]
    Weights(#[from] WeightError),
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [PolicyKind::Random, PolicyKind::Heuristic, PolicyKind::Model];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Heuristic => "heuristic",
            Self::Model => "model",
        }
    }

    pub fn create(&self, params: &PolicyParams) -> Result<Box<dyn Policy>, PolicyError> {
        let seed = params.seed.unwrap_or_else(rand::random);
        Ok(match self {
            Self::Random => Box::new(RandomPolicy::new(seed)),
            Self::Heuristic if params.no_declarations => {
                Box::new(HeuristicPolicy::without_declarations())
            }
            Self::Heuristic => Box::new(HeuristicPolicy::new()),
            Self::Model => {
                let manifest = match &params.weights {
                    Some(path) => WeightManifest::from_file(path)?,
                    None => WeightManifest::seeded(&DEFAULT_HIDDEN, seed),
                };
                Box::new(ModelPolicy::new(manifest, params.epsilon, seed)?)
            }
        })
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "heuristic" | "greedy" => Ok(Self::Heuristic),
            "model" | "dmc" => Ok(Self::Model),
            other => Err(PolicyError::UnknownKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PolicyKind, PolicyParams};

    #[test]
    fn parses_kind_names() {
        assert_eq!("Heuristic".parse::<PolicyKind>().unwrap(), PolicyKind::Heuristic);
        assert_eq!("dmc".parse::<PolicyKind>().unwrap(), PolicyKind::Model);
        assert!("oracle".parse::<PolicyKind>().is_err());
    }

    #[test]
    fn factory_builds_every_kind() {
        let params = PolicyParams {
            seed: Some(3),
            ..PolicyParams::default()
        };
        for kind in PolicyKind::ALL {
            let policy = kind.create(&params).unwrap();
            assert_eq!(policy.name(), kind.as_str());
        }
    }

    #[test]
    fn missing_weight_file_is_an_error() {
        let params = PolicyParams {
            weights: Some("/nonexistent/model.json".into()),
            ..PolicyParams::default()
        };
        assert!(PolicyKind::Model.create(&params).is_err());
    }
}
