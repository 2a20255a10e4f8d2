//! JSON weight manifests for the model policy.

use crate::policy::features::{CARD_SLOTS, INPUT_SIZE, SCHEMA_VERSION};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeightError {
    #[error("failed to read weight file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write weight file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse weight JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("schema mismatch: observation encoding is {expected} but weights expect {found}")]
    Schema { expected: String, found: String },
    #[error("layer {layer}: {message}")]
    Shape { layer: usize, message: String },
}

/// Dense layer stored row-major: one row of `inputs` weights per output unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerWeights {
    pub inputs: usize,
    pub outputs: usize,
    pub weights: Vec<f32>,
    pub biases: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightManifest {
    pub schema_version: String,
    pub layers: Vec<LayerWeights>,
}

impl WeightManifest {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WeightError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| WeightError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self, WeightError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), WeightError> {
        let path = path.as_ref();
        let json = serde_json::to_string(self)?;
        fs::write(path, json).map_err(|source| WeightError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Small random weights for the given hidden widths, for bootstrapping
    /// self-play before any training has happened.
    pub fn seeded(hidden: &[usize], seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut widths = Vec::with_capacity(hidden.len() + 2);
        widths.push(INPUT_SIZE);
        widths.extend_from_slice(hidden);
        widths.push(CARD_SLOTS);

        let layers = widths
            .windows(2)
            .map(|pair| {
                let (inputs, outputs) = (pair[0], pair[1]);
                let bound = 1.0 / (inputs as f32).sqrt();
                LayerWeights {
                    inputs,
                    outputs,
                    weights: (0..inputs * outputs)
                        .map(|_| rng.gen_range(-bound..bound))
                        .collect(),
                    biases: vec![0.0; outputs],
                }
            })
            .collect();

        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            layers,
        }
    }

    /// Checks the schema tag and that the layers chain from the observation
    /// encoding to one logit per card.
    pub fn validate(&self) -> Result<(), WeightError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(WeightError::Schema {
                expected: SCHEMA_VERSION.to_string(),
                found: self.schema_version.clone(),
            });
        }
        if self.layers.is_empty() {
            return Err(WeightError::Shape {
                layer: 0,
                message: "manifest has no layers".to_string(),
            });
        }

        let mut expected_inputs = INPUT_SIZE;
        for (layer, weights) in self.layers.iter().enumerate() {
            if weights.inputs != expected_inputs {
                return Err(WeightError::Shape {
                    layer,
                    message: format!("expected {} inputs, got {}", expected_inputs, weights.inputs),
                });
            }
            if weights.weights.len() != weights.inputs * weights.outputs {
                return Err(WeightError::Shape {
                    layer,
                    message: format!(
                        "weights wrong size: expected {}, got {}",
                        weights.inputs * weights.outputs,
                        weights.weights.len()
                    ),
                });
            }
            if weights.biases.len() != weights.outputs {
                return Err(WeightError::Shape {
                    layer,
                    message: format!(
                        "biases wrong size: expected {}, got {}",
                        weights.outputs,
                        weights.biases.len()
                    ),
                });
            }
            expected_inputs = weights.outputs;
        }

        if expected_inputs != CARD_SLOTS {
            return Err(WeightError::Shape {
                layer: self.layers.len() - 1,
                message: format!("expected {} outputs, got {}", CARD_SLOTS, expected_inputs),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{WeightError, WeightManifest};

    #[test]
    fn seeded_manifest_validates() {
        let manifest = WeightManifest::seeded(&[64, 32], 1);
        assert!(manifest.validate().is_ok());
        assert_eq!(manifest.layers.len(), 3);
    }

    #[test]
    fn wrong_output_width_is_rejected() {
        let mut manifest = WeightManifest::seeded(&[8], 1);
        let last = manifest.layers.last_mut().unwrap();
        last.outputs = 51;
        last.weights.truncate(8 * 51);
        last.biases.truncate(51);
        assert!(matches!(
            manifest.validate(),
            Err(WeightError::Shape { layer: 1, .. })
        ));
    }

    #[test]
    fn schema_mismatch_is_rejected() {
        let mut manifest = WeightManifest::seeded(&[], 1);
        manifest.schema_version = "hearts-obs".to_string();
        assert!(matches!(manifest.validate(), Err(WeightError::Schema { .. })));
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.json");
        let manifest = WeightManifest::seeded(&[4], 9);
        manifest.to_file(&path).unwrap();
        assert_eq!(WeightManifest::from_file(&path).unwrap(), manifest);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = WeightManifest::from_file("/nonexistent/weights.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/weights.json"));
    }
}
