use serde::{Deserialize, Serialize};

/// Per-deal rule switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DealConfig {
    /// Run a declaration sub-phase before the first trick.
    pub enable_declarations: bool,
}

impl DealConfig {
    pub fn with_declarations() -> Self {
        Self {
            enable_declarations: true,
        }
    }
}
