use gongzhu_bot::policy::{PolicyKind, PolicyParams};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

pub const DEFAULT_INITIAL_RATING: f64 = 1500.0;
pub const DEFAULT_K_FACTOR: f64 = 16.0;
const MAX_WORKERS: usize = 256;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root arena configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ArenaConfig {
    pub run_id: String,
    pub deals: DealsConfig,
    pub agents: Vec<AgentConfig>,
    #[serde(default)]
    pub rating: RatingConfig,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ArenaConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let mut cfg: ArenaConfig =
            serde_yaml::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.deals.validate()?;
        self.rating.validate()?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        validate_agents(&self.agents)?;
        Ok(())
    }

    /// Resolve `{run_id}` placeholders into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }

    /// Total number of rated entrants across all agents.
    pub fn entrant_count(&self) -> usize {
        self.agents.iter().map(|agent| agent.copies).sum()
    }
}

/// How many deals to play and how.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DealsConfig {
    pub count: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub enable_declarations: bool,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl DealsConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.count == 0 {
            return Err(invalid("deals.count", "number of deals must be greater than zero"));
        }
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(invalid(
                "deals.workers",
                format!("workers must be between 1 and {MAX_WORKERS}"),
            ));
        }
        Ok(())
    }
}

fn default_workers() -> usize {
    1
}

/// One agent definition. `copies` independent entrants share the policy
/// kind and parameters but carry their own rating.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    #[serde(deserialize_with = "deserialize_kind")]
    pub kind: PolicyKind,
    #[serde(default = "default_copies")]
    pub copies: usize,
    #[serde(default, deserialize_with = "null_as_default")]
    pub params: PolicyParams,
}

fn default_copies() -> usize {
    1
}

// Accepts the aliases `PolicyKind::from_str` knows ("greedy", "dmc").
fn deserialize_kind<'de, D>(deserializer: D) -> Result<PolicyKind, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Elo parameters.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RatingConfig {
    #[serde(default = "default_initial_rating")]
    pub initial: f64,
    #[serde(default = "default_k_factor")]
    pub k_factor: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            initial: DEFAULT_INITIAL_RATING,
            k_factor: DEFAULT_K_FACTOR,
        }
    }
}

impl RatingConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if !self.initial.is_finite() {
            return Err(invalid("rating.initial", "initial rating must be finite"));
        }
        if !self.k_factor.is_finite() || self.k_factor <= 0.0 {
            return Err(invalid("rating.k_factor", "k factor must be a positive number"));
        }
        Ok(())
    }
}

fn default_initial_rating() -> f64 {
    DEFAULT_INITIAL_RATING
}

fn default_k_factor() -> f64 {
    DEFAULT_K_FACTOR
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(label, "path must not be empty"));
            }
            if resolve_template(run_id, value).components().count() == 0 {
                return Err(invalid(label, "resolved path is invalid"));
            }
        }
        if self.jsonl == self.summary_md {
            return Err(invalid(
                "outputs.summary_md",
                "summary must not overwrite the deal log",
            ));
        }
        Ok(())
    }
}

/// Structured logging is off unless asked for.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(invalid("run_id", "run_id must not be empty"));
    }
    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(invalid(
            "run_id",
            "run_id may only contain alphanumeric characters, '.', '_' or '-'",
        ));
    }
    Ok(())
}

fn validate_agents(agents: &[AgentConfig]) -> Result<(), ValidationError> {
    if agents.is_empty() {
        return Err(invalid("agents", "at least one agent must be specified"));
    }

    let mut seen = HashSet::new();
    for agent in agents {
        if agent.name.trim().is_empty() {
            return Err(invalid("agents.name", "agent name must not be empty"));
        }
        if !agent.name.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
            return Err(invalid(
                format!("agents[{}].name", agent.name),
                "agent name contains invalid characters",
            ));
        }
        if !seen.insert(agent.name.as_str()) {
            return Err(invalid(
                "agents",
                format!("agent name '{}' defined more than once", agent.name),
            ));
        }
        if agent.copies == 0 {
            return Err(invalid(
                format!("agents[{}].copies", agent.name),
                "copies must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&agent.params.epsilon) {
            return Err(invalid(
                format!("agents[{}].params.epsilon", agent.name),
                "epsilon must lie in [0, 1]",
            ));
        }
    }

    let entrants: usize = agents.iter().map(|agent| agent.copies).sum();
    if entrants < 4 {
        return Err(invalid(
            "agents",
            format!("a table needs four distinct entrants, only {entrants} configured"),
        ));
    }
    Ok(())
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidField {
        field: field.into(),
        message: message.into(),
    }
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{run_id}", run_id))
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_YAML: &str = r#"
run_id: "arena_smoke"
deals:
  seed: 123
  count: 16
agents:
  - name: "rand"
    kind: "random"
    copies: 2
  - name: "greedy"
    kind: "greedy"
    copies: 2
    params:
      no_declarations: true
  - name: "dmc"
    kind: "model"
    params:
      epsilon: 0.1
outputs:
  jsonl: "bench/out/{run_id}/deals.jsonl"
  summary_md: "bench/out/{run_id}/summary.md"
logging:
  enable_structured: true
  tracing_level: "debug"
"#;

    fn parse(yaml: &str) -> ArenaConfig {
        serde_yaml::from_str(yaml).expect("parse yaml")
    }

    fn field_of(err: ValidationError) -> String {
        match err {
            ValidationError::InvalidField { field, .. } => field,
        }
    }

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg = parse(BASIC_YAML);
        cfg.validate().expect("validate");

        assert_eq!(cfg.deals.workers, 1);
        assert!(!cfg.deals.enable_declarations);
        assert_eq!(cfg.rating, RatingConfig::default());
        assert_eq!(cfg.entrant_count(), 5);
        assert_eq!(cfg.agents[1].kind, PolicyKind::Heuristic);
        assert!(cfg.agents[1].params.no_declarations);
        assert_eq!(cfg.agents[2].kind, PolicyKind::Model);
        assert_eq!(cfg.agents[2].params.epsilon, 0.1);
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));

        let outputs = cfg.resolved_outputs();
        assert_eq!(
            outputs.jsonl,
            PathBuf::from("bench/out/arena_smoke/deals.jsonl")
        );
    }

    #[test]
    fn null_params_become_defaults() {
        let yaml = BASIC_YAML.replace("copies: 2\n  - name: \"greedy\"", "copies: 2\n    params:\n  - name: \"greedy\"");
        let mut cfg = parse(&yaml);
        cfg.validate().expect("validate");
        assert_eq!(cfg.agents[0].params, PolicyParams::default());
    }

    #[test]
    fn unknown_kind_fails_to_parse() {
        let yaml = BASIC_YAML.replace("kind: \"random\"", "kind: \"oracle\"");
        assert!(serde_yaml::from_str::<ArenaConfig>(&yaml).is_err());
    }

    #[test]
    fn unknown_param_fails_to_parse() {
        let yaml = BASIC_YAML.replace("epsilon: 0.1", "temperature: 0.1");
        assert!(serde_yaml::from_str::<ArenaConfig>(&yaml).is_err());
    }

    #[test]
    fn rejects_too_few_entrants() {
        let yaml = BASIC_YAML.replace("copies: 2", "copies: 1");
        let mut cfg = parse(&yaml);
        assert_eq!(field_of(cfg.validate().expect_err("three entrants")), "agents");
    }

    #[test]
    fn rejects_duplicate_agents() {
        let yaml = BASIC_YAML.replace("name: \"dmc\"", "name: \"rand\"");
        let mut cfg = parse(&yaml);
        assert_eq!(field_of(cfg.validate().expect_err("duplicate")), "agents");
    }

    #[test]
    fn rejects_invalid_run_id() {
        let yaml = BASIC_YAML.replace("arena_smoke", "arena smoke");
        let mut cfg = parse(&yaml);
        assert_eq!(field_of(cfg.validate().expect_err("invalid run id")), "run_id");
    }

    #[test]
    fn rejects_zero_workers_and_bad_k() {
        let mut cfg = parse(BASIC_YAML);
        cfg.deals.workers = 0;
        assert_eq!(field_of(cfg.validate().expect_err("workers")), "deals.workers");

        let mut cfg = parse(BASIC_YAML);
        cfg.rating.k_factor = 0.0;
        assert_eq!(field_of(cfg.validate().expect_err("k")), "rating.k_factor");
    }

    #[test]
    fn rejects_out_of_range_epsilon() {
        let yaml = BASIC_YAML.replace("epsilon: 0.1", "epsilon: 1.5");
        let mut cfg = parse(&yaml);
        assert_eq!(
            field_of(cfg.validate().expect_err("epsilon")),
            "agents[dmc].params.epsilon"
        );
    }

    #[test]
    fn blank_tracing_level_falls_back_to_info() {
        let yaml = BASIC_YAML.replace("tracing_level: \"debug\"", "tracing_level: \"  \"");
        let mut cfg = parse(&yaml);
        cfg.validate().expect("valid");
        assert_eq!(cfg.logging.level(), Some(Level::INFO));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ArenaConfig::from_path("/nonexistent/arena.yaml").expect_err("missing");
        assert!(matches!(err, ConfigError::Read { .. }));
        assert_eq!(err.path(), Path::new("/nonexistent/arena.yaml"));
    }
}
