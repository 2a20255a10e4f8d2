pub mod rating;
mod summary;

pub use summary::{EntrantStanding, KindStanding};

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use gongzhu_bot::policy::weights::{WeightError, WeightManifest};
use gongzhu_bot::policy::{
    DEFAULT_HIDDEN, ModelPolicy, Policy, PolicyError, PolicyKind, PolicyParams,
};
use gongzhu_core::DealError;
use gongzhu_core::game::config::DealConfig;
use gongzhu_core::game::deal::Deal;
use gongzhu_core::game::record::DealRecord;
use gongzhu_core::model::player::{Player, Seat, Team};
use parking_lot::Mutex;
use rand::seq::index;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{AgentConfig, ArenaConfig, ResolvedOutputs};

const POLICY_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Runs a configured population of agents against each other.
pub struct ArenaRunner {
    config: ArenaConfig,
    outputs: ResolvedOutputs,
    blueprints: Vec<Blueprint>,
    entrants: Vec<Entrant>,
}

/// One rated seat-filler. Copies of an agent share a blueprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Entrant {
    pub id: String,
    pub agent: String,
    pub kind: PolicyKind,
    blueprint: usize,
}

/// One line of the deal log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaRow {
    pub run_id: String,
    pub deal_index: usize,
    /// Entrant ids by seat index.
    pub entrants: Vec<String>,
    pub rating_before: [f64; 4],
    pub rating_after: [f64; 4],
    #[serde(flatten)]
    pub record: DealRecord,
}

/// Summary details returned after a run.
#[derive(Debug)]
pub struct RunSummary {
    pub deals_played: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub kinds: Vec<KindStanding>,
    pub standings: Vec<EntrantStanding>,
}

#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("a table needs four entrants, found {found}")]
    SeatCount { found: usize },
    #[error("agent '{agent}': {source}")]
    Policy {
        agent: String,
        #[source]
        source: PolicyError,
    },
    #[error("agent '{agent}': {source}")]
    Weights {
        agent: String,
        #[source]
        source: WeightError,
    },
    #[error("deal {deal_index} failed: {source}")]
    Deal {
        deal_index: usize,
        #[source]
        source: DealError,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("an arena worker panicked")]
    WorkerPanicked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DealPlan {
    index: usize,
    seed: u64,
    /// Entrant indices by seat index.
    seating: [usize; 4],
}

/// How to build a fresh policy for one seat of one deal.
enum Blueprint {
    Factory {
        kind: PolicyKind,
        params: PolicyParams,
    },
    // Weights are read once and cloned into each seat.
    Model {
        manifest: WeightManifest,
        epsilon: f64,
    },
}

impl Blueprint {
    fn from_agent(agent: &AgentConfig) -> Result<Self, ArenaError> {
        match agent.kind {
            PolicyKind::Model => {
                let weights_error = |source| ArenaError::Weights {
                    agent: agent.name.clone(),
                    source,
                };
                let manifest = match &agent.params.weights {
                    Some(path) => WeightManifest::from_file(path).map_err(weights_error)?,
                    None => WeightManifest::seeded(&DEFAULT_HIDDEN, agent.params.seed.unwrap_or(0)),
                };
                manifest.validate().map_err(weights_error)?;
                Ok(Self::Model {
                    manifest,
                    epsilon: agent.params.epsilon,
                })
            }
            kind => {
                kind.create(&agent.params).map_err(|source| ArenaError::Policy {
                    agent: agent.name.clone(),
                    source,
                })?;
                Ok(Self::Factory {
                    kind,
                    params: agent.params.clone(),
                })
            }
        }
    }

    fn build(&self, agent: &str, seed: u64) -> Result<Box<dyn Policy>, ArenaError> {
        match self {
            Self::Factory { kind, params } => {
                let params = PolicyParams {
                    seed: Some(params.seed.map_or(seed, |base| base ^ seed)),
                    ..params.clone()
                };
                kind.create(&params).map_err(|source| ArenaError::Policy {
                    agent: agent.to_string(),
                    source,
                })
            }
            Self::Model { manifest, epsilon } => {
                let policy = ModelPolicy::new(manifest.clone(), *epsilon, seed).map_err(|source| {
                    ArenaError::Weights {
                        agent: agent.to_string(),
                        source,
                    }
                })?;
                Ok(Box::new(policy))
            }
        }
    }
}

/// Shared mutable state. Everything workers write goes through this lock.
struct Ledger {
    ratings: Vec<f64>,
    results: Vec<summary::EntrantResults>,
    writer: BufWriter<File>,
    rows_written: usize,
}

impl Ledger {
    fn settle(
        &mut self,
        run_id: &str,
        plan: &DealPlan,
        entrants: &[Entrant],
        record: DealRecord,
        k_factor: f64,
    ) -> Result<(), ArenaError> {
        let margin = record.score_diff();
        let before = plan.seating.map(|entrant| self.ratings[entrant]);
        let deltas = rating::team_deltas(before, margin, k_factor);

        let mut after = before;
        for seat in Seat::LOOP {
            let entrant = plan.seating[seat.index()];
            after[seat.index()] += deltas[seat.index()];
            self.ratings[entrant] = after[seat.index()];

            let team_margin = match seat.team() {
                Team::NorthSouth => margin,
                Team::EastWest => -margin,
            };
            self.results[entrant].record(team_margin);
        }

        let row = ArenaRow {
            run_id: run_id.to_string(),
            deal_index: plan.index,
            entrants: plan
                .seating
                .iter()
                .map(|&entrant| entrants[entrant].id.clone())
                .collect(),
            rating_before: before,
            rating_after: after,
            record,
        };
        serde_json::to_writer(&mut self.writer, &row)?;
        self.writer.write_all(b"\n")?;
        self.rows_written += 1;

        event!(
            Level::DEBUG,
            deal = plan.index,
            margin,
            north = %row.entrants[0],
            east = %row.entrants[1],
            south = %row.entrants[2],
            west = %row.entrants[3],
            "deal settled"
        );
        Ok(())
    }
}

impl ArenaRunner {
    /// Build a runner from a validated configuration. Weight files are
    /// loaded here, so a bad manifest fails before any deal is played.
    pub fn new(config: ArenaConfig, outputs: ResolvedOutputs) -> Result<Self, ArenaError> {
        let blueprints = config
            .agents
            .iter()
            .map(Blueprint::from_agent)
            .collect::<Result<Vec<_>, _>>()?;

        let mut entrants = Vec::with_capacity(config.entrant_count());
        for (blueprint, agent) in config.agents.iter().enumerate() {
            for copy in 0..agent.copies {
                let id = if agent.copies == 1 {
                    agent.name.clone()
                } else {
                    format!("{}-{}", agent.name, copy + 1)
                };
                entrants.push(Entrant {
                    id,
                    agent: agent.name.clone(),
                    kind: agent.kind,
                    blueprint,
                });
            }
        }

        if entrants.len() < 4 {
            return Err(ArenaError::SeatCount {
                found: entrants.len(),
            });
        }

        Ok(Self {
            config,
            outputs,
            blueprints,
            entrants,
        })
    }

    pub fn entrants(&self) -> &[Entrant] {
        &self.entrants
    }

    /// Play every configured deal, streaming JSONL rows to disk, then write
    /// the Markdown summary.
    pub fn run(&self) -> Result<RunSummary, ArenaError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let plans = self.plan_deals();
        let workers = self.config.deals.workers.clamp(1, plans.len().max(1));
        event!(
            Level::INFO,
            run_id = %self.config.run_id,
            deals = plans.len(),
            entrants = self.entrants.len(),
            workers,
            "arena starting"
        );

        let ledger = Mutex::new(Ledger {
            ratings: vec![self.config.rating.initial; self.entrants.len()],
            results: vec![summary::EntrantResults::default(); self.entrants.len()],
            writer: BufWriter::new(File::create(&self.outputs.jsonl)?),
            rows_written: 0,
        });
        let next = AtomicUsize::new(0);
        let failed = AtomicBool::new(false);

        let played = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let (plans, ledger, next, failed) = (&plans, &ledger, &next, &failed);
                    scope.spawn(move || self.work(plans, ledger, next, failed))
                })
                .collect();

            let mut played = 0usize;
            let mut first_error = None;
            for handle in handles {
                match handle.join() {
                    Ok(Ok(count)) => played += count,
                    Ok(Err(err)) => {
                        first_error.get_or_insert(err);
                    }
                    Err(_) => {
                        first_error.get_or_insert(ArenaError::WorkerPanicked);
                    }
                }
            }
            match first_error {
                Some(err) => Err(err),
                None => Ok(played),
            }
        })?;

        let mut ledger = ledger.into_inner();
        ledger.writer.flush()?;

        let standings = summary::standings(&self.entrants, &ledger.ratings, &ledger.results);
        let kinds = summary::kind_standings(&standings);
        summary::write_markdown(
            &self.outputs.summary_md,
            &self.config,
            played,
            &kinds,
            &standings,
        )?;

        event!(
            Level::INFO,
            run_id = %self.config.run_id,
            deals = played,
            rows = ledger.rows_written,
            "arena complete"
        );

        Ok(RunSummary {
            deals_played: played,
            rows_written: ledger.rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            kinds,
            standings,
        })
    }

    /// Seeds and seatings are fixed up front so they do not depend on how
    /// the deals are spread across workers.
    fn plan_deals(&self) -> Vec<DealPlan> {
        let mut rng = StdRng::seed_from_u64(self.config.deals.seed.unwrap_or(0));
        (0..self.config.deals.count)
            .map(|index| {
                let seed = rng.next_u64();
                let picked = index::sample(&mut rng, self.entrants.len(), 4);
                let mut seating = [0usize; 4];
                for (slot, entrant) in seating.iter_mut().zip(picked.iter()) {
                    *slot = entrant;
                }
                DealPlan {
                    index,
                    seed,
                    seating,
                }
            })
            .collect()
    }

    fn work(
        &self,
        plans: &[DealPlan],
        ledger: &Mutex<Ledger>,
        next: &AtomicUsize,
        failed: &AtomicBool,
    ) -> Result<usize, ArenaError> {
        let mut played = 0usize;
        while !failed.load(Ordering::Relaxed) {
            let Some(plan) = plans.get(next.fetch_add(1, Ordering::Relaxed)) else {
                break;
            };
            let outcome = self.play_deal(plan).and_then(|record| {
                ledger.lock().settle(
                    &self.config.run_id,
                    plan,
                    &self.entrants,
                    record,
                    self.config.rating.k_factor,
                )
            });
            if let Err(err) = outcome {
                failed.store(true, Ordering::Relaxed);
                return Err(err);
            }
            played += 1;
        }
        Ok(played)
    }

    fn play_deal(&self, plan: &DealPlan) -> Result<DealRecord, ArenaError> {
        let mut seeds = StdRng::seed_from_u64(plan.seed ^ POLICY_SEED_SALT);
        let [north, east, south, west] = Seat::LOOP.map(|seat| {
            let entrant = &self.entrants[plan.seating[seat.index()]];
            let policy = self.blueprints[entrant.blueprint].build(&entrant.agent, seeds.next_u64())?;
            Ok::<_, ArenaError>(Player::new(entrant.id.clone(), entrant.agent.clone(), policy))
        });
        let players = [north?, east?, south?, west?];

        let config = DealConfig {
            enable_declarations: self.config.deals.enable_declarations,
        };
        let deal_error = |source| ArenaError::Deal {
            deal_index: plan.index,
            source,
        };
        let mut deal = Deal::with_seed(players, config, plan.seed).map_err(deal_error)?;
        deal.play_out().map_err(deal_error)?;
        Ok(DealRecord::capture(&deal))
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), ArenaError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(count: usize, copies: usize) -> ArenaConfig {
        let yaml = format!(
            r#"
run_id: "unit"
deals:
  count: {count}
  seed: 11
agents:
  - name: "rand"
    kind: "random"
    copies: {copies}
  - name: "greedy"
    kind: "heuristic"
    copies: {copies}
outputs:
  jsonl: "unused.jsonl"
  summary_md: "unused.md"
"#
        );
        let mut cfg: ArenaConfig = serde_yaml::from_str(&yaml).unwrap();
        cfg.validate().unwrap();
        cfg
    }

    fn runner(count: usize, copies: usize) -> ArenaRunner {
        let cfg = config(count, copies);
        let outputs = cfg.resolved_outputs();
        ArenaRunner::new(cfg, outputs).unwrap()
    }

    #[test]
    fn copies_get_numbered_ids() {
        let runner = runner(1, 2);
        let ids: Vec<_> = runner.entrants().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["rand-1", "rand-2", "greedy-1", "greedy-2"]);
        assert_eq!(runner.entrants()[2].kind, PolicyKind::Heuristic);
    }

    #[test]
    fn plans_seat_four_distinct_entrants() {
        let runner = runner(40, 3);
        let plans = runner.plan_deals();
        assert_eq!(plans.len(), 40);
        for plan in &plans {
            let mut seating = plan.seating.to_vec();
            seating.sort_unstable();
            seating.dedup();
            assert_eq!(seating.len(), 4);
            assert!(seating.iter().all(|&entrant| entrant < 6));
        }
        assert_eq!(plans, runner.plan_deals());
    }

    #[test]
    fn played_deal_records_every_card() {
        let runner = runner(1, 2);
        let plan = runner.plan_deals()[0];
        let record = runner.play_deal(&plan).unwrap();
        assert!(record.completed);
        assert_eq!(record.history.len(), 52);
        assert_eq!(record.seed, Some(plan.seed));
        for (seat, entrant) in record.seats.iter().zip(plan.seating) {
            assert_eq!(seat.player_id, runner.entrants()[entrant].id);
        }
    }

    #[test]
    fn missing_weights_fail_at_construction() {
        let mut cfg = config(1, 2);
        cfg.agents[1].kind = PolicyKind::Model;
        cfg.agents[1].params.weights = Some("/nonexistent/weights.json".into());
        let outputs = cfg.resolved_outputs();
        let err = ArenaRunner::new(cfg, outputs).err().unwrap();
        assert!(matches!(err, ArenaError::Weights { ref agent, .. } if agent == "greedy"));
    }
}
