use std::path::PathBuf;

use clap::Parser;

use gongzhu_bench::arena::ArenaRunner;
use gongzhu_bench::config::ArenaConfig;
use gongzhu_bench::logging::init_logging;

/// Self-play arena for Gongzhu policies.
#[derive(Debug, Parser)]
#[command(
    name = "gongzhu-arena",
    author,
    version,
    about = "Rate Gongzhu policies against each other with team Elo"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/arena.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of deals to play.
    #[arg(long, value_name = "COUNT")]
    deals: Option<usize>,

    /// Override the RNG seed for seating and dealing.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the number of worker threads.
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Exit after validating the configuration (no deals are played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = ArenaConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }
    if let Some(deals) = cli.deals {
        config.deals.count = deals;
    }
    if let Some(seed) = cli.seed {
        config.deals.seed = Some(seed);
    }
    if let Some(workers) = cli.workers {
        config.deals.workers = workers;
    }

    config.validate()?;

    let outputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let agent_count = config.agents.len();
    let entrant_count = config.entrant_count();
    let deals = config.deals.count;
    let workers = config.deals.workers;

    println!(
        "Loaded configuration '{run_id}' with {agent_count} agent{} ({entrant_count} entrants, {deals} deals, {workers} worker{})",
        if agent_count == 1 { "" } else { "s" },
        if workers == 1 { "" } else { "s" }
    );

    let logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let runner = ArenaRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: arena execution skipped.");
        return Ok(());
    }

    let summary = runner.run()?;

    println!(
        "Arena complete for '{run_id}': {} deals → {} rows at {}",
        summary.deals_played,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    for kind in &summary.kinds {
        println!(
            "  {:<9} mean {:>7.1}  std {:>6.1}  ({} entrants)",
            kind.kind, kind.mean, kind.std_dev, kind.entrants
        );
    }
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(guard) = logging_guard.as_ref() {
        println!("Trace log: {}", guard.trace_path.display());
    }

    Ok(())
}
