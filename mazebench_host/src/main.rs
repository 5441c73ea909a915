//! Mazebench host - drives simulations for terminals and external renderers
//!
//! The core engine never owns a clock. This host does:
//! - `compare`: every strategy against every maze, ranking table or JSON
//! - `run`: one strategy to completion, trace as JSON
//! - `watch`: one strategy paced on a timer, one JSON frame per line
//!
//! Environment:
//! - `MAZEBENCH_SEED`: seed for randomized strategies
//! - `MAZEBENCH_TICK_MS`: delay between frames in `watch`

use mazebench::harness::{compare, run_one, ExecutionTier, HarnessConfig};
use mazebench::observer::{SimulationAdapter, SimulationSnapshot};
use mazebench::registry::StrategyRegistry;
use mazebench::simulation::{RunTrace, Simulation, SimulationConfig, StepFrame};
use serde::{Deserialize, Serialize};
use std::io::Write as _;
use tokio::time;
use tracing::{info, warn};

mod config;

use config::{Command, HostConfig, HostError};

// ═══════════════════════════════════════════════════════════════════════════
// Output Messages
// ═══════════════════════════════════════════════════════════════════════════

/// One line of `watch` output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
enum Message {
    Frame(StepFrame),
    Finished(RunTrace),
    Cancelled(SimulationSnapshot),
}

// ═══════════════════════════════════════════════════════════════════════════
// Main
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cfg = match HostConfig::from_args(std::env::args().skip(1)) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            print_help();
            std::process::exit(2);
        }
    };

    let result = match &cfg.command {
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Compare => run_compare(&cfg),
        Command::Run { strategy } => run_single(&cfg, strategy),
        Command::Watch { strategy } => watch(&cfg, strategy).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn print_help() {
    println!("mazebench-host");
    println!("usage:");
    println!("  mazebench-host compare [--maze <name|file>]... [--json] [--parallel]");
    println!("  mazebench-host run <strategy> [--maze <name|file>] [--seed N]");
    println!("  mazebench-host watch <strategy> [--maze <name|file>] [--tick-ms N]");
    println!("options:");
    println!("  --script \"F,F,L\"     commands for manual-input");
    println!("  --replay <file>      recorded {{pos, facing, move}} stream for log-playback");
    println!("  --flag-exit-from-start");
}

fn harness_config(cfg: &HostConfig) -> HarnessConfig {
    let tier = if cfg.parallel {
        ExecutionTier::Parallel
    } else {
        ExecutionTier::Sequential
    };
    if tier.effective() != tier {
        warn!("Parallel tier requested but not compiled in; running sequentially");
    }
    HarnessConfig::default()
        .with_options(cfg.options.clone())
        .with_tier(tier)
        .with_simulation(
            SimulationConfig::default().with_flag_exit_from_start(cfg.flag_exit_from_start),
        )
}

fn run_compare(cfg: &HostConfig) -> Result<(), HostError> {
    let mazes = cfg.load_mazes()?;
    let registry = StrategyRegistry::with_builtins();
    let report = compare(&registry, &mazes, &harness_config(cfg))?;
    if cfg.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_table());
    }
    Ok(())
}

fn run_single(cfg: &HostConfig, strategy: &str) -> Result<(), HostError> {
    let registry = StrategyRegistry::with_builtins();
    let hcfg = harness_config(cfg);
    for maze in cfg.load_mazes()?.iter().take(1) {
        let trace = run_one(&registry, strategy, maze, &hcfg)?;
        info!(
            "{} on {}: {} after {} steps",
            strategy, maze.name(), trace.status, trace.steps
        );
        println!("{}", serde_json::to_string_pretty(&trace)?);
    }
    Ok(())
}

async fn watch(cfg: &HostConfig, strategy: &str) -> Result<(), HostError> {
    let mazes = cfg.load_mazes()?;
    let Some(maze) = mazes.first() else {
        return Err(HostError::Usage("no maze to watch".into()));
    };
    let registry = StrategyRegistry::with_builtins();
    let strategy = registry.create(strategy, &cfg.options)?;
    let sim_cfg = SimulationConfig::default().with_flag_exit_from_start(cfg.flag_exit_from_start);
    let mut sim = Simulation::with_config(maze, strategy, sim_cfg);

    info!("Watching {} on {} every {:?}", sim.strategy().name(), maze.name(), cfg.tick);

    let mut ticker = time::interval(cfg.tick);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let cap = maze.max_steps().saturating_mul(2);
    let mut ticks = 0u32;

    let mut out = std::io::stdout();
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                let snapshot = SimulationAdapter::new(&sim).snapshot();
                emit(&mut out, &Message::Cancelled(snapshot))?;
                info!("Ctrl-C: watch cancelled");
                return Ok(());
            }
            _ = ticker.tick() => {
                for frame in sim.advance(1) {
                    emit(&mut out, &Message::Frame(frame))?;
                }
                ticks += 1;
                if sim.is_finished() || ticks >= cap {
                    let trace = sim.run(0).clone();
                    emit(&mut out, &Message::Finished(trace))?;
                    return Ok(());
                }
            }
        }
    }
}

fn emit(out: &mut impl std::io::Write, msg: &Message) -> Result<(), HostError> {
    serde_json::to_writer(&mut *out, msg)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}
