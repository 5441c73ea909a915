//! Comparison harness: every strategy, fresh, against every maze.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tracing::info;

use crate::maze::Maze;
use crate::registry::{RegistryError, StrategyOptions, StrategyRegistry};
use crate::simulation::{RunStatus, RunTrace, Simulation, SimulationConfig};

/// How the (strategy, maze) runs are scheduled.
///
/// - `Sequential`: one after another on the calling thread
/// - `Parallel`: rayon worker pool (needs the `parallel` feature)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExecutionTier {
    #[default]
    Sequential,
    Parallel,
}

impl ExecutionTier {
    /// The tier that will actually run given the compiled features.
    pub fn effective(self) -> Self {
        match self {
            ExecutionTier::Sequential => ExecutionTier::Sequential,
            ExecutionTier::Parallel => {
                #[cfg(feature = "parallel")]
                {
                    ExecutionTier::Parallel
                }
                #[cfg(not(feature = "parallel"))]
                {
                    ExecutionTier::Sequential
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HarnessConfig {
    pub options: StrategyOptions,
    /// Iteration cap per run, as a multiple of the maze's step budget.
    pub safety_factor: u32,
    pub simulation: SimulationConfig,
    pub tier: ExecutionTier,
    /// Restrict to these strategy names; empty means all registered.
    pub only: Vec<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            options: StrategyOptions::default(),
            safety_factor: 2,
            simulation: SimulationConfig::default(),
            tier: ExecutionTier::Sequential,
            only: Vec::new(),
        }
    }
}

impl HarnessConfig {
    pub fn with_options(mut self, options: StrategyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_safety_factor(mut self, factor: u32) -> Self {
        self.safety_factor = factor.max(1);
        self
    }

    pub fn with_simulation(mut self, simulation: SimulationConfig) -> Self {
        self.simulation = simulation;
        self
    }

    pub fn with_tier(mut self, tier: ExecutionTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_only<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only = names.into_iter().map(Into::into).collect();
        self
    }
}

/// One row of the comparison table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunSummary {
    pub strategy: String,
    pub maze: String,
    pub status: RunStatus,
    pub steps: u32,
    pub dead_ends_found: usize,
    pub total_dead_ends: usize,
    pub score: f64,
    pub max_score: f64,
    pub fault: Option<String>,
}

impl RunSummary {
    pub fn from_trace(trace: &RunTrace, maze: &Maze) -> Self {
        Self {
            strategy: trace.strategy.clone(),
            maze: trace.maze.clone(),
            status: trace.status,
            steps: trace.steps,
            dead_ends_found: trace.dead_ends_found(),
            total_dead_ends: maze.total_dead_ends(),
            score: trace.score,
            max_score: maze.max_score(),
            fault: trace.fault.as_ref().map(|f| f.to_string()),
        }
    }
}

/// Aggregate standing of one strategy across all mazes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Standing {
    pub rank: usize,
    pub strategy: String,
    pub total_score: f64,
    pub exits: usize,
    pub runs: usize,
    pub faults: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComparisonReport {
    pub runs: Vec<RunSummary>,
    pub ranking: Vec<Standing>,
}

impl ComparisonReport {
    pub fn from_runs(runs: Vec<RunSummary>) -> Self {
        let mut ranking: Vec<Standing> = Vec::new();
        for run in &runs {
            let idx = match ranking.iter().position(|s| s.strategy == run.strategy) {
                Some(i) => i,
                None => {
                    ranking.push(Standing {
                        rank: 0,
                        strategy: run.strategy.clone(),
                        total_score: 0.0,
                        exits: 0,
                        runs: 0,
                        faults: 0,
                    });
                    ranking.len() - 1
                }
            };
            let s = &mut ranking[idx];
            s.total_score += run.score;
            s.runs += 1;
            s.exits += usize::from(run.status == RunStatus::Exited);
            s.faults += usize::from(run.status == RunStatus::IllegalState);
        }
        // Stable sort keeps registration order among exact ties.
        ranking.sort_by(|a, b| {
            b.total_score
                .total_cmp(&a.total_score)
                .then(b.exits.cmp(&a.exits))
        });
        for (i, s) in ranking.iter_mut().enumerate() {
            s.rank = i + 1;
        }
        Self { runs, ranking }
    }

    pub fn winner(&self) -> Option<&Standing> {
        self.ranking.first()
    }

    pub fn run(&self, strategy: &str, maze: &str) -> Option<&RunSummary> {
        self.runs
            .iter()
            .find(|r| r.strategy == strategy && r.maze == maze)
    }

    /// Plain-text ranking table.
    pub fn render_table(&self) -> String {
        let mut out = format!(
            "{:>4}  {:<22} {:>9} {:>6} {:>6}\n",
            "rank", "strategy", "score", "exits", "faults"
        );
        for s in &self.ranking {
            out.push_str(&format!(
                "{:>4}  {:<22} {:>9.3} {:>3}/{:<2} {:>6}\n",
                s.rank, s.strategy, s.total_score, s.exits, s.runs, s.faults
            ));
        }
        out
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// One fresh run of `name` on `maze`, capped at
/// `safety_factor * max_steps` driver iterations.
pub fn run_one(
    registry: &StrategyRegistry,
    name: &str,
    maze: &Maze,
    cfg: &HarnessConfig,
) -> Result<RunTrace, RegistryError> {
    let strategy = registry.create(name, &cfg.options)?;
    let mut sim = Simulation::with_config(maze, strategy, cfg.simulation);
    let cap = maze.max_steps().saturating_mul(cfg.safety_factor.max(1));
    sim.run(cap);
    Ok(sim.into_trace())
}

pub fn compare(
    registry: &StrategyRegistry,
    mazes: &[Maze],
    cfg: &HarnessConfig,
) -> Result<ComparisonReport, RegistryError> {
    let names: Vec<&str> = if cfg.only.is_empty() {
        registry.names().collect()
    } else {
        cfg.only.iter().map(String::as_str).collect()
    };
    if let Some(missing) = names.iter().find(|n| !registry.contains(n)) {
        return Err(RegistryError::UnknownStrategy(missing.to_string()));
    }
    let pairs: Vec<(&str, &Maze)> = names
        .iter()
        .flat_map(|n| mazes.iter().map(move |m| (*n, m)))
        .collect();

    let tier = cfg.tier.effective();
    info!(runs = pairs.len(), ?tier, "starting comparison");

    let run_pair = |(name, maze): &(&str, &Maze)| -> Result<RunSummary, RegistryError> {
        let trace = run_one(registry, name, maze, cfg)?;
        Ok(RunSummary::from_trace(&trace, maze))
    };

    let runs: Result<Vec<RunSummary>, RegistryError> = match tier {
        #[cfg(feature = "parallel")]
        ExecutionTier::Parallel => pairs.par_iter().map(run_pair).collect(),
        _ => pairs.iter().map(run_pair).collect(),
    };
    let report = ComparisonReport::from_runs(runs?);
    if let Some(w) = report.winner() {
        info!(winner = %w.strategy, score = w.total_score, "comparison finished");
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin;

    fn summary(strategy: &str, maze: &str, score: f64, status: RunStatus) -> RunSummary {
        RunSummary {
            strategy: strategy.to_string(),
            maze: maze.to_string(),
            status,
            steps: 10,
            dead_ends_found: 0,
            total_dead_ends: 0,
            score,
            max_score: 20.0,
            fault: None,
        }
    }

    #[test]
    fn ranking_sums_scores_across_mazes() {
        let report = ComparisonReport::from_runs(vec![
            summary("a", "m1", 5.0, RunStatus::Exited),
            summary("b", "m1", 4.0, RunStatus::Exited),
            summary("a", "m2", 1.0, RunStatus::StepLimitReached),
            summary("b", "m2", 3.0, RunStatus::IllegalState),
        ]);
        let w = report.winner().unwrap();
        assert_eq!(w.strategy, "b");
        assert_eq!(w.rank, 1);
        assert_eq!(w.total_score, 7.0);
        assert_eq!(w.faults, 1);
        assert_eq!(report.ranking[1].exits, 1);
        assert!(report.render_table().contains("b"));
    }

    #[test]
    fn compare_covers_every_pair() {
        let registry = StrategyRegistry::with_builtins();
        let mazes = builtin::all().unwrap();
        let cfg = HarnessConfig::default().with_only(["left-hand", "flood-fill"]);
        let report = compare(&registry, &mazes, &cfg).unwrap();
        assert_eq!(report.runs.len(), 4);
        assert_eq!(report.ranking.len(), 2);
        assert!(report.run("flood-fill", builtin::GIVEN).is_some());
        for r in &report.runs {
            assert!(r.score <= r.max_score);
            assert_ne!(r.status, RunStatus::Running);
        }
    }

    #[test]
    fn unknown_selection_is_rejected() {
        let registry = StrategyRegistry::with_builtins();
        let mazes = builtin::all().unwrap();
        let cfg = HarnessConfig::default().with_only(["nope"]);
        assert!(compare(&registry, &mazes, &cfg).is_err());
    }

    #[test]
    fn parallel_tier_falls_back_without_feature() {
        let t = ExecutionTier::Parallel.effective();
        #[cfg(feature = "parallel")]
        assert_eq!(t, ExecutionTier::Parallel);
        #[cfg(not(feature = "parallel"))]
        assert_eq!(t, ExecutionTier::Sequential);
    }
}
