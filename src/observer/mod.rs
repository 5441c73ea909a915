use crate::maze::Maze;
use crate::pose::Pose;
use crate::simulation::{RunStatus, Simulation};
use crate::strategies::{Strategy, StrategyState};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A read-only snapshot of a run in progress.
///
/// Design intent:
/// - Observers cannot mutate or steer the simulation.
/// - Snapshotting is *on-demand* and can allocate; stepping stays unchanged.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationSnapshot {
    pub maze: String,
    pub step: u32,
    pub max_steps: u32,
    pub pose: Pose,
    pub status: RunStatus,
    pub score: f64,
    pub visited_cells: usize,
    /// Visited cells over all cells, in `[0, 1]`.
    pub coverage: f64,
    pub dead_ends_found: Vec<usize>,
    pub total_dead_ends: usize,
    pub strategy: StrategySnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StrategySnapshot {
    pub name: String,
    pub label: String,
    pub started: bool,
    /// Variant-specific progress, e.g. frontier size or current phase.
    pub detail: String,
}

pub struct SimulationAdapter<'a, 'm> {
    sim: &'a Simulation<'m>,
}

impl<'a, 'm> SimulationAdapter<'a, 'm> {
    pub fn new(sim: &'a Simulation<'m>) -> Self {
        Self { sim }
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        let maze = self.sim.maze();
        let trace = self.sim.trace();
        SimulationSnapshot {
            maze: maze.name().to_string(),
            step: trace.steps,
            max_steps: maze.max_steps(),
            pose: self.sim.pose(),
            status: trace.status,
            score: trace.score,
            visited_cells: trace.visited.len(),
            coverage: coverage(maze, trace.visited.len()),
            dead_ends_found: trace.dead_ends_visited.iter().copied().collect(),
            total_dead_ends: maze.total_dead_ends(),
            strategy: StrategyAdapter::new(self.sim.strategy()).snapshot(),
        }
    }
}

fn coverage(maze: &Maze, visited: usize) -> f64 {
    if maze.cell_count() == 0 {
        return 0.0;
    }
    (visited as f64 / maze.cell_count() as f64).min(1.0)
}

pub struct StrategyAdapter<'a> {
    strategy: &'a Strategy,
}

impl<'a> StrategyAdapter<'a> {
    pub fn new(strategy: &'a Strategy) -> Self {
        Self { strategy }
    }

    pub fn snapshot(&self) -> StrategySnapshot {
        let state = self.strategy.state();
        StrategySnapshot {
            name: self.strategy.name().to_string(),
            label: state.label().to_string(),
            started: self.strategy.is_started(),
            detail: detail(state),
        }
    }
}

fn detail(state: &StrategyState) -> String {
    match state {
        StrategyState::WallFollower(_) | StrategyState::RandomMouse(_) => String::new(),
        StrategyState::Pledge(p) => format!("angle {} mode {:?}", p.angle(), p.mode()),
        StrategyState::Tremaux(_) => String::new(),
        StrategyState::GraphSearch(g) => format!(
            "frontier {} expanded {} phase {:?}",
            g.frontier_len(),
            g.expansions().len(),
            g.phase()
        ),
        StrategyState::Backtracker(b) => {
            format!("depth {} visited {}", b.depth(), b.visited_count())
        }
        StrategyState::FloodFill(_) => String::new(),
        StrategyState::DeadEndFilling(d) => format!("filled {}", d.filled_count()),
        StrategyState::Phased(p) => format!("phase {}", p.phase_label().unwrap_or("-")),
        StrategyState::Rotating(r) => format!(
            "member {} switches {} found {}{}",
            r.current(),
            r.switches(),
            r.dead_ends_found(),
            if r.is_homing() { " homing" } else { "" }
        ),
        StrategyState::Scripted(s) => format!(
            "command {}/{} blocked {}",
            s.cursor(),
            s.commands().len(),
            s.blocked().len()
        ),
        StrategyState::Replay(r) => {
            format!("record {}/{} desyncs {}", r.cursor(), r.len(), r.desyncs())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin;
    use crate::registry::{StrategyOptions, StrategyRegistry};

    #[test]
    fn snapshot_tracks_progress() {
        let maze = builtin::given().unwrap();
        let strategy = StrategyRegistry::default()
            .create("breadth-first-search", &StrategyOptions::default())
            .unwrap();
        let mut sim = Simulation::new(&maze, strategy);

        let before = SimulationAdapter::new(&sim).snapshot();
        assert_eq!(before.step, 0);
        assert!(!before.strategy.started);

        sim.advance(5);
        let after = SimulationAdapter::new(&sim).snapshot();
        assert_eq!(after.step, 5);
        assert!(after.strategy.started);
        assert!(after.coverage > 0.0 && after.coverage <= 1.0);
        assert!(after.strategy.detail.starts_with("frontier"));
        assert_eq!(after.total_dead_ends, 9);
    }
}
