//! The simulation driver: turns repeated strategy calls into a scored run.
//!
//! A [`Simulation`] owns the one [`Pose`] of a run and the strategy instance
//! driving it. The maze is borrowed read-only, so any number of runs may
//! share it. Nothing here is timer driven: hosts call [`Simulation::step`] or
//! [`Simulation::advance`] at whatever cadence they like.

use std::collections::BTreeSet;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::maze::Maze;
use crate::pose::{forward_position, is_exit_pose, Facing, Move, Pose, SensorReading};
use crate::scoring;
use crate::strategies::{Decision, Strategy, StrategyFault};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RunStatus {
    Running,
    Exited,
    StepLimitReached,
    StoppedByStrategy,
    IllegalState,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        self != RunStatus::Running
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Running => "RUNNING",
            RunStatus::Exited => "EXITED",
            RunStatus::StepLimitReached => "STEP_LIMIT_REACHED",
            RunStatus::StoppedByStrategy => "STOPPED_BY_STRATEGY",
            RunStatus::IllegalState => "ILLEGAL_STATE",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-fatal observations recorded on a run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Diagnostic {
    /// The run exited on a move made from the start cell.
    SuspiciousExitFromStart { step: u32 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// Record [`Diagnostic::SuspiciousExitFromStart`] when it happens.
    pub flag_exit_from_start: bool,
}

impl SimulationConfig {
    pub fn with_flag_exit_from_start(mut self, on: bool) -> Self {
        self.flag_exit_from_start = on;
        self
    }
}

/// What a renderer needs to draw one step. `pos`/`facing` are the pose the
/// decision was made from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepFrame {
    pub step: u32,
    pub pos: usize,
    pub facing: Facing,
    pub sensors: SensorReading,
    pub explanation: String,
    #[cfg_attr(feature = "serde", serde(rename = "move"))]
    pub mv: Move,
}

/// Driver-owned record of a run. Always carries a termination cause and the
/// score accumulated so far, faults included.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunTrace {
    pub strategy: String,
    pub maze: String,
    pub steps: u32,
    pub visited: BTreeSet<usize>,
    pub dead_ends_visited: BTreeSet<usize>,
    pub status: RunStatus,
    pub fault: Option<StrategyFault>,
    pub score: f64,
    pub final_pose: Pose,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunTrace {
    pub fn dead_ends_found(&self) -> usize {
        self.dead_ends_visited.len()
    }

    pub fn exited(&self) -> bool {
        self.status == RunStatus::Exited
    }
}

pub struct Simulation<'m> {
    maze: &'m Maze,
    strategy: Strategy,
    pose: Pose,
    cfg: SimulationConfig,
    trace: RunTrace,
}

impl<'m> Simulation<'m> {
    pub fn new(maze: &'m Maze, strategy: Strategy) -> Self {
        Self::with_config(maze, strategy, SimulationConfig::default())
    }

    pub fn with_config(maze: &'m Maze, strategy: Strategy, cfg: SimulationConfig) -> Self {
        let pose = maze.start();
        let trace = RunTrace {
            strategy: strategy.name().to_string(),
            maze: maze.name().to_string(),
            steps: 0,
            visited: BTreeSet::from([pose.position]),
            dead_ends_visited: BTreeSet::new(),
            status: RunStatus::Running,
            fault: None,
            score: 0.0,
            final_pose: pose,
            diagnostics: Vec::new(),
        };
        Self {
            maze,
            strategy,
            pose,
            cfg,
            trace,
        }
    }

    pub fn maze(&self) -> &'m Maze {
        self.maze
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn status(&self) -> RunStatus {
        self.trace.status
    }

    pub fn is_finished(&self) -> bool {
        self.trace.status.is_terminal()
    }

    pub fn trace(&self) -> &RunTrace {
        &self.trace
    }

    pub fn into_trace(self) -> RunTrace {
        self.trace
    }

    /// Run one step. Returns `None` once the run is over, including when this
    /// call is the one that ends it without a strategy decision.
    pub fn step(&mut self) -> Option<StepFrame> {
        if self.is_finished() {
            return None;
        }
        if self.trace.steps >= self.maze.max_steps() {
            self.finish(RunStatus::StepLimitReached);
            return None;
        }

        let before = self.pose;
        let decision = match guarded(|| self.strategy.step(self.maze, before)) {
            Ok(d) => d,
            Err(fault) => {
                warn!(
                    strategy = %self.trace.strategy,
                    step = self.trace.steps,
                    error = %fault,
                    "strategy fault, ending run"
                );
                self.trace.fault = Some(fault);
                self.finish(RunStatus::IllegalState);
                return None;
            }
        };
        debug!(
            step = self.trace.steps + 1,
            pos = before.position,
            facing = ?before.facing,
            mv = %decision.mv,
            "{}",
            decision.explanation
        );

        let frame = StepFrame {
            step: self.trace.steps + u32::from(decision.mv != Move::Stop),
            pos: before.position,
            facing: before.facing,
            sensors: decision.sensors,
            explanation: decision.explanation,
            mv: decision.mv,
        };

        match decision.mv {
            Move::Stop => {
                self.finish(RunStatus::StoppedByStrategy);
                return Some(frame);
            }
            Move::Wait => {
                self.trace.steps += 1;
            }
            mv => {
                self.trace.steps += 1;
                let exited = self.apply_move(mv);
                self.trace.visited.insert(self.pose.position);
                if mv == Move::UTurn && self.maze.is_dead_end(before.position) {
                    self.trace.dead_ends_visited.insert(before.position);
                }
                if exited {
                    if self.cfg.flag_exit_from_start && before.position == self.maze.start().position {
                        warn!(step = self.trace.steps, "exit taken from the start cell");
                        self.trace.diagnostics.push(Diagnostic::SuspiciousExitFromStart {
                            step: self.trace.steps,
                        });
                    }
                    self.finish(RunStatus::Exited);
                    return Some(frame);
                }
            }
        }
        self.refresh_score();
        Some(frame)
    }

    /// Rotate, then try to advance into the new front cell. Returns whether
    /// the move left the maze through the exit.
    fn apply_move(&mut self, mv: Move) -> bool {
        let facing = self.pose.facing.turned(mv);
        self.pose.facing = facing;
        if !self.maze.is_open(self.pose.position, facing) {
            return false;
        }
        match forward_position(self.maze, self.pose.position, facing) {
            None => is_exit_pose(self.maze, self.pose),
            Some(next) => {
                self.pose.position = next;
                is_exit_pose(self.maze, self.pose) && self.maze.is_open(next, facing)
            }
        }
    }

    /// Up to `n` steps; stops early when the run ends.
    pub fn advance(&mut self, n: u32) -> Vec<StepFrame> {
        let mut frames = Vec::new();
        for _ in 0..n {
            match self.step() {
                Some(frame) => frames.push(frame),
                None => break,
            }
            if self.is_finished() {
                break;
            }
        }
        frames
    }

    /// Step until the run ends or `max_iterations` calls have been made. A
    /// run cut off by the cap ends as `StepLimitReached`.
    pub fn run(&mut self, max_iterations: u32) -> &RunTrace {
        let mut iterations = 0;
        while !self.is_finished() && iterations < max_iterations {
            self.step();
            iterations += 1;
        }
        if !self.is_finished() {
            warn!(
                strategy = %self.trace.strategy,
                iterations,
                "iteration cap hit before the run ended"
            );
            self.finish(RunStatus::StepLimitReached);
        }
        &self.trace
    }

    fn refresh_score(&mut self) {
        self.trace.score =
            scoring::for_maze(self.maze, self.trace.steps, self.trace.dead_ends_found());
    }

    fn finish(&mut self, status: RunStatus) {
        self.refresh_score();
        self.trace.status = status;
        self.trace.final_pose = self.pose;
        info!(
            strategy = %self.trace.strategy,
            maze = %self.trace.maze,
            status = %status,
            steps = self.trace.steps,
            dead_ends = self.trace.dead_ends_found(),
            score = self.trace.score,
            "run finished"
        );
    }
}

/// Run a strategy step, turning a panic into [`StrategyFault::Panicked`].
fn guarded(f: impl FnOnce() -> Result<Decision, StrategyFault>) -> Result<Decision, StrategyFault> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(StrategyFault::Panicked(msg))
        }
    }
}
