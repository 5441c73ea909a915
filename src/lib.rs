//! # mazebench
//!
//! A step-driven engine for comparing maze-exploration strategies.
//!
//! Strategies only ever see bot-relative wall sensing and their own private
//! state. The driver applies their moves under one set of rules, so runs of
//! different algorithm families are scored on equal terms.
//!
//! ## Quick Start
//!
//! ```
//! use mazebench::prelude::*;
//!
//! let maze = builtin::given().unwrap();
//! let registry = StrategyRegistry::with_builtins();
//! let strategy = registry.create("left-hand", &StrategyOptions::default()).unwrap();
//!
//! let mut sim = Simulation::new(&maze, strategy);
//! let frames = sim.advance(10);
//! assert_eq!(frames[0].mv, Move::Forward);
//!
//! let trace = sim.run(maze.max_steps() * 2);
//! assert!(trace.status.is_terminal());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Serialization of mazes, traces and reports; JSON maze loading
//! - `parallel`: Run the comparison harness on a rayon thread pool
//!
//! ## Modules
//!
//! - [`maze`]: Grid, wall masks and neighbour queries
//! - [`pose`]: Facing, moves and bot-relative sensing
//! - [`strategies`]: The exploration strategy family
//! - [`simulation`]: The per-run driver
//! - [`scoring`]: Coverage/efficiency score
//! - [`harness`]: Strategy × maze comparison
//! - [`observer`]: Read-only observation adapters

#[path = "core/maze.rs"]
pub mod maze;

#[path = "core/pose.rs"]
pub mod pose;

#[path = "core/builtin.rs"]
pub mod builtin;

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/scoring.rs"]
pub mod scoring;

#[path = "core/simulation.rs"]
pub mod simulation;

#[path = "core/registry.rs"]
pub mod registry;

#[path = "core/harness.rs"]
pub mod harness;

pub mod observer;
pub mod strategies;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::builtin;
    pub use crate::harness::{compare, run_one, ComparisonReport, ExecutionTier, HarnessConfig};
    pub use crate::maze::{Maze, MazeConfigError, MazeDefinition};
    pub use crate::observer::{SimulationAdapter, SimulationSnapshot};
    pub use crate::pose::{Facing, Move, Pose, SensorReading};
    pub use crate::registry::{RegistryError, StrategyOptions, StrategyRegistry};
    pub use crate::simulation::{RunStatus, RunTrace, Simulation, SimulationConfig, StepFrame};
    pub use crate::strategies::scripted::Command;
    pub use crate::strategies::replay::ReplayStep;
    pub use crate::strategies::{Strategy, StrategyFault};
}
