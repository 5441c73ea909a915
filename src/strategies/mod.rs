//! Exploration strategies.
//!
//! Every strategy is a resumable state machine driven one step at a time.
//! [`Strategy`] wraps a [`StrategyState`] and enforces the shared bootstrap:
//! the first step of a fresh run is always `FORWARD`, whatever the sensors
//! say. After that, each call hands the current pose to the variant's own
//! decision rule.

pub mod backtracker;
pub mod composite;
pub mod dead_end_filling;
pub mod flood_fill;
pub mod graph_search;
pub mod navigation;
pub mod pledge;
pub mod random;
pub mod replay;
pub mod scripted;
pub mod tremaux;
pub mod wall_follower;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::maze::Maze;
use crate::pose::{relative_walls, Move, Pose, SensorReading};

use self::backtracker::Backtracker;
use self::composite::{Phased, Rotating};
use self::dead_end_filling::DeadEndFilling;
use self::flood_fill::FloodFill;
use self::graph_search::GraphSearch;
use self::pledge::Pledge;
use self::random::RandomMouse;
use self::replay::Replay;
use self::scripted::Scripted;
use self::tremaux::Tremaux;
use self::wall_follower::WallFollower;

/// Why a strategy could not produce a move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StrategyFault {
    #[error("strategy panicked: {0}")]
    Panicked(String),
    #[error("strategy failed: {0}")]
    Runtime(String),
    #[error("illegal move request: {0}")]
    IllegalMove(String),
}

/// What a variant's decision rule returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub mv: Move,
    pub explanation: String,
}

impl Choice {
    pub fn new(mv: Move, explanation: impl Into<String>) -> Self {
        Self {
            mv,
            explanation: explanation.into(),
        }
    }
}

/// One step's output, with the sensor reading it was based on.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub mv: Move,
    pub explanation: String,
    pub sensors: SensorReading,
}

/// Per-variant private memory. Each variant carries only the fields its own
/// decision rule needs.
#[derive(Debug, Clone)]
pub enum StrategyState {
    WallFollower(WallFollower),
    RandomMouse(RandomMouse),
    Pledge(Pledge),
    Tremaux(Tremaux),
    GraphSearch(GraphSearch),
    Backtracker(Backtracker),
    FloodFill(FloodFill),
    DeadEndFilling(DeadEndFilling),
    Phased(Phased),
    Rotating(Rotating),
    Scripted(Scripted),
    Replay(Replay),
}

impl StrategyState {
    /// Short human label used in explanations.
    pub fn label(&self) -> &'static str {
        match self {
            StrategyState::WallFollower(s) => s.hand().label(),
            StrategyState::RandomMouse(_) => "Random mouse",
            StrategyState::Pledge(_) => "Pledge",
            StrategyState::Tremaux(_) => "Tremaux",
            StrategyState::GraphSearch(s) => s.discipline().label(),
            StrategyState::Backtracker(_) => "Backtracker",
            StrategyState::FloodFill(_) => "Flood fill",
            StrategyState::DeadEndFilling(_) => "Dead-end filling",
            StrategyState::Phased(_) => "Hybrid",
            StrategyState::Rotating(_) => "Adaptive hunter",
            StrategyState::Scripted(_) => "Manual",
            StrategyState::Replay(_) => "Replay",
        }
    }

    /// Called once, in place of `decide`, for the bootstrap step.
    pub(crate) fn on_bootstrap(&mut self, maze: &Maze, pose: Pose) {
        match self {
            StrategyState::Scripted(s) => s.on_bootstrap(maze, pose),
            StrategyState::Replay(s) => s.on_bootstrap(pose),
            StrategyState::Phased(s) => s.on_bootstrap(maze, pose),
            StrategyState::Rotating(s) => s.on_bootstrap(maze, pose),
            _ => {}
        }
    }

    pub(crate) fn decide(
        &mut self,
        maze: &Maze,
        pose: Pose,
        sensors: SensorReading,
    ) -> Result<Choice, StrategyFault> {
        match self {
            StrategyState::WallFollower(s) => Ok(s.choose(sensors)),
            StrategyState::RandomMouse(s) => Ok(s.choose(sensors)),
            StrategyState::Pledge(s) => Ok(s.decide(sensors)),
            StrategyState::Tremaux(s) => Ok(s.decide(maze, pose, sensors)),
            StrategyState::GraphSearch(s) => s.decide(maze, pose),
            StrategyState::Backtracker(s) => s.decide(maze, pose),
            StrategyState::FloodFill(s) => Ok(s.decide(maze, pose)),
            StrategyState::DeadEndFilling(s) => Ok(s.decide(maze, pose)),
            StrategyState::Phased(s) => s.decide(maze, pose, sensors),
            StrategyState::Rotating(s) => s.decide(maze, pose, sensors),
            StrategyState::Scripted(s) => Ok(s.decide(maze, pose)),
            StrategyState::Replay(s) => s.decide(pose),
        }
    }
}

/// A named strategy instance for one run.
#[derive(Debug, Clone)]
pub struct Strategy {
    name: String,
    started: bool,
    state: StrategyState,
}

impl Strategy {
    pub fn new(name: impl Into<String>, state: StrategyState) -> Self {
        Self {
            name: name.into(),
            started: false,
            state,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &StrategyState {
        &self.state
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Decide the next move from `pose`. Never touches the maze.
    pub fn step(&mut self, maze: &Maze, pose: Pose) -> Result<Decision, StrategyFault> {
        let sensors = relative_walls(maze, pose.position, pose.facing);
        if !self.started {
            self.started = true;
            self.state.on_bootstrap(maze, pose);
            return Ok(Decision {
                mv: Move::Forward,
                explanation: format!("{}: initial forward move into maze", self.state.label()),
                sensors,
            });
        }
        let choice = self.state.decide(maze, pose, sensors)?;
        Ok(Decision {
            mv: choice.mv,
            explanation: choice.explanation,
            sensors,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::maze::{Maze, MazeDefinition, WALL_EAST, WALL_NORTH, WALL_SOUTH, WALL_WEST};
    use crate::pose::{forward_position, Move, Pose};

    /// Pose after `mv`, using the driver's movement rule minus the
    /// bookkeeping.
    pub fn apply(maze: &Maze, pose: Pose, mv: Move) -> Pose {
        if !mv.advances() {
            return pose;
        }
        let facing = pose.facing.turned(mv);
        let position = if maze.is_open(pose.position, facing) {
            forward_position(maze, pose.position, facing).unwrap_or(pose.position)
        } else {
            pose.position
        };
        Pose::new(position, facing)
    }

    /// `size`x`size` grid with only the outer boundary walled.
    pub fn open_room(size: usize, start: usize, exit: usize) -> Maze {
        let walls = (0..size * size)
            .map(|pos| {
                let (x, y) = (pos % size, pos / size);
                let mut m = 0;
                if y == 0 {
                    m |= WALL_NORTH;
                }
                if x + 1 == size {
                    m |= WALL_EAST;
                }
                if y + 1 == size {
                    m |= WALL_SOUTH;
                }
                if x == 0 {
                    m |= WALL_WEST;
                }
                m
            })
            .collect();
        Maze::from_definition(MazeDefinition {
            name: "room".to_string(),
            size,
            walls,
            start_pos: start,
            start_facing: 0,
            exit_pos: exit,
            exit_facing: 0,
            min_steps: 1,
            max_steps: 100,
            max_score: 1.0,
        })
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin;
    use crate::pose::Facing;

    #[test]
    fn bootstrap_is_forward_even_into_a_wall() {
        let maze = builtin::given().unwrap();
        let pose = Pose::new(0, Facing::North);
        let mut s = Strategy::new(
            "left-hand",
            StrategyState::WallFollower(WallFollower::new(wall_follower::Hand::Left)),
        );
        assert!(!s.is_started());
        let d = s.step(&maze, pose).unwrap();
        assert_eq!(d.mv, Move::Forward);
        assert!(d.sensors.front);
        assert!(s.is_started());

        let d = s.step(&maze, pose).unwrap();
        assert_ne!(d.mv, Move::Forward);
    }
}
