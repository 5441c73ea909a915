//! Strategies that delegate each step to one of their members.

use hashbrown::HashSet;
use tracing::debug;

use super::navigation::{exit_approach, shortest_route, RouteFollower};
use super::tremaux::Tremaux;
use super::wall_follower::{Hand, WallFollower};
use super::{Choice, StrategyFault, StrategyState};
use crate::maze::Maze;
use crate::pose::{Move, Pose, SensorReading};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Step budgets of the hybrid explorer's timed phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhasedConfig {
    /// Right-hand scan.
    pub scan_steps: u32,
    /// Left-hand sweep that follows the scan.
    pub targeted_steps: u32,
}

impl Default for PhasedConfig {
    fn default() -> Self {
        Self {
            scan_steps: 50,
            targeted_steps: 80,
        }
    }
}

impl PhasedConfig {
    pub fn with_scan_steps(mut self, steps: u32) -> Self {
        self.scan_steps = steps;
        self
    }

    pub fn with_targeted_steps(mut self, steps: u32) -> Self {
        self.targeted_steps = steps;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Phase {
    pub label: String,
    /// `None` runs until the end of the run.
    pub budget: Option<u32>,
    pub member: StrategyState,
}

/// Runs its phases in order, each for a fixed number of steps.
#[derive(Debug, Clone)]
pub struct Phased {
    phases: Vec<Phase>,
    index: usize,
    elapsed: u32,
}

impl Phased {
    pub fn new(phases: Vec<Phase>) -> Self {
        Self {
            phases,
            index: 0,
            elapsed: 0,
        }
    }

    /// Right-hand scan, left-hand sweep, then Trémaux cleanup.
    pub fn hybrid(cfg: PhasedConfig) -> Self {
        Self::new(vec![
            Phase {
                label: "scan".to_string(),
                budget: Some(cfg.scan_steps),
                member: StrategyState::WallFollower(WallFollower::new(Hand::Right)),
            },
            Phase {
                label: "targeted".to_string(),
                budget: Some(cfg.targeted_steps),
                member: StrategyState::WallFollower(WallFollower::new(Hand::Left)),
            },
            Phase {
                label: "cleanup".to_string(),
                budget: None,
                member: StrategyState::Tremaux(Tremaux::new()),
            },
        ])
    }

    pub fn phase_index(&self) -> usize {
        self.index
    }

    pub fn phase_label(&self) -> Option<&str> {
        self.phases.get(self.index).map(|p| p.label.as_str())
    }

    pub(crate) fn on_bootstrap(&mut self, maze: &Maze, pose: Pose) {
        for p in &mut self.phases {
            p.member.on_bootstrap(maze, pose);
        }
    }

    pub fn decide(
        &mut self,
        maze: &Maze,
        pose: Pose,
        sensors: SensorReading,
    ) -> Result<Choice, StrategyFault> {
        while self.index + 1 < self.phases.len()
            && self.phases[self.index]
                .budget
                .is_some_and(|b| self.elapsed >= b)
        {
            self.index += 1;
            self.elapsed = 0;
            debug!(phase = self.index, "hybrid explorer switching phase");
        }
        let Some(phase) = self.phases.get_mut(self.index) else {
            return Ok(Choice::new(Move::Stop, "Hybrid: no phases configured"));
        };
        let inner = phase.member.decide(maze, pose, sensors)?;
        self.elapsed += 1;
        Ok(Choice::new(
            inner.mv,
            format!("Hybrid [{}]: {}", phase.label, inner.explanation),
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RotatingConfig {
    /// Steps without a new dead end before switching member.
    pub stall_limit: u32,
}

impl Default for RotatingConfig {
    fn default() -> Self {
        Self { stall_limit: 40 }
    }
}

impl RotatingConfig {
    pub fn with_stall_limit(mut self, steps: u32) -> Self {
        self.stall_limit = steps;
        self
    }
}

/// Rotates through its members whenever discovery stalls, and heads for the
/// exit by the shortest route once every dead end has been seen.
#[derive(Debug, Clone)]
pub struct Rotating {
    members: Vec<StrategyState>,
    current: usize,
    stall_limit: u32,
    since_discovery: u32,
    found: HashSet<usize>,
    homing: Option<RouteFollower>,
    switches: u32,
}

impl Rotating {
    pub fn new(members: Vec<StrategyState>, cfg: RotatingConfig) -> Self {
        Self {
            members,
            current: 0,
            stall_limit: cfg.stall_limit,
            since_discovery: 0,
            found: HashSet::new(),
            homing: None,
            switches: 0,
        }
    }

    /// Right-hand, forward-first, left-hand.
    pub fn adaptive_hunter(cfg: RotatingConfig) -> Self {
        Self::new(
            vec![
                StrategyState::WallFollower(WallFollower::new(Hand::Right)),
                StrategyState::WallFollower(WallFollower::new(Hand::Forward)),
                StrategyState::WallFollower(WallFollower::new(Hand::Left)),
            ],
            cfg,
        )
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn switches(&self) -> u32 {
        self.switches
    }

    pub fn dead_ends_found(&self) -> usize {
        self.found.len()
    }

    pub fn is_homing(&self) -> bool {
        self.homing.is_some()
    }

    pub(crate) fn on_bootstrap(&mut self, maze: &Maze, pose: Pose) {
        for m in &mut self.members {
            m.on_bootstrap(maze, pose);
        }
    }

    pub fn decide(
        &mut self,
        maze: &Maze,
        pose: Pose,
        sensors: SensorReading,
    ) -> Result<Choice, StrategyFault> {
        if maze.is_dead_end(pose.position) && self.found.insert(pose.position) {
            self.since_discovery = 0;
        } else {
            self.since_discovery += 1;
        }

        if self.homing.is_none() && self.found.len() >= maze.total_dead_ends() {
            if let Some(route) = shortest_route(maze, pose.position, maze.exit_pos(), |_| true) {
                debug!(found = self.found.len(), "all dead ends found, homing");
                self.homing = Some(RouteFollower::new(route));
            }
        }
        if let Some(route) = self.homing.as_mut() {
            let total = maze.total_dead_ends();
            return Ok(match route.next_move(maze, pose)? {
                Some((mv, next)) => Choice::new(
                    mv,
                    format!("Adaptive hunter: all {total} dead ends found, exit route via {next}"),
                ),
                None => Choice::new(exit_approach(maze, pose), "Adaptive hunter: at exit, facing out"),
            });
        }

        if self.since_discovery >= self.stall_limit && self.members.len() > 1 {
            self.current = (self.current + 1) % self.members.len();
            self.since_discovery = 0;
            self.switches += 1;
            debug!(member = self.current, "adaptive hunter rotating after stall");
        }
        let found = self.found.len();
        let total = maze.total_dead_ends();
        let Some(member) = self.members.get_mut(self.current) else {
            return Ok(Choice::new(Move::Stop, "Adaptive hunter: no members configured"));
        };
        let inner = member.decide(maze, pose, sensors)?;
        Ok(Choice::new(
            inner.mv,
            format!("Adaptive hunter ({found}/{total}): {}", inner.explanation),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin;
    use crate::pose::{relative_walls, Facing};
    use crate::strategies::testing::{apply, open_room};

    #[test]
    fn phases_switch_on_budget() {
        let maze = builtin::given().unwrap();
        let mut p = Phased::hybrid(PhasedConfig::default().with_scan_steps(2).with_targeted_steps(3));
        let mut pose = Pose::new(67, Facing::North);
        let mut labels = Vec::new();
        for _ in 0..7 {
            let c = p
                .decide(&maze, pose, relative_walls(&maze, pose.position, pose.facing))
                .unwrap();
            labels.push(p.phase_label().unwrap().to_string());
            pose = apply(&maze, pose, c.mv);
        }
        assert_eq!(
            labels,
            ["scan", "scan", "targeted", "targeted", "targeted", "cleanup", "cleanup"]
        );
    }

    #[test]
    fn homes_at_once_without_dead_ends() {
        let maze = open_room(3, 4, 0);
        assert_eq!(maze.total_dead_ends(), 0);
        let mut r = Rotating::adaptive_hunter(RotatingConfig::default());
        let c = r
            .decide(&maze, Pose::new(4, Facing::North), relative_walls(&maze, 4, Facing::North))
            .unwrap();
        assert!(r.is_homing());
        assert!(c.explanation.contains("exit route"));
    }

    #[test]
    fn stalls_rotate_members() {
        let maze = builtin::given().unwrap();
        let mut r = Rotating::adaptive_hunter(RotatingConfig::default().with_stall_limit(3));
        let mut pose = Pose::new(67, Facing::North);
        for expected in [0, 0, 1, 1, 1, 2] {
            let c = r
                .decide(&maze, pose, relative_walls(&maze, pose.position, pose.facing))
                .unwrap();
            assert_eq!(r.current(), expected);
            pose = apply(&maze, pose, c.mv);
        }
        assert_eq!(r.switches(), 2);
        assert_eq!(r.dead_ends_found(), 0);
    }
}
