//! Breadth-first and depth-first search carried out by a walking bot.
//!
//! Breadth-first keeps a FIFO frontier of discovered cells and walks to each
//! one along tree edges before expanding it. Depth-first keeps the path it
//! descended as a stack and always steps into an adjacent cell it has not
//! entered yet, backtracking one stack entry at a time when none is left.

use std::collections::VecDeque;

use hashbrown::{HashMap, HashSet};

use super::navigation::{exit_approach, shortest_route, step_toward, RouteFollower};
use super::{Choice, StrategyFault};
use crate::maze::Maze;
use crate::pose::{Move, Pose};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Frontier {
    /// Queue of discovered cells: breadth-first.
    Fifo,
    /// Stack of the descended path: depth-first.
    Lifo,
}

impl Frontier {
    pub fn label(self) -> &'static str {
        match self {
            Frontier::Fifo => "BFS",
            Frontier::Lifo => "DFS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Exploring,
    FollowingPath,
    Exhausted,
}

#[derive(Debug, Clone)]
struct FrontierEntry {
    pos: usize,
    /// Tree path from the root, ending with `pos`.
    path: Vec<usize>,
    level: u32,
}

#[derive(Debug, Clone)]
pub struct GraphSearch {
    discipline: Frontier,
    frontier: VecDeque<FrontierEntry>,
    visited: HashSet<usize>,
    parents: HashMap<usize, usize>,
    root: Option<usize>,
    /// Entry the bot is walking to, expanded on arrival.
    target: Option<FrontierEntry>,
    /// Tree path of the cell the bot stands on.
    here: Vec<usize>,
    route: RouteFollower,
    phase: SearchPhase,
    solution: Vec<usize>,
    expansions: Vec<(usize, u32)>,
    /// Depth-first only: the descended path, current cell on top.
    stack: Vec<usize>,
    /// Depth-first only: neighbours of each branch point not yet entered.
    unexplored: HashMap<usize, Vec<usize>>,
}

impl GraphSearch {
    pub fn new(discipline: Frontier) -> Self {
        Self {
            discipline,
            frontier: VecDeque::new(),
            visited: HashSet::new(),
            parents: HashMap::new(),
            root: None,
            target: None,
            here: Vec::new(),
            route: RouteFollower::default(),
            phase: SearchPhase::Exploring,
            solution: Vec::new(),
            expansions: Vec::new(),
            stack: Vec::new(),
            unexplored: HashMap::new(),
        }
    }

    pub fn breadth_first() -> Self {
        Self::new(Frontier::Fifo)
    }

    pub fn depth_first() -> Self {
        Self::new(Frontier::Lifo)
    }

    pub fn discipline(&self) -> Frontier {
        self.discipline
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    /// `(cell, level)` of every entry taken off the frontier, in order.
    pub fn expansions(&self) -> &[(usize, u32)] {
        &self.expansions
    }

    /// Root-to-exit path rebuilt from the parent map once the exit is found.
    pub fn solution(&self) -> &[usize] {
        &self.solution
    }

    /// Cells discovered but not yet entered.
    pub fn frontier_len(&self) -> usize {
        match self.discipline {
            Frontier::Fifo => self.frontier.len(),
            Frontier::Lifo => self
                .unexplored
                .values()
                .flatten()
                .filter(|n| !self.visited.contains(*n))
                .collect::<HashSet<_>>()
                .len(),
        }
    }

    /// Depth-first stack, root first.
    pub fn path_stack(&self) -> &[usize] {
        &self.stack
    }

    pub fn decide(&mut self, maze: &Maze, pose: Pose) -> Result<Choice, StrategyFault> {
        match self.discipline {
            Frontier::Fifo => self.decide_breadth_first(maze, pose),
            Frontier::Lifo => self.decide_depth_first(maze, pose),
        }
    }

    fn decide_breadth_first(&mut self, maze: &Maze, pose: Pose) -> Result<Choice, StrategyFault> {
        let label = self.discipline.label();
        if self.root.is_none() {
            self.root = Some(pose.position);
            self.visited.insert(pose.position);
            self.frontier.push_back(FrontierEntry {
                pos: pose.position,
                path: vec![pose.position],
                level: 0,
            });
        }

        loop {
            if let Some((mv, next)) = self.route.next_move(maze, pose)? {
                let what = match self.phase {
                    SearchPhase::FollowingPath => "following path to exit",
                    _ => "walking to frontier",
                };
                return Ok(Choice::new(mv, format!("{label}: {what}, next cell {next}")));
            }

            if let Some(entry) = self.target.take() {
                if entry.pos != pose.position {
                    return Err(StrategyFault::Runtime(format!(
                        "{label} expected to stand on cell {} but is on {}",
                        entry.pos, pose.position
                    )));
                }
                self.here = entry.path.clone();
                if self.phase == SearchPhase::Exploring {
                    self.expand(maze, &entry);
                }
            }

            if self.phase == SearchPhase::FollowingPath || pose.position == maze.exit_pos() {
                self.phase = SearchPhase::FollowingPath;
                return Ok(Choice::new(
                    exit_approach(maze, pose),
                    format!("{label}: at exit, facing out"),
                ));
            }

            let Some(entry) = self.frontier.pop_front() else {
                self.phase = SearchPhase::Exhausted;
                return Ok(Choice::new(
                    Move::Stop,
                    format!("{label}: frontier empty, exit unreachable"),
                ));
            };
            self.expansions.push((entry.pos, entry.level));
            if entry.pos == maze.exit_pos() {
                self.phase = SearchPhase::FollowingPath;
                self.solution = self.path_to_root(entry.pos);
            }
            self.route = RouteFollower::new(tree_route(&self.here, &entry.path));
            self.target = Some(entry);
        }
    }

    fn decide_depth_first(&mut self, maze: &Maze, pose: Pose) -> Result<Choice, StrategyFault> {
        let label = self.discipline.label();
        let here = pose.position;
        if self.root.is_none() {
            self.root = Some(here);
        }
        if let Some((mv, next)) = self.route.next_move(maze, pose)? {
            return Ok(Choice::new(
                mv,
                format!("{label}: detour back to the stack, next cell {next}"),
            ));
        }

        if self.visited.insert(here) {
            self.stack.push(here);
            self.expansions
                .push((here, self.stack.len().saturating_sub(1) as u32));
            self.unexplored.insert(here, maze.neighbors(here));
            if here == maze.exit_pos() && self.phase == SearchPhase::Exploring {
                self.phase = SearchPhase::FollowingPath;
                self.solution = self.path_to_root(here);
            }
        } else if self.stack.last() != Some(&here) {
            return Err(StrategyFault::Runtime(format!(
                "{label} expected to stand on cell {:?} but is on {here}",
                self.stack.last()
            )));
        }

        if self.phase == SearchPhase::FollowingPath {
            return Ok(Choice::new(
                exit_approach(maze, pose),
                format!("{label}: at exit, facing out"),
            ));
        }

        let visited = &self.visited;
        let next = self
            .unexplored
            .get_mut(&here)
            .and_then(|siblings| {
                siblings.retain(|n| !visited.contains(n));
                siblings.first().copied()
            });
        if let Some(next) = next {
            let mv = step_toward(maze, pose, next).ok_or_else(|| {
                StrategyFault::Runtime(format!("{label}: cell {next} is not next to {here}"))
            })?;
            self.parents.insert(next, here);
            return Ok(Choice::new(
                mv,
                format!("{label}: descending into unvisited cell {next}"),
            ));
        }

        self.stack.pop();
        let Some(&back) = self.stack.last() else {
            self.phase = SearchPhase::Exhausted;
            return Ok(Choice::new(
                Move::Stop,
                format!("{label}: every reachable cell visited, exit unreachable"),
            ));
        };
        let direct = maze
            .direction_between(here, back)
            .filter(|f| maze.is_open(here, *f));
        if let Some(facing) = direct {
            return Ok(Choice::new(
                Move::toward(pose.facing, facing),
                format!("{label}: dead end at {here}, backtracking to {back}"),
            ));
        }
        // The edge back is walled on this side only; go around through
        // cells already entered.
        let visited = &self.visited;
        let Some(route) = shortest_route(maze, here, back, |c| visited.contains(&c)) else {
            self.phase = SearchPhase::Exhausted;
            return Ok(Choice::new(
                Move::Stop,
                format!("{label}: no way back to {back}"),
            ));
        };
        self.route = RouteFollower::new(route);
        match self.route.next_move(maze, pose)? {
            Some((mv, next)) => Ok(Choice::new(
                mv,
                format!("{label}: detour back to the stack, next cell {next}"),
            )),
            None => Err(StrategyFault::Runtime(format!(
                "{label}: empty route from {here} to {back}"
            ))),
        }
    }

    fn expand(&mut self, maze: &Maze, entry: &FrontierEntry) {
        for n in maze.neighbors(entry.pos) {
            if self.visited.insert(n) {
                self.parents.insert(n, entry.pos);
                let mut path = entry.path.clone();
                path.push(n);
                self.frontier.push_back(FrontierEntry {
                    pos: n,
                    path,
                    level: entry.level + 1,
                });
            }
        }
    }

    fn path_to_root(&self, pos: usize) -> Vec<usize> {
        let mut path = vec![pos];
        let mut cur = pos;
        while let Some(&p) = self.parents.get(&cur) {
            path.push(p);
            cur = p;
        }
        path.reverse();
        path
    }
}

/// Walk from the end of `from` to the end of `to` through their deepest
/// common ancestor. The result excludes the starting cell.
fn tree_route(from: &[usize], to: &[usize]) -> Vec<usize> {
    let common = from.iter().zip(to).take_while(|(a, b)| a == b).count();
    if common == 0 {
        return to.to_vec();
    }
    let up = from[common - 1..from.len().saturating_sub(1)].iter().rev();
    up.chain(&to[common..]).copied().collect()
}
