//! Route planning shared by the strategies that keep a map.

use std::collections::VecDeque;

use hashbrown::HashMap;

use super::StrategyFault;
use crate::maze::Maze;
use crate::pose::{Move, Pose};

/// Move that takes `pose` into the adjacent cell `target`.
pub fn step_toward(maze: &Maze, pose: Pose, target: usize) -> Option<Move> {
    maze.direction_between(pose.position, target)
        .map(|f| Move::toward(pose.facing, f))
}

/// Breadth-first route from `from` to `to` through cells accepted by
/// `allow`. The route excludes `from` and ends with `to`; it is empty when
/// the two coincide.
pub fn shortest_route(
    maze: &Maze,
    from: usize,
    to: usize,
    allow: impl Fn(usize) -> bool,
) -> Option<Vec<usize>> {
    if from == to {
        return Some(Vec::new());
    }
    let mut parents: HashMap<usize, usize> = HashMap::new();
    let mut queue = VecDeque::from([from]);
    parents.insert(from, from);

    while let Some(pos) = queue.pop_front() {
        for n in maze.neighbors(pos) {
            if parents.contains_key(&n) || !(n == to || allow(n)) {
                continue;
            }
            parents.insert(n, pos);
            if n == to {
                let mut route = vec![to];
                let mut cur = pos;
                while cur != from {
                    route.push(cur);
                    cur = parents[&cur];
                }
                route.reverse();
                return Some(route);
            }
            queue.push_back(n);
        }
    }
    None
}

/// Single-source BFS distance over open edges. Unreachable cells are `None`.
pub fn distances_from(maze: &Maze, source: usize) -> Vec<Option<u32>> {
    let mut dist = vec![None; maze.cell_count()];
    if !maze.contains(source) {
        return dist;
    }
    dist[source] = Some(0);
    let mut queue = VecDeque::from([source]);
    while let Some(pos) = queue.pop_front() {
        let d = dist[pos].unwrap_or(0);
        for n in maze.neighbors(pos) {
            if dist[n].is_none() {
                dist[n] = Some(d + 1);
                queue.push_back(n);
            }
        }
    }
    dist
}

/// At the exit cell: turn to the egress, walk out if it is already ahead, or
/// give up when the egress is walled.
pub fn exit_approach(maze: &Maze, pose: Pose) -> Move {
    if pose.facing != maze.exit_facing() {
        Move::toward(pose.facing, maze.exit_facing())
    } else if maze.is_open(pose.position, pose.facing) {
        Move::Forward
    } else {
        Move::Stop
    }
}

/// Replays a list of cells one adjacent hop at a time.
#[derive(Debug, Clone, Default)]
pub struct RouteFollower {
    route: VecDeque<usize>,
}

impl RouteFollower {
    pub fn new(route: impl IntoIterator<Item = usize>) -> Self {
        Self {
            route: route.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.route.len()
    }

    /// Next hop as `(move, target)`, or `None` once the route is used up.
    pub fn next_move(
        &mut self,
        maze: &Maze,
        pose: Pose,
    ) -> Result<Option<(Move, usize)>, StrategyFault> {
        while self.route.front() == Some(&pose.position) {
            self.route.pop_front();
        }
        let Some(&next) = self.route.front() else {
            return Ok(None);
        };
        match step_toward(maze, pose, next) {
            Some(mv) => Ok(Some((mv, next))),
            None => Err(StrategyFault::Runtime(format!(
                "route hop {next} is not adjacent to cell {}",
                pose.position
            ))),
        }
    }
}
