use hashbrown::HashSet;

use super::navigation::{exit_approach, shortest_route, step_toward, RouteFollower};
use super::{Choice, StrategyFault};
use crate::maze::Maze;
use crate::pose::{forward_position, Move, Pose};

/// Recursive backtracking with an explicit stack of cells.
///
/// Descends into an unvisited neighbour whenever one exists. When none is
/// left it turns toward the previous cell on the stack, recomputing the
/// bearing from the current pose. Once the stack is empty the maze is fully
/// explored and the bot routes to the exit over visited cells.
#[derive(Debug, Clone, Default)]
pub struct Backtracker {
    visited: HashSet<usize>,
    stack: Vec<usize>,
    started: bool,
    finishing: Option<RouteFollower>,
}

impl Backtracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn decide(&mut self, maze: &Maze, pose: Pose) -> Result<Choice, StrategyFault> {
        if !self.started {
            self.started = true;
            self.visited.insert(pose.position);
            self.stack.push(pose.position);
        }

        if let Some(route) = self.finishing.as_mut() {
            if let Some((mv, next)) = route.next_move(maze, pose)? {
                return Ok(Choice::new(
                    mv,
                    format!("Backtracker: explored, heading to exit via {next}"),
                ));
            }
            return Ok(Choice::new(
                exit_approach(maze, pose),
                "Backtracker: at exit, facing out",
            ));
        }

        if self.stack.last() != Some(&pose.position) {
            return Err(StrategyFault::Runtime(format!(
                "backtrack stack top {:?} does not match cell {}",
                self.stack.last(),
                pose.position
            )));
        }

        let fresh = [Move::Left, Move::Forward, Move::Right, Move::UTurn]
            .into_iter()
            .map(|mv| pose.facing.turned(mv))
            .filter(|f| maze.is_open(pose.position, *f))
            .filter_map(|f| forward_position(maze, pose.position, f))
            .find(|n| !self.visited.contains(n));

        if let Some(next) = fresh {
            self.visited.insert(next);
            self.stack.push(next);
            let mv = step_toward(maze, pose, next).unwrap_or(Move::Forward);
            return Ok(Choice::new(mv, format!("Backtracker: descend into {next}")));
        }

        self.stack.pop();
        if let Some(&prev) = self.stack.last() {
            let mv = step_toward(maze, pose, prev).ok_or_else(|| {
                StrategyFault::Runtime(format!(
                    "previous cell {prev} is not adjacent to {}",
                    pose.position
                ))
            })?;
            return Ok(Choice::new(mv, format!("Backtracker: back to {prev}")));
        }

        let visited = &self.visited;
        let Some(route) =
            shortest_route(maze, pose.position, maze.exit_pos(), |p| visited.contains(&p))
        else {
            return Ok(Choice::new(
                Move::Stop,
                "Backtracker: explored everything, exit unreachable",
            ));
        };
        self.finishing = Some(RouteFollower::new(route));
        self.decide(maze, pose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin;
    use crate::pose::{is_exit_pose, Facing};
    use crate::strategies::testing::{apply, open_room};

    #[test]
    fn leaves_through_the_exit() {
        let maze = builtin::given().unwrap();
        let mut b = Backtracker::new();
        let mut pose = Pose::new(67, Facing::North);
        let mut steps = 0;
        while !is_exit_pose(&maze, pose) && steps < 1000 {
            let c = b.decide(&maze, pose).unwrap();
            assert_ne!(c.mv, Move::Stop);
            pose = apply(&maze, pose, c.mv);
            steps += 1;
        }
        assert!(is_exit_pose(&maze, pose));
    }

    #[test]
    fn explores_every_cell_before_heading_out() {
        // Egress is walled, so the run can only end once the stack empties.
        let maze = open_room(3, 6, 2);
        let mut b = Backtracker::new();
        let mut pose = Pose::new(6, Facing::North);
        for _ in 0..200 {
            let c = b.decide(&maze, pose).unwrap();
            if c.mv == Move::Stop {
                break;
            }
            pose = apply(&maze, pose, c.mv);
        }
        assert_eq!(b.visited_count(), 9);
        assert_eq!(pose, Pose::new(2, Facing::North));
    }

    #[test]
    fn backtrack_turns_toward_previous_cell() {
        let maze = builtin::given().unwrap();
        let mut b = Backtracker::new();
        // Cell 80 is a dead end reached from 71 above it.
        b.started = true;
        b.visited.extend([71, 80]);
        b.stack.extend([71, 80]);
        let c = b.decide(&maze, Pose::new(80, Facing::South)).unwrap();
        assert_eq!(c.mv, Move::UTurn);
        assert_eq!(b.depth(), 1);
    }
}
