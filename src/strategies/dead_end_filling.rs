use hashbrown::{HashMap, HashSet};

use super::navigation::exit_approach;
use super::Choice;
use crate::maze::Maze;
use crate::pose::{forward_position, Move, Pose};

/// Full-knowledge solver that first fills every dead-end branch, then only
/// walks cells left unfilled.
#[derive(Debug, Clone, Default)]
pub struct DeadEndFilling {
    filled: Option<HashSet<usize>>,
    visits: HashMap<usize, u32>,
}

impl DeadEndFilling {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_filled(&self, pos: usize) -> bool {
        self.filled.as_ref().is_some_and(|f| f.contains(&pos))
    }

    pub fn filled_count(&self) -> usize {
        self.filled.as_ref().map_or(0, |f| f.len())
    }

    pub fn decide(&mut self, maze: &Maze, pose: Pose) -> Choice {
        let filled = self
            .filled
            .get_or_insert_with(|| fill_dead_ends(maze, &[maze.start().position, pose.position]));
        *self.visits.entry(pose.position).or_insert(0) += 1;

        if pose.position == maze.exit_pos() {
            return Choice::new(
                exit_approach(maze, pose),
                "Dead-end filling: at exit, facing out",
            );
        }

        let options: Vec<(Move, usize)> = [Move::Forward, Move::Left, Move::Right, Move::UTurn]
            .into_iter()
            .filter_map(|mv| {
                let f = pose.facing.turned(mv);
                if !maze.is_open(pose.position, f) {
                    return None;
                }
                Some((mv, forward_position(maze, pose.position, f)?))
            })
            .collect();
        let unfilled: Vec<(Move, usize)> = options
            .iter()
            .copied()
            .filter(|(_, n)| !filled.contains(n))
            .collect();
        let pool = if unfilled.is_empty() { &options } else { &unfilled };

        let visits = &self.visits;
        let pick = pool
            .iter()
            .copied()
            .min_by_key(|(_, n)| visits.get(n).copied().unwrap_or(0));

        match pick {
            Some((mv, n)) if !filled.contains(&n) => {
                Choice::new(mv, format!("Dead-end filling: {mv} along open corridor to {n}"))
            }
            Some((mv, n)) => Choice::new(mv, format!("Dead-end filling: leaving filled branch via {n}")),
            None => Choice::new(Move::Stop, "Dead-end filling: boxed in"),
        }
    }
}

/// Repeatedly fold in cells with a single unfilled neighbour until nothing
/// changes. The exit and the `keep` cells are never filled.
pub fn fill_dead_ends(maze: &Maze, keep: &[usize]) -> HashSet<usize> {
    let mut filled = HashSet::new();
    loop {
        let mut changed = false;
        for pos in 0..maze.cell_count() {
            if pos == maze.exit_pos() || keep.contains(&pos) || filled.contains(&pos) {
                continue;
            }
            let open = maze
                .neighbors(pos)
                .into_iter()
                .filter(|n| !filled.contains(n))
                .count();
            if open == 1 {
                filled.insert(pos);
                changed = true;
            }
        }
        if !changed {
            return filled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin;
    use crate::pose::{is_exit_pose, Facing};
    use crate::strategies::testing::apply;

    #[test]
    fn filling_leaves_a_corridor_to_the_exit() {
        let maze = builtin::given().unwrap();
        let filled = fill_dead_ends(&maze, &[76]);
        assert!(!filled.contains(&4));
        assert!(!filled.contains(&76));
        for d in maze.dead_ends() {
            if *d != 76 && *d != 4 {
                assert!(filled.contains(d), "dead end {d} not filled");
            }
        }
    }

    #[test]
    fn walks_the_unfilled_cells_to_the_exit() {
        let maze = builtin::given().unwrap();
        let mut s = DeadEndFilling::new();
        let mut pose = Pose::new(67, Facing::North);
        let mut steps = 0;
        while !is_exit_pose(&maze, pose) && steps < 600 {
            let c = s.decide(&maze, pose);
            assert_ne!(c.mv, Move::Stop);
            pose = apply(&maze, pose, c.mv);
            steps += 1;
        }
        assert!(is_exit_pose(&maze, pose));
        assert!(s.filled_count() > 0);
    }
}
