use super::navigation::{distances_from, exit_approach};
use super::Choice;
use crate::maze::Maze;
use crate::pose::{forward_position, Move, Pose};

/// Full-knowledge greedy descent on a distance-to-exit map.
#[derive(Debug, Clone, Default)]
pub struct FloodFill {
    distances: Option<Vec<Option<u32>>>,
}

impl FloodFill {
    pub fn new() -> Self {
        Self::default()
    }

    /// Distance of `pos` to the exit, once the map has been built.
    pub fn distance(&self, pos: usize) -> Option<u32> {
        self.distances.as_ref()?.get(pos).copied().flatten()
    }

    pub fn decide(&mut self, maze: &Maze, pose: Pose) -> Choice {
        let dist = self
            .distances
            .get_or_insert_with(|| distances_from(maze, maze.exit_pos()));

        if pose.position == maze.exit_pos() {
            return Choice::new(exit_approach(maze, pose), "Flood fill: at exit, facing out");
        }

        // Forward first so ties keep the current heading.
        let best = [Move::Forward, Move::Left, Move::Right, Move::UTurn]
            .into_iter()
            .filter_map(|mv| {
                let f = pose.facing.turned(mv);
                if !maze.is_open(pose.position, f) {
                    return None;
                }
                let n = forward_position(maze, pose.position, f)?;
                Some((mv, n, dist.get(n).copied().flatten()?))
            })
            .min_by_key(|(_, _, d)| *d);

        match best {
            Some((mv, n, d)) => Choice::new(mv, format!("Flood fill: {mv} to {n}, {d} from exit")),
            None => Choice::new(Move::Stop, "Flood fill: exit unreachable from here"),
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
    fn descends_straight_to_the_exit() {
        let maze = builtin::given().unwrap();
        let mut ff = FloodFill::new();
        let mut pose = Pose::new(67, Facing::North);
        ff.decide(&maze, pose);
        let par = ff.distance(67).unwrap();

        let mut steps = 0;
        pose = Pose::new(67, Facing::North);
        let mut ff = FloodFill::new();
        while !is_exit_pose(&maze, pose) && steps < 500 {
            pose = apply(&maze, pose, ff.decide(&maze, pose).mv);
            steps += 1;
        }
        assert!(is_exit_pose(&maze, pose));
        // One move per hop plus at most one turn at the exit cell.
        assert!(steps <= par + 1);
    }
}
