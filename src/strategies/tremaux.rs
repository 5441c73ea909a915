use hashbrown::HashMap;

use super::navigation::exit_approach;
use super::Choice;
use crate::maze::Maze;
use crate::pose::{forward_position, Move, Pose, SensorReading};

/// Trémaux passage marking, with marks kept per cell.
#[derive(Debug, Clone, Default)]
pub struct Tremaux {
    marks: HashMap<usize, u32>,
}

impl Tremaux {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self, pos: usize) -> u32 {
        self.marks.get(&pos).copied().unwrap_or(0)
    }

    pub fn decide(&mut self, maze: &Maze, pose: Pose, sensors: SensorReading) -> Choice {
        self.marks.entry(pose.position).or_insert(1);
        if pose.position == maze.exit_pos() {
            return Choice::new(exit_approach(maze, pose), "Tremaux: at exit, facing out");
        }

        // Stable min keeps left, front, right order among equal marks.
        let best = [Move::Left, Move::Forward, Move::Right]
            .into_iter()
            .filter(|mv| sensors.is_open(*mv))
            .filter_map(|mv| {
                let target = forward_position(maze, pose.position, pose.facing.turned(mv))?;
                Some((mv, target, self.mark(target)))
            })
            .filter(|(_, _, mark)| *mark < 2)
            .min_by_key(|(_, _, mark)| *mark);

        match best {
            Some((mv, target, mark)) => {
                *self.marks.entry(target).or_insert(0) += 1;
                Choice::new(mv, format!("Tremaux: {mv} into cell {target} (mark {mark})"))
            }
            None => {
                let own = self.marks.entry(pose.position).or_insert(0);
                *own += 1;
                Choice::new(
                    Move::UTurn,
                    format!("Tremaux: no passage under two marks, turning back (mark {own})"),
                )
            }
        }
    }
}
