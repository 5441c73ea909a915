#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::maze::Maze;

/// Cardinal direction, encoded 0..=3 as N, E, S, W.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Facing {
    North,
    East,
    South,
    West,
}

impl Facing {
    pub const ALL: [Facing; 4] = [Facing::North, Facing::East, Facing::South, Facing::West];

    pub fn from_index(v: u8) -> Option<Self> {
        match v {
            0 => Some(Facing::North),
            1 => Some(Facing::East),
            2 => Some(Facing::South),
            3 => Some(Facing::West),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Facing::North => 0,
            Facing::East => 1,
            Facing::South => 2,
            Facing::West => 3,
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'N' => Some(Facing::North),
            'E' => Some(Facing::East),
            'S' => Some(Facing::South),
            'W' => Some(Facing::West),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Facing::North => 'N',
            Facing::East => 'E',
            Facing::South => 'S',
            Facing::West => 'W',
        }
    }

    /// (facing + 3) % 4
    pub fn left(self) -> Self {
        Self::rotated(self, 3)
    }

    /// (facing + 1) % 4
    pub fn right(self) -> Self {
        Self::rotated(self, 1)
    }

    /// (facing + 2) % 4
    pub fn back(self) -> Self {
        Self::rotated(self, 2)
    }

    fn rotated(self, quarter_turns: u8) -> Self {
        match (self.index() + quarter_turns) % 4 {
            0 => Facing::North,
            1 => Facing::East,
            2 => Facing::South,
            _ => Facing::West,
        }
    }

    /// Facing after executing `mv`. Non-rotating moves keep the facing.
    pub fn turned(self, mv: Move) -> Self {
        match mv {
            Move::Left => self.left(),
            Move::Right => self.right(),
            Move::UTurn => self.back(),
            Move::Forward | Move::Wait | Move::Stop => self,
        }
    }
}

/// One simulated action.
///
/// `Left`, `Right` and `UTurn` are atomic: they rotate *and* try to advance
/// into the new front cell within the same step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Move {
    Forward,
    Left,
    Right,
    UTurn,
    Wait,
    Stop,
}

impl Move {
    pub fn as_str(self) -> &'static str {
        match self {
            Move::Forward => "FORWARD",
            Move::Left => "LEFT",
            Move::Right => "RIGHT",
            Move::UTurn => "UTURN",
            Move::Wait => "WAIT",
            Move::Stop => "STOP",
        }
    }

    /// Accepts move names (any case) and the 3-bit testbench codes.
    pub fn from_token(token: &str) -> Option<Self> {
        let t = token.trim();
        match t.to_ascii_uppercase().as_str() {
            "FORWARD" | "001" => Some(Move::Forward),
            "LEFT" | "010" => Some(Move::Left),
            "RIGHT" | "011" => Some(Move::Right),
            "UTURN" | "100" => Some(Move::UTurn),
            "WAIT" => Some(Move::Wait),
            "STOP" | "000" => Some(Move::Stop),
            _ => None,
        }
    }

    /// 3-bit testbench code. `Wait` has no hardware encoding.
    pub fn code(self) -> Option<&'static str> {
        match self {
            Move::Stop => Some("000"),
            Move::Forward => Some("001"),
            Move::Left => Some("010"),
            Move::Right => Some("011"),
            Move::UTurn => Some("100"),
            Move::Wait => None,
        }
    }

    /// The rotating move that turns `from` into `to`.
    pub fn toward(from: Facing, to: Facing) -> Self {
        match (to.index() + 4 - from.index()) % 4 {
            0 => Move::Forward,
            1 => Move::Right,
            2 => Move::UTurn,
            _ => Move::Left,
        }
    }

    pub fn advances(self) -> bool {
        !matches!(self, Move::Wait | Move::Stop)
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position plus facing. The only mutable placement state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose {
    pub position: usize,
    pub facing: Facing,
}

impl Pose {
    pub fn new(position: usize, facing: Facing) -> Self {
        Self { position, facing }
    }
}

/// Bot-relative wall sensing. `true` means wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorReading {
    pub left: bool,
    pub front: bool,
    pub right: bool,
}

impl SensorReading {
    /// Whether the side a turning move heads into is open. `UTurn` faces the
    /// unsensed back side and is reported as open.
    pub fn is_open(&self, mv: Move) -> bool {
        match mv {
            Move::Left => !self.left,
            Move::Forward => !self.front,
            Move::Right => !self.right,
            Move::UTurn => true,
            Move::Wait | Move::Stop => false,
        }
    }

    pub fn open_count(&self) -> usize {
        [self.left, self.front, self.right]
            .iter()
            .filter(|w| !**w)
            .count()
    }

    /// Testbench layout: left, front, right as a 3-bit string.
    pub fn bits(&self) -> String {
        let b = |w: bool| if w { '1' } else { '0' };
        [b(self.left), b(self.front), b(self.right)].iter().collect()
    }
}

pub fn relative_walls(maze: &Maze, pos: usize, facing: Facing) -> SensorReading {
    let walls = maze.walls_at(pos);
    SensorReading {
        left: walls.get(facing.left()),
        front: walls.get(facing),
        right: walls.get(facing.right()),
    }
}

/// Adjacent cell in direction `facing`, or `None` when the move would cross
/// the maze boundary. Wall data is not consulted.
pub fn forward_position(maze: &Maze, pos: usize, facing: Facing) -> Option<usize> {
    let size = maze.size();
    if pos >= maze.cell_count() {
        return None;
    }
    let (x, y) = (pos % size, pos / size);
    match facing {
        Facing::North if y > 0 => Some(pos - size),
        Facing::East if x + 1 < size => Some(pos + 1),
        Facing::South if y + 1 < size => Some(pos + size),
        Facing::West if x > 0 => Some(pos - 1),
        _ => None,
    }
}

/// At the exit cell, facing the egress direction, with nothing but the
/// boundary ahead.
pub fn is_exit_pose(maze: &Maze, pose: Pose) -> bool {
    pose.position == maze.exit_pos()
        && pose.facing == maze.exit_facing()
        && forward_position(maze, pose.position, pose.facing).is_none()
}
