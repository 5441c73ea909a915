#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pose::{forward_position, Facing, Pose};

// Wall bits per cell, written as the 4-bit string NESW.
// 8=north, 4=east, 2=south, 1=west. 1 means wall.
pub const WALL_NORTH: u8 = 0b1000;
pub const WALL_EAST: u8 = 0b0100;
pub const WALL_SOUTH: u8 = 0b0010;
pub const WALL_WEST: u8 = 0b0001;
pub const WALL_ALL: u8 = WALL_NORTH | WALL_EAST | WALL_SOUTH | WALL_WEST;

#[derive(Debug, Error)]
pub enum MazeConfigError {
    #[error("maze size must be at least 1")]
    EmptyGrid,
    #[error("maze data has {actual} cells but a {size}x{size} grid needs {expected}")]
    DataLength {
        size: usize,
        expected: usize,
        actual: usize,
    },
    #[error("wall mask {mask:#b} at cell {pos} has bits outside NESW")]
    InvalidMask { pos: usize, mask: u8 },
    #[error("start position {pos} is outside the {cells}-cell grid")]
    StartOutOfRange { pos: usize, cells: usize },
    #[error("exit position {pos} is outside the {cells}-cell grid")]
    ExitOutOfRange { pos: usize, cells: usize },
    #[error("{field} facing {value} is not in 0..=3")]
    InvalidFacing { field: &'static str, value: u8 },
    #[error("step budget must be positive")]
    ZeroStepBudget,
    #[error("a {size}x{size} grid does not fit in memory")]
    TooLarge { size: usize },
    #[error("max score {0} is not a finite number")]
    InvalidMaxScore(f64),
    #[cfg(feature = "serde")]
    #[error("could not parse maze definition: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Absolute wall flags of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Walls {
    pub north: bool,
    pub east: bool,
    pub south: bool,
    pub west: bool,
}

impl Walls {
    pub const SOLID: Walls = Walls {
        north: true,
        east: true,
        south: true,
        west: true,
    };

    pub fn from_mask(mask: u8) -> Self {
        Self {
            north: mask & WALL_NORTH != 0,
            east: mask & WALL_EAST != 0,
            south: mask & WALL_SOUTH != 0,
            west: mask & WALL_WEST != 0,
        }
    }

    pub fn mask(&self) -> u8 {
        let mut m = 0;
        if self.north {
            m |= WALL_NORTH;
        }
        if self.east {
            m |= WALL_EAST;
        }
        if self.south {
            m |= WALL_SOUTH;
        }
        if self.west {
            m |= WALL_WEST;
        }
        m
    }

    pub fn get(&self, facing: Facing) -> bool {
        match facing {
            Facing::North => self.north,
            Facing::East => self.east,
            Facing::South => self.south,
            Facing::West => self.west,
        }
    }

    /// Indexed by `Facing::index()`.
    pub fn as_array(&self) -> [bool; 4] {
        [self.north, self.east, self.south, self.west]
    }

    pub fn count(&self) -> usize {
        self.as_array().iter().filter(|w| **w).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub pos: usize,
    pub walls: Walls,
}

impl Cell {
    pub fn wall_count(&self) -> usize {
        self.walls.count()
    }

    pub fn is_dead_end(&self) -> bool {
        self.wall_count() >= 3
    }
}

/// Raw maze description: row-major 4-bit wall masks plus run parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MazeDefinition {
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    pub size: usize,
    pub walls: Vec<u8>,
    pub start_pos: usize,
    pub start_facing: u8,
    pub exit_pos: usize,
    pub exit_facing: u8,
    pub min_steps: u32,
    pub max_steps: u32,
    pub max_score: f64,
}

/// Immutable grid of cells. Dead ends are derived from the wall masks.
#[derive(Debug, Clone)]
pub struct Maze {
    name: String,
    size: usize,
    cells: Vec<Cell>,
    start: Pose,
    exit_pos: usize,
    exit_facing: Facing,
    min_steps: u32,
    max_steps: u32,
    max_score: f64,
    dead_ends: Vec<usize>,
}

impl Maze {
    pub fn from_definition(def: MazeDefinition) -> Result<Self, MazeConfigError> {
        if def.size == 0 {
            return Err(MazeConfigError::EmptyGrid);
        }
        let expected = def
            .size
            .checked_mul(def.size)
            .ok_or(MazeConfigError::TooLarge { size: def.size })?;
        if def.walls.len() != expected {
            return Err(MazeConfigError::DataLength {
                size: def.size,
                expected,
                actual: def.walls.len(),
            });
        }
        if let Some((pos, &mask)) = def.walls.iter().enumerate().find(|(_, m)| **m & !WALL_ALL != 0) {
            return Err(MazeConfigError::InvalidMask { pos, mask });
        }
        if def.start_pos >= expected {
            return Err(MazeConfigError::StartOutOfRange {
                pos: def.start_pos,
                cells: expected,
            });
        }
        if def.exit_pos >= expected {
            return Err(MazeConfigError::ExitOutOfRange {
                pos: def.exit_pos,
                cells: expected,
            });
        }
        let start_facing =
            Facing::from_index(def.start_facing).ok_or(MazeConfigError::InvalidFacing {
                field: "start",
                value: def.start_facing,
            })?;
        let exit_facing =
            Facing::from_index(def.exit_facing).ok_or(MazeConfigError::InvalidFacing {
                field: "exit",
                value: def.exit_facing,
            })?;
        if def.max_steps == 0 {
            return Err(MazeConfigError::ZeroStepBudget);
        }
        if !def.max_score.is_finite() {
            return Err(MazeConfigError::InvalidMaxScore(def.max_score));
        }

        let cells: Vec<Cell> = def
            .walls
            .iter()
            .enumerate()
            .map(|(pos, &mask)| Cell {
                pos,
                walls: Walls::from_mask(mask),
            })
            .collect();
        let dead_ends = cells
            .iter()
            .filter(|c| c.is_dead_end())
            .map(|c| c.pos)
            .collect();

        Ok(Self {
            name: def.name,
            size: def.size,
            cells,
            start: Pose::new(def.start_pos, start_facing),
            exit_pos: def.exit_pos,
            exit_facing,
            min_steps: def.min_steps,
            max_steps: def.max_steps,
            max_score: def.max_score,
            dead_ends,
        })
    }

    #[cfg(feature = "serde")]
    pub fn from_json(text: &str) -> Result<Self, MazeConfigError> {
        let def: MazeDefinition = serde_json::from_str(text)?;
        Self::from_definition(def)
    }

    pub fn definition(&self) -> MazeDefinition {
        MazeDefinition {
            name: self.name.clone(),
            size: self.size,
            walls: self.cells.iter().map(|c| c.walls.mask()).collect(),
            start_pos: self.start.position,
            start_facing: self.start.facing.index(),
            exit_pos: self.exit_pos,
            exit_facing: self.exit_facing.index(),
            min_steps: self.min_steps,
            max_steps: self.max_steps,
            max_score: self.max_score,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, pos: usize) -> Option<&Cell> {
        self.cells.get(pos)
    }

    pub fn start(&self) -> Pose {
        self.start
    }

    pub fn exit_pos(&self) -> usize {
        self.exit_pos
    }

    pub fn exit_facing(&self) -> Facing {
        self.exit_facing
    }

    pub fn min_steps(&self) -> u32 {
        self.min_steps
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    pub fn max_score(&self) -> f64 {
        self.max_score
    }

    pub fn contains(&self, pos: usize) -> bool {
        pos < self.cells.len()
    }

    /// Out-of-range positions read as fully walled.
    pub fn walls_at(&self, pos: usize) -> Walls {
        self.cells.get(pos).map(|c| c.walls).unwrap_or(Walls::SOLID)
    }

    pub fn is_open(&self, pos: usize, facing: Facing) -> bool {
        !self.walls_at(pos).get(facing)
    }

    /// Adjacent, in-bounds, unwalled positions in N, E, S, W order.
    ///
    /// Bounds are checked independently of the wall bits, so a boundary cell
    /// with a missing outer wall never yields an off-grid neighbor.
    pub fn neighbors(&self, pos: usize) -> Vec<usize> {
        Facing::ALL
            .iter()
            .filter(|f| self.is_open(pos, **f))
            .filter_map(|f| forward_position(self, pos, *f))
            .collect()
    }

    /// Direction from `from` to an adjacent `to`, if they touch.
    pub fn direction_between(&self, from: usize, to: usize) -> Option<Facing> {
        Facing::ALL
            .iter()
            .copied()
            .find(|f| forward_position(self, from, *f) == Some(to))
    }

    pub fn is_dead_end(&self, pos: usize) -> bool {
        self.cells.get(pos).is_some_and(|c| c.is_dead_end())
    }

    /// Sorted positions of every derived dead end.
    pub fn dead_ends(&self) -> &[usize] {
        &self.dead_ends
    }

    pub fn total_dead_ends(&self) -> usize {
        self.dead_ends.len()
    }

    pub fn coords(&self, pos: usize) -> (usize, usize) {
        (pos % self.size, pos / self.size)
    }

    pub fn pos_at(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.size && y < self.size {
            Some(y * self.size + x)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(size: usize, walls: Vec<u8>) -> MazeDefinition {
        MazeDefinition {
            name: "t".to_string(),
            size,
            walls,
            start_pos: 0,
            start_facing: 0,
            exit_pos: 0,
            exit_facing: 0,
            min_steps: 1,
            max_steps: 10,
            max_score: 1.0,
        }
    }

    #[test]
    fn rejects_wrong_data_length() {
        let err = Maze::from_definition(def(3, vec![0; 8])).unwrap_err();
        assert!(matches!(
            err,
            MazeConfigError::DataLength {
                expected: 9,
                actual: 8,
                ..
            }
        ));
    }

    #[test]
    fn rejects_out_of_range_positions_and_facings() {
        let mut d = def(2, vec![0; 4]);
        d.start_pos = 4;
        assert!(matches!(
            Maze::from_definition(d),
            Err(MazeConfigError::StartOutOfRange { pos: 4, .. })
        ));

        let mut d = def(2, vec![0; 4]);
        d.exit_pos = 9;
        assert!(matches!(
            Maze::from_definition(d),
            Err(MazeConfigError::ExitOutOfRange { pos: 9, .. })
        ));

        let mut d = def(2, vec![0; 4]);
        d.exit_facing = 7;
        assert!(matches!(
            Maze::from_definition(d),
            Err(MazeConfigError::InvalidFacing { field: "exit", .. })
        ));

        assert!(matches!(
            Maze::from_definition(def(0, vec![])),
            Err(MazeConfigError::EmptyGrid)
        ));
        assert!(matches!(
            Maze::from_definition(def(1, vec![0b1_0000])),
            Err(MazeConfigError::InvalidMask { pos: 0, .. })
        ));
    }

    #[test]
    fn oversized_grid_is_an_error() {
        assert!(matches!(
            Maze::from_definition(def(1usize << 33, vec![0])),
            Err(MazeConfigError::TooLarge { .. })
        ));
        assert!(matches!(
            Maze::from_definition(def(usize::MAX, vec![])),
            Err(MazeConfigError::TooLarge { .. })
        ));
    }

    #[test]
    fn non_finite_max_score_is_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut d = def(1, vec![0]);
            d.max_score = bad;
            assert!(matches!(
                Maze::from_definition(d),
                Err(MazeConfigError::InvalidMaxScore(_))
            ));
        }
    }

    #[test]
    fn neighbors_ignore_missing_outer_walls() {
        // Every wall bit cleared: boundary cells still stay on the grid.
        let maze = Maze::from_definition(def(2, vec![0; 4])).unwrap();
        assert_eq!(maze.neighbors(0), vec![1, 2]);
        assert_eq!(maze.neighbors(3), vec![1, 2]);
    }

    #[test]
    fn dead_ends_are_derived_from_masks() {
        let maze = Maze::from_definition(def(2, vec![0b1011, 0b1100, 0b0111, 0b0001])).unwrap();
        assert_eq!(maze.dead_ends(), &[0, 2]);
        assert!(maze.is_dead_end(0));
        assert!(!maze.is_dead_end(1));
        assert!(!maze.is_dead_end(99));
        assert_eq!(maze.walls_at(99), Walls::SOLID);
    }

    #[test]
    fn definition_round_trips_masks() {
        let d = def(2, vec![0b1011, 0b1100, 0b0111, 0b0001]);
        let maze = Maze::from_definition(d.clone()).unwrap();
        assert_eq!(maze.definition(), d);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn loads_from_json() {
        let text = r#"{
            "name": "tiny",
            "size": 1,
            "walls": [13],
            "start_pos": 0,
            "start_facing": 2,
            "exit_pos": 0,
            "exit_facing": 2,
            "min_steps": 1,
            "max_steps": 5,
            "max_score": 2.0
        }"#;
        let maze = Maze::from_json(text).unwrap();
        assert_eq!(maze.name(), "tiny");
        assert_eq!(maze.exit_facing(), Facing::South);
        assert!(maze.is_dead_end(0));

        assert!(matches!(
            Maze::from_json("{\"size\": 1}"),
            Err(MazeConfigError::Parse(_))
        ));
    }
}
