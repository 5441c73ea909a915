use tracing::debug;

use super::Choice;
use crate::maze::Maze;
use crate::pose::{Facing, Move, Pose};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One queued manual command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Command {
    Forward,
    Left,
    Right,
    UTurn,
}

impl Command {
    /// `F`, `L`, `R` or `U`, in either case.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "F" => Some(Command::Forward),
            "L" => Some(Command::Left),
            "R" => Some(Command::Right),
            "U" => Some(Command::UTurn),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Command::Forward => 'F',
            Command::Left => 'L',
            Command::Right => 'R',
            Command::UTurn => 'U',
        }
    }

    pub fn as_move(self) -> Move {
        match self {
            Command::Forward => Move::Forward,
            Command::Left => Move::Left,
            Command::Right => Move::Right,
            Command::UTurn => Move::UTurn,
        }
    }

    /// Tokenize raw input such as `"f, F l  x"`. Unrecognized tokens are
    /// returned separately and never reach the queue.
    pub fn parse_script(raw: &str) -> (Vec<Command>, Vec<String>) {
        let mut commands = Vec::new();
        let mut dropped = Vec::new();
        for token in raw
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            match Command::from_token(token) {
                Some(c) => commands.push(c),
                None => dropped.push(token.to_string()),
            }
        }
        (commands, dropped)
    }
}

/// A command that met a wall and was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlockedCommand {
    pub index: usize,
    pub command: Command,
    pub position: usize,
    pub facing: Facing,
}

/// Plays back a validated command queue.
#[derive(Debug, Clone, Default)]
pub struct Scripted {
    commands: Vec<Command>,
    cursor: usize,
    blocked: Vec<BlockedCommand>,
}

impl Scripted {
    pub fn new(commands: Vec<Command>) -> Self {
        Self {
            commands,
            cursor: 0,
            blocked: Vec::new(),
        }
    }

    /// Build from a token list, dropping anything outside `{F,L,R,U}`.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Self {
        let commands = tokens
            .iter()
            .filter_map(|t| {
                let c = Command::from_token(t.as_ref());
                if c.is_none() {
                    debug!(token = t.as_ref(), "dropping unrecognized script token");
                }
                c
            })
            .collect();
        Self::new(commands)
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.commands.len().saturating_sub(self.cursor)
    }

    pub fn blocked(&self) -> &[BlockedCommand] {
        &self.blocked
    }

    /// The bootstrap already moved forward; a leading `F` is that move, and
    /// is logged as blocked when the start cell is walled ahead.
    pub(crate) fn on_bootstrap(&mut self, maze: &Maze, pose: Pose) {
        if self.commands.first() != Some(&Command::Forward) {
            return;
        }
        self.cursor = 1;
        if !maze.is_open(pose.position, pose.facing) {
            self.blocked.push(BlockedCommand {
                index: 0,
                command: Command::Forward,
                position: pose.position,
                facing: pose.facing,
            });
            debug!(index = 0, "scripted command blocked by wall");
        }
    }

    pub fn decide(&mut self, maze: &Maze, pose: Pose) -> Choice {
        let Some(&command) = self.commands.get(self.cursor) else {
            return Choice::new(Move::Stop, "Manual: command queue finished");
        };
        let index = self.cursor;
        self.cursor += 1;

        let mv = command.as_move();
        if maze.is_open(pose.position, pose.facing.turned(mv)) {
            return Choice::new(
                mv,
                format!("Manual: command {} ({})", index + 1, command.letter()),
            );
        }
        self.blocked.push(BlockedCommand {
            index,
            command,
            position: pose.position,
            facing: pose.facing,
        });
        debug!(index, command = %command.letter(), "scripted command blocked by wall");
        Choice::new(
            Move::Wait,
            format!("Manual: command {} ({}) blocked by wall", index + 1, command.letter()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::testing::open_room;

    #[test]
    fn parse_script_accepts_commas_spaces_and_case() {
        let (cmds, dropped) = Command::parse_script("f, F l  x,u,R");
        assert_eq!(
            cmds,
            vec![
                Command::Forward,
                Command::Forward,
                Command::Left,
                Command::UTurn,
                Command::Right
            ]
        );
        assert_eq!(dropped, vec!["x".to_string()]);
    }

    #[test]
    fn unknown_tokens_never_reach_the_queue() {
        let s = Scripted::from_tokens(&["F", "X", "L"]);
        assert_eq!(s.commands(), &[Command::Forward, Command::Left]);
    }

    #[test]
    fn blocked_command_waits_and_is_logged() {
        // Top-left corner of a room: north and west are walled.
        let maze = open_room(3, 0, 8);
        let mut s = Scripted::new(vec![Command::Left, Command::Right]);
        let c = s.decide(&maze, Pose::new(0, Facing::North));
        assert_eq!(c.mv, Move::Wait);
        assert_eq!(s.blocked().len(), 1);
        assert_eq!(s.blocked()[0].command, Command::Left);

        let c = s.decide(&maze, Pose::new(0, Facing::North));
        assert_eq!(c.mv, Move::Right);
        let c = s.decide(&maze, Pose::new(1, Facing::East));
        assert_eq!(c.mv, Move::Stop);
        assert_eq!(s.remaining(), 0);
    }

    #[test]
    fn leading_forward_is_the_bootstrap() {
        let maze = open_room(3, 7, 0);
        let start = Pose::new(7, Facing::North);
        let mut s = Scripted::new(vec![Command::Forward, Command::Left]);
        s.on_bootstrap(&maze, start);
        assert_eq!(s.cursor(), 1);
        assert!(s.blocked().is_empty());
        let mut s = Scripted::new(vec![Command::Left]);
        s.on_bootstrap(&maze, start);
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn walled_bootstrap_forward_is_logged() {
        // Bottom edge of the room, facing the outer wall.
        let maze = open_room(3, 7, 0);
        let start = Pose::new(7, Facing::South);
        let mut s = Scripted::new(vec![Command::Forward, Command::Left]);
        s.on_bootstrap(&maze, start);
        assert_eq!(s.cursor(), 1);
        assert_eq!(
            s.blocked(),
            &[BlockedCommand {
                index: 0,
                command: Command::Forward,
                position: 7,
                facing: Facing::South,
            }]
        );
    }
}
