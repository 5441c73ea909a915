use tracing::warn;

use super::{Choice, StrategyFault};
use crate::pose::{Facing, Move, Pose};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One recorded step of an external trace: the pose the recording bot was in
/// and the move it made from there. `mv` holds the raw token, either a move
/// name or a 3-bit code.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReplayStep {
    pub pos: usize,
    pub facing: Facing,
    #[cfg_attr(feature = "serde", serde(rename = "move"))]
    pub mv: String,
}

impl ReplayStep {
    pub fn new(pos: usize, facing: Facing, mv: impl Into<String>) -> Self {
        Self {
            pos,
            facing,
            mv: mv.into(),
        }
    }
}

/// Replays a recorded `{pos, facing, move}` stream move by move.
#[derive(Debug, Clone, Default)]
pub struct Replay {
    steps: Vec<ReplayStep>,
    cursor: usize,
    desyncs: u32,
}

impl Replay {
    pub fn new(steps: Vec<ReplayStep>) -> Self {
        Self {
            steps,
            cursor: 0,
            desyncs: 0,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps whose recorded pose differed from the simulated one.
    pub fn desyncs(&self) -> u32 {
        self.desyncs
    }

    /// A recorded leading forward move is the bootstrap itself.
    pub(crate) fn on_bootstrap(&mut self, pose: Pose) {
        let Some(first) = self.steps.first() else {
            return;
        };
        if Move::from_token(&first.mv) == Some(Move::Forward) {
            self.check_sync(first.pos, first.facing, pose, 0);
            self.cursor = 1;
        }
    }

    pub fn decide(&mut self, pose: Pose) -> Result<Choice, StrategyFault> {
        let Some(step) = self.steps.get(self.cursor) else {
            return Ok(Choice::new(Move::Stop, "Replay: recording finished"));
        };
        let index = self.cursor;
        let mv = Move::from_token(&step.mv).ok_or_else(|| {
            StrategyFault::IllegalMove(format!("replay step {index}: unknown move {:?}", step.mv))
        })?;
        let (pos, facing) = (step.pos, step.facing);
        self.cursor += 1;
        self.check_sync(pos, facing, pose, index);

        let code = mv.code().unwrap_or("---");
        Ok(Choice::new(
            mv,
            format!("Replay: step {} of {}, {mv} ({code})", index + 1, self.steps.len()),
        ))
    }

    fn check_sync(&mut self, pos: usize, facing: Facing, pose: Pose, index: usize) {
        if pos != pose.position || facing != pose.facing {
            self.desyncs += 1;
            warn!(
                index,
                recorded_pos = pos,
                actual_pos = pose.position,
                recorded_facing = ?facing,
                actual_facing = ?pose.facing,
                "replay out of sync with simulation"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plays_codes_and_names_then_stops() {
        let mut r = Replay::new(vec![
            ReplayStep::new(76, Facing::North, "001"),
            ReplayStep::new(67, Facing::North, "LEFT"),
            ReplayStep::new(66, Facing::West, "100"),
        ]);
        r.on_bootstrap(Pose::new(76, Facing::North));
        assert_eq!(r.cursor(), 1);
        assert_eq!(r.decide(Pose::new(67, Facing::North)).unwrap().mv, Move::Left);
        assert_eq!(r.decide(Pose::new(66, Facing::West)).unwrap().mv, Move::UTurn);
        assert_eq!(r.decide(Pose::new(67, Facing::East)).unwrap().mv, Move::Stop);
        assert_eq!(r.desyncs(), 0);
    }

    #[test]
    fn counts_desyncs() {
        let mut r = Replay::new(vec![ReplayStep::new(10, Facing::East, "011")]);
        r.on_bootstrap(Pose::new(76, Facing::North));
        assert_eq!(r.cursor(), 0);
        assert_eq!(r.decide(Pose::new(11, Facing::East)).unwrap().mv, Move::Right);
        assert_eq!(r.desyncs(), 1);
    }

    #[test]
    fn unknown_token_is_an_illegal_move() {
        let mut r = Replay::new(vec![ReplayStep::new(0, Facing::North, "111")]);
        let err = r.decide(Pose::new(0, Facing::North)).unwrap_err();
        assert!(matches!(err, StrategyFault::IllegalMove(_)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn stream_uses_move_key() {
        let steps: Vec<ReplayStep> =
            serde_json::from_str(r#"[{"pos":3,"facing":"South","move":"001"}]"#).unwrap();
        assert_eq!(steps[0], ReplayStep::new(3, Facing::South, "001"));
    }
}
