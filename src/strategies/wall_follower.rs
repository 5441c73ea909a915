use super::Choice;
use crate::pose::{Move, SensorReading};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which side the follower keeps in contact with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Hand {
    Left,
    Right,
    /// Straight ahead first, then right, then left.
    Forward,
}

impl Hand {
    pub fn priority(self) -> [Move; 3] {
        match self {
            Hand::Left => [Move::Left, Move::Forward, Move::Right],
            Hand::Right => [Move::Right, Move::Forward, Move::Left],
            Hand::Forward => [Move::Forward, Move::Right, Move::Left],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Hand::Left => "Left-hand",
            Hand::Right => "Right-hand",
            Hand::Forward => "Forward-first",
        }
    }
}

/// Reflexive follower: no memory beyond the bootstrap flag kept by
/// [`super::Strategy`].
#[derive(Debug, Clone)]
pub struct WallFollower {
    hand: Hand,
}

impl WallFollower {
    pub fn new(hand: Hand) -> Self {
        Self { hand }
    }

    pub fn hand(&self) -> Hand {
        self.hand
    }

    pub fn choose(&self, sensors: SensorReading) -> Choice {
        let label = self.hand.label();
        match self.hand.priority().into_iter().find(|mv| sensors.is_open(*mv)) {
            Some(mv) => Choice::new(mv, format!("{label}: {} is open", describe(mv))),
            None => Choice::new(Move::UTurn, format!("{label}: dead end, turning around")),
        }
    }
}

fn describe(mv: Move) -> &'static str {
    match mv {
        Move::Left => "left",
        Move::Right => "right",
        _ => "front",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(left: bool, front: bool, right: bool) -> SensorReading {
        SensorReading { left, front, right }
    }

    #[test]
    fn hands_apply_their_priority() {
        let all_open = reading(false, false, false);
        assert_eq!(WallFollower::new(Hand::Left).choose(all_open).mv, Move::Left);
        assert_eq!(WallFollower::new(Hand::Right).choose(all_open).mv, Move::Right);
        assert_eq!(WallFollower::new(Hand::Forward).choose(all_open).mv, Move::Forward);

        let only_right = reading(true, true, false);
        assert_eq!(WallFollower::new(Hand::Left).choose(only_right).mv, Move::Right);
        let only_left = reading(false, true, true);
        assert_eq!(WallFollower::new(Hand::Forward).choose(only_left).mv, Move::Left);
    }

    #[test]
    fn enclosed_on_three_sides_turns_around() {
        let c = WallFollower::new(Hand::Right).choose(reading(true, true, true));
        assert_eq!(c.mv, Move::UTurn);
        assert!(c.explanation.starts_with("Right-hand"));
    }
}
