use super::Choice;
use crate::pose::{Move, SensorReading};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PledgeMode {
    Straight,
    WallFollow,
}

/// Pledge: head straight until blocked, then follow the left wall while
/// summing turns, and let go of the wall once the turn sum is back to zero.
#[derive(Debug, Clone)]
pub struct Pledge {
    /// Net rotation in degrees, folded into (-180, 180].
    angle: i32,
    mode: PledgeMode,
}

impl Default for Pledge {
    fn default() -> Self {
        Self::new()
    }
}

impl Pledge {
    pub fn new() -> Self {
        Self {
            angle: 0,
            mode: PledgeMode::Straight,
        }
    }

    pub fn angle(&self) -> i32 {
        self.angle
    }

    pub fn mode(&self) -> PledgeMode {
        self.mode
    }

    pub fn decide(&mut self, sensors: SensorReading) -> Choice {
        if self.mode == PledgeMode::Straight && self.angle == 0 {
            if !sensors.front {
                return Choice::new(Move::Forward, "Pledge: straight ahead");
            }
            self.mode = PledgeMode::WallFollow;
            self.turn(90);
            return Choice::new(
                Move::Right,
                format!("Pledge: blocked, following wall (angle {})", self.angle),
            );
        }

        let (mv, delta) = if !sensors.left {
            (Move::Left, -90)
        } else if !sensors.front {
            (Move::Forward, 0)
        } else if !sensors.right {
            (Move::Right, 90)
        } else {
            (Move::UTurn, 180)
        };
        self.turn(delta);
        let mut explanation = format!("Pledge: wall-follow {mv} (angle {})", self.angle);
        if self.angle == 0 {
            self.mode = PledgeMode::Straight;
            explanation.push_str(", back to straight");
        }
        Choice::new(mv, explanation)
    }

    fn turn(&mut self, delta: i32) {
        let mut a = self.angle + delta;
        while a > 180 {
            a -= 360;
        }
        while a <= -180 {
            a += 360;
        }
        self.angle = a;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(left: bool, front: bool, right: bool) -> SensorReading {
        SensorReading { left, front, right }
    }

    #[test]
    fn goes_straight_until_blocked() {
        let mut p = Pledge::new();
        assert_eq!(p.decide(reading(false, false, false)).mv, Move::Forward);
        assert_eq!(p.mode(), PledgeMode::Straight);

        assert_eq!(p.decide(reading(true, true, false)).mv, Move::Right);
        assert_eq!(p.mode(), PledgeMode::WallFollow);
        assert_eq!(p.angle(), 90);
    }

    #[test]
    fn releases_wall_when_angle_returns_to_zero() {
        let mut p = Pledge::new();
        p.decide(reading(true, true, false));
        let c = p.decide(reading(true, false, true));
        assert_eq!(c.mv, Move::Forward);
        assert_eq!(p.angle(), 90);

        let c = p.decide(reading(false, true, true));
        assert_eq!(c.mv, Move::Left);
        assert_eq!(p.angle(), 0);
        assert_eq!(p.mode(), PledgeMode::Straight);
    }

    #[test]
    fn angle_stays_folded() {
        let mut p = Pledge::new();
        p.decide(reading(true, true, false));
        for _ in 0..5 {
            p.decide(reading(true, true, true));
            assert!(p.angle() > -180 && p.angle() <= 180);
        }
    }
}
