use super::Choice;
use crate::pose::{Move, SensorReading};
use crate::prng::Prng;

/// Picks uniformly among the open sides; turns around when boxed in.
#[derive(Debug, Clone)]
pub struct RandomMouse {
    rng: Prng,
}

impl RandomMouse {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Prng::new(seed),
        }
    }

    pub fn choose(&mut self, sensors: SensorReading) -> Choice {
        let open: Vec<Move> = [Move::Left, Move::Forward, Move::Right]
            .into_iter()
            .filter(|mv| sensors.is_open(*mv))
            .collect();
        match self.rng.choose(&open) {
            Some(&mv) => Choice::new(mv, format!("Random mouse: picked {mv} of {} open", open.len())),
            None => Choice::new(Move::UTurn, "Random mouse: dead end, turning around"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_open_sides_are_chosen() {
        let mut m = RandomMouse::new(11);
        let s = SensorReading {
            left: true,
            front: false,
            right: false,
        };
        for _ in 0..100 {
            let mv = m.choose(s).mv;
            assert!(mv == Move::Forward || mv == Move::Right);
        }
        let boxed = SensorReading {
            left: true,
            front: true,
            right: true,
        };
        assert_eq!(m.choose(boxed).mv, Move::UTurn);
    }

    #[test]
    fn seed_makes_runs_reproducible() {
        let s = SensorReading::default();
        let mut a = RandomMouse::new(3);
        let mut b = RandomMouse::new(3);
        for _ in 0..50 {
            assert_eq!(a.choose(s).mv, b.choose(s).mv);
        }
    }
}
