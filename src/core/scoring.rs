use crate::maze::Maze;

/// `max_score * (found / total) * min(min_steps / steps, 1)`, clamped to
/// `[0, max_score]`. Zero steps score zero. A maze without dead ends counts
/// as fully explored.
pub fn compute(
    max_score: f64,
    dead_ends_found: usize,
    total_dead_ends: usize,
    min_steps: u32,
    steps_taken: u32,
) -> f64 {
    if steps_taken == 0 || max_score.is_nan() || max_score <= 0.0 {
        return 0.0;
    }
    let exploration = if total_dead_ends == 0 {
        1.0
    } else {
        (dead_ends_found as f64 / total_dead_ends as f64).min(1.0)
    };
    let efficiency = (min_steps as f64 / steps_taken as f64).min(1.0);
    (max_score * exploration * efficiency).clamp(0.0, max_score)
}

pub fn for_maze(maze: &Maze, steps_taken: u32, dead_ends_found: usize) -> f64 {
    compute(
        maze.max_score(),
        dead_ends_found,
        maze.total_dead_ends(),
        maze.min_steps(),
        steps_taken,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_steps_scores_zero() {
        assert_eq!(compute(20.0, 9, 9, 112, 0), 0.0);
    }

    #[test]
    fn nan_max_score_scores_zero() {
        assert_eq!(compute(f64::NAN, 3, 3, 10, 10), 0.0);
    }

    #[test]
    fn perfect_run_hits_max_score() {
        assert_eq!(compute(20.0, 9, 9, 112, 112), 20.0);
        assert_eq!(compute(20.0, 9, 9, 112, 50), 20.0);
    }

    #[test]
    fn score_is_monotone() {
        let mut prev = f64::INFINITY;
        for steps in 1..400 {
            let s = compute(20.0, 5, 9, 112, steps);
            assert!(s <= prev);
            assert!(s <= 20.0);
            prev = s;
        }
        let mut prev = -1.0;
        for found in 0..=9 {
            let s = compute(20.0, found, 9, 112, 150);
            assert!(s >= prev);
            prev = s;
        }
    }

    #[test]
    fn partial_exploration_scales_linearly() {
        let s = compute(20.0, 3, 9, 112, 224);
        assert!((s - 20.0 * (3.0 / 9.0) * 0.5).abs() < 1e-9);
        assert_eq!(compute(10.0, 0, 0, 10, 20), 5.0);
    }
}
