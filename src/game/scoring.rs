//! Scoring policies: points and bonus seconds per word length

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Maps an accepted word's length to its reward.
pub trait ScoringPolicy: Send + Sync {
    /// Points awarded for a word of `length` letters.
    fn points_for(&self, length: usize) -> u32;

    /// Seconds added to the clock for a word of `length` letters.
    fn time_bonus_for(&self, length: usize) -> u32;
}

/// Fibonacci-like table: 2→1, 3→2, 4→3, 5→5 … 10→55.
const FIBONACCI_POINTS: [(usize, u32); 9] = [
    (2, 1),
    (3, 2),
    (4, 3),
    (5, 5),
    (6, 8),
    (7, 13),
    (8, 21),
    (9, 34),
    (10, 55),
];

/// Shorter table used by the classic rules, 3→2 … 8→21.
const CLASSIC_POINTS: [(usize, u32); 6] = [(3, 2), (4, 3), (5, 5), (6, 8), (7, 13), (8, 21)];

/// Points fallback for lengths missing from the classic table.
const CLASSIC_DEFAULT_POINTS: u32 = 2;

/// Minimum bonus under the classic rules.
const CLASSIC_MIN_BONUS: u32 = 2;

fn lookup(table: &[(usize, u32)], length: usize) -> Option<u32> {
    table
        .iter()
        .find(|(len, _)| *len == length)
        .map(|(_, points)| *points)
}

/// Default policy. Unmapped lengths score 0 and the bonus equals the points.
#[derive(Debug, Clone, Copy, Default)]
pub struct FibonacciScoring;

impl ScoringPolicy for FibonacciScoring {
    fn points_for(&self, length: usize) -> u32 {
        lookup(&FIBONACCI_POINTS, length).unwrap_or(0)
    }

    fn time_bonus_for(&self, length: usize) -> u32 {
        self.points_for(length)
    }
}

/// Classic policy. Unmapped lengths score 2; bonus is `max(2, length / 2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicScoring;

impl ScoringPolicy for ClassicScoring {
    fn points_for(&self, length: usize) -> u32 {
        lookup(&CLASSIC_POINTS, length).unwrap_or(CLASSIC_DEFAULT_POINTS)
    }

    fn time_bonus_for(&self, length: usize) -> u32 {
        let half = u32::try_from(length / 2).unwrap_or(u32::MAX);
        half.max(CLASSIC_MIN_BONUS)
    }
}

/// Config-facing selector for the built-in policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringKind {
    #[default]
    Fibonacci,
    Classic,
}

impl ScoringKind {
    pub fn policy(self) -> Arc<dyn ScoringPolicy> {
        match self {
            ScoringKind::Fibonacci => Arc::new(FibonacciScoring),
            ScoringKind::Classic => Arc::new(ClassicScoring),
        }
    }
}
