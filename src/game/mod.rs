#![allow(dead_code)]
//! Game rules: letter generation, scoring, word validation

pub mod dictionary;
pub mod scoring;
pub mod validation;

use rand::prelude::*;

pub const VOWELS: [char; 5] = ['A', 'E', 'I', 'O', 'U'];

pub const CONSONANTS: [char; 21] = [
    'B', 'C', 'D', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'V', 'W',
    'X', 'Y', 'Z',
];

/// Floor on the number of vowels in any generated batch.
const MIN_VOWELS: usize = 2;

/// Share of a batch reserved for vowels (rounded down, never below `MIN_VOWELS`).
const VOWEL_RATIO: f64 = 0.3;

/// Number of vowels drawn for a batch of `count` letters.
///
/// Capped at `count` so tiny batches stay the requested size.
pub fn vowel_quota(count: usize) -> usize {
    let share = (count as f64 * VOWEL_RATIO).floor() as usize;
    share.max(MIN_VOWELS).min(count)
}

/// Generate `count` letters from `rng`.
///
/// Vowels and consonants are drawn uniformly from their sets, then the
/// whole batch is shuffled. Letter frequency is deliberately unweighted.
pub fn generate_letters_with_rng<R: Rng>(count: usize, rng: &mut R) -> Vec<char> {
    let vowels = vowel_quota(count);

    let mut letters: Vec<char> = Vec::with_capacity(count);
    for _ in 0..vowels {
        letters.push(VOWELS[rng.random_range(0..VOWELS.len())]);
    }
    for _ in vowels..count {
        letters.push(CONSONANTS[rng.random_range(0..CONSONANTS.len())]);
    }

    letters.shuffle(rng);
    letters
}
