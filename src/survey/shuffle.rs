// src/survey/shuffle.rs

use crate::survey::random::RandomSource;

/// Fisher-Yates shuffle into a new vector, swapping from the last index down.
pub fn shuffle<T: Clone>(items: &[T], rng: &mut dyn RandomSource) -> Vec<T> {
    let mut shuffled = items.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.below(i + 1);
        shuffled.swap(i, j);
    }
    shuffled
}
