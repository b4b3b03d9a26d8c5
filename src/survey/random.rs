// src/survey/random.rs

use std::collections::VecDeque;

use rand::Rng;

use crate::models::response::CodeVersion;

/// Source of uniform randomness for shuffling, code-version draws and
/// session ids. Tests inject [`ScriptedRandom`].
pub trait RandomSource {
    /// Uniform value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform index in `0..bound`. `bound` must be non-zero.
    fn below(&mut self, bound: usize) -> usize {
        let idx = (self.next_unit() * bound as f64) as usize;
        idx.min(bound.saturating_sub(1))
    }

    /// Fair coin between the two snippet variants.
    fn code_version(&mut self) -> CodeVersion {
        if self.next_unit() < 0.5 {
            CodeVersion::Clean
        } else {
            CodeVersion::Messy
        }
    }
}

/// Thread-local RNG from `rand`, unseeded.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&mut self) -> f64 {
        rand::rng().random::<f64>()
    }

    fn below(&mut self, bound: usize) -> usize {
        rand::rng().random_range(0..bound)
    }
}

/// Replays a fixed list of unit values, then repeats the last one
/// (or `0.0` if the list was empty).
#[derive(Debug, Default, Clone)]
pub struct ScriptedRandom {
    values: VecDeque<f64>,
    last: f64,
}

impl ScriptedRandom {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: values.into_iter().collect(),
            last: 0.0,
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        if let Some(v) = self.values.pop_front() {
            self.last = v;
        }
        self.last
    }
}

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `{millis}-{9 base-36 chars}`.
pub fn session_id(start_ms: i64, rng: &mut dyn RandomSource) -> String {
    let suffix: String = (0..9)
        .map(|_| ID_ALPHABET[rng.below(ID_ALPHABET.len())] as char)
        .collect();
    format!("{start_ms}-{suffix}")
}
