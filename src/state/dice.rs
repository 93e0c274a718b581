//! Dice sources.
//!
//! A session draws every die value from a `Dice` implementation. Production
//! sessions use `RandomDice`; `ScriptedDice` replays a fixed sequence.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default number of faces on the die.
pub const DEFAULT_DIE_FACES: u8 = 6;

/// Source of die values.
///
/// Implementations must return a value in `1..=faces`.
pub trait Dice: Send + fmt::Debug {
    fn roll(&mut self, faces: u8) -> u8;
}

/// Uniformly random die.
pub struct RandomDice {
    rng: StdRng,
}

impl RandomDice {
    /// Create a new die.
    ///
    /// `Some(seed)` gives a reproducible sequence, `None` seeds from the OS.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }
}

impl Default for RandomDice {
    fn default() -> Self {
        Self::new(None)
    }
}

impl fmt::Debug for RandomDice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomDice").finish_non_exhaustive()
    }
}

impl Dice for RandomDice {
    fn roll(&mut self, faces: u8) -> u8 {
        self.rng.random_range(1..=faces.max(1))
    }
}

/// Die that replays a fixed sequence, cycling when exhausted.
///
/// Values outside `1..=faces` are clamped. An empty script always rolls 1.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    values: Vec<u8>,
    cursor: usize,
}

impl ScriptedDice {
    pub fn new(values: impl Into<Vec<u8>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// Number of values rolled so far.
    pub fn rolled(&self) -> usize {
        self.cursor
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self, faces: u8) -> u8 {
        let faces = faces.max(1);
        if self.values.is_empty() {
            return 1;
        }

        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(1, faces)
    }
}
