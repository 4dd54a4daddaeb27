//! Randomness for production outcomes (reward rolls, soldier generation).
//!
//! The stepper only sees the [`RandomSource`] trait so callers can inject
//! any generator. [`SimRng`] is the default: SplitMix64, 8 bytes of state,
//! trivially serializable for saves.

/// A uniform integer generator.
pub trait RandomSource {
    /// Uniform integer in `[min, max]` (both inclusive). Returns `min` when
    /// the range is empty or a single value.
    fn generate(&mut self, min: i64, max: i64) -> i64;
}

/// SplitMix64 pseudo-random number generator.
///
/// Deterministic across platforms, so replays of the same save produce the
/// same rewards and the same recruits.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    /// Create a new RNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Get the internal state (for hashing/serialization).
    pub fn state(&self) -> u64 {
        self.state
    }
}

impl RandomSource for SimRng {
    fn generate(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = (max as i128 - min as i128 + 1) as u128;
        let offset = (self.next_u64() as u128 % span) as i128;
        (min as i128 + offset) as i64
    }
}

/// Pick an index from `weights` with probability proportional to its weight.
///
/// Zero weights are never picked. Returns `None` when every weight is zero.
pub fn pick_weighted(rng: &mut dyn RandomSource, weights: &[u32]) -> Option<usize> {
    let total: u64 = weights.iter().map(|&w| w as u64).sum();
    if total == 0 {
        return None;
    }
    let roll = rng.generate(1, total as i64) as u64;
    let mut running = 0u64;
    weights.iter().position(|&w| {
        running += w as u64;
        w > 0 && running >= roll
    })
}
