//! The single seeded random stream of a run.
//!
//! Every weighted choice, percentage roll and `random` option value draws
//! from one [`RollRng`]. The number and order of draws is part of the
//! reproducibility contract, so callers never create side streams.

use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Number of decimal digits in a seed name.
pub const SEED_DIGITS: u32 = 20;

/// Seeded random stream shared by every participant of a run.
#[derive(Debug, Clone)]
pub struct RollRng {
    inner: ChaCha8Rng,
}

impl RollRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Time/entropy based stream, used for race runs.
    pub fn from_entropy() -> Self {
        Self {
            inner: ChaCha8Rng::from_entropy(),
        }
    }

    /// Fresh seed for runs that were not given one.
    pub fn random_seed() -> u64 {
        rand::thread_rng().gen()
    }

    /// Uniform index into a collection of `len` items. One draw.
    pub fn pick_index(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len)
    }

    /// Index chosen proportionally to `weights`. One draw.
    ///
    /// Returns `None` when every weight is zero.
    pub fn pick_weighted(&mut self, weights: &[u64]) -> Option<usize> {
        let dist = WeightedIndex::new(weights).ok()?;
        Some(dist.sample(&mut self.inner))
    }

    /// True with probability `percentage / 100`. One draw.
    pub fn roll_percentage(&mut self, percentage: f64) -> bool {
        self.inner.gen::<f64>() < percentage / 100.0
    }

    /// Zero-padded decimal run name. One draw.
    pub fn seed_name(&mut self) -> String {
        let bound = 10u128.pow(SEED_DIGITS);
        let value = self.inner.gen_range(0..bound);
        format!("{:0width$}", value, width = SEED_DIGITS as usize)
    }
}

impl RngCore for RollRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}
