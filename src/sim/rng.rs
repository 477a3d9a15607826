//! Deterministic level RNG and 1D gradient noise
//!
//! Terrain must be bit-reproducible from a level's seed, so the generator is
//! a plain 32-bit LCG with a fixed output mapping rather than a library PRNG
//! whose stream could change between crate versions.

use std::collections::HashMap;

use rand::rand_core::impls;
use rand::{RngCore, SeedableRng};

/// LCG multiplier (Numerical Recipes)
const LCG_MUL: u32 = 1664525;
/// LCG increment
const LCG_INC: u32 = 1013904223;

/// Linear-congruential generator seeded per level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelRng {
    state: u32,
}

impl LevelRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Next value in [0, 1]: the new state divided by 2^32 - 1
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / u32::MAX as f64
    }
}

impl RngCore for LevelRng {
    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(LCG_MUL).wrapping_add(LCG_INC);
        self.state
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }
}

impl SeedableRng for LevelRng {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}

/// One-dimensional gradient noise with a lazily filled lattice.
///
/// Each integer lattice point gets a gradient in [-1, 1] drawn from the RNG
/// the first time it is needed. The cache belongs to one generator instance,
/// so every terrain generation starts from an empty lattice.
#[derive(Debug, Default)]
pub struct GradientNoise {
    gradients: HashMap<i64, f64>,
}

impl GradientNoise {
    pub fn new() -> Self {
        Self::default()
    }

    fn gradient(&mut self, xi: i64, rng: &mut LevelRng) -> f64 {
        *self
            .gradients
            .entry(xi)
            .or_insert_with(|| rng.next_f64() * 2.0 - 1.0)
    }

    /// Sample the noise at `x`
    pub fn sample(&mut self, x: f64, rng: &mut LevelRng) -> f64 {
        let x0 = x.floor();
        let x1 = x0 + 1.0;
        let t = x - x0;

        let g0 = self.gradient(x0 as i64, rng);
        let g1 = self.gradient(x1 as i64, rng);
        let v0 = g0 * (x - x0);
        let v1 = g1 * (x - x1);

        let w = t * t * (3.0 - 2.0 * t);
        v0 * (1.0 - w) + v1 * w
    }
}
