//! Cosmetic variance for the ops counter.
//!
//! Each activated node adds `ops_cost + jitter` to the run's total, where
//! jitter is `⌊u · max(1, 0.3 · ops_cost)⌋` for a uniform `u ∈ [0, 1)` drawn from
//! a [`JitterSource`]. The value carries no meaning beyond making the counter
//! look less mechanical, so the generator only has to be bounded and cheap.

/// Fraction of a node's op cost that jitter may add.
pub const JITTER_FRACTION: f64 = 0.3;

/// Supplier of uniform values in `[0, 1)`.
pub trait JitterSource {
    /// Returns the next value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Draws the jitter added on top of `ops_cost`.
    ///
    /// Always `< max(1, 0.3 · ops_cost)`.
    fn ops_jitter(&mut self, ops_cost: u64) -> u64 {
        let span = (ops_cost as f64 * JITTER_FRACTION).max(1.0);
        let unit = self.next_unit().clamp(0.0, 1.0 - f64::EPSILON);
        // Truncation is floor for non-negative values.
        (unit * span) as u64
    }
}

/// 32-bit linear congruential generator.
///
/// Uses the Numerical Recipes constants (`a = 1664525`, `c = 1013904223`) and
/// keeps the upper 16 bits of each step, which are the least correlated.
#[derive(Clone, Debug)]
pub struct LcgJitter {
    state: u32,
}

impl LcgJitter {
    /// Seed used by [`Default`].
    pub const DEFAULT_SEED: u32 = 0x1234_5678;

    /// Creates a generator from a seed. Equal seeds give equal sequences.
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }
}

impl Default for LcgJitter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEED)
    }
}

impl JitterSource for LcgJitter {
    #[inline]
    fn next_unit(&mut self) -> f64 {
        self.state = self
            .state
            .wrapping_mul(1_664_525)
            .wrapping_add(1_013_904_223);
        let upper = (self.state >> 16) as u16;
        f64::from(upper) / 65_536.0
    }
}

/// Always returns zero: totals equal the plain sum of op costs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn next_unit(&mut self) -> f64 {
        0.0
    }
}
