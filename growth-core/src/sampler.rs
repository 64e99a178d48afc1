//! Sources of randomness consumed by the growth engine.
//!
//! The engine never touches a generator directly. Food increments, split
//! plane rotation and randomized parameter sets all go through
//! [`UniformSampler`], so a run can be made deterministic by swapping in a
//! seeded [`RngSampler`] or a [`FixedSampler`].

use rand::Rng;

/// Uniform random source.
pub trait UniformSampler {
    /// Sample from `[lo, hi)`. Returns `lo` when the range is empty.
    fn uniform(&mut self, lo: f32, hi: f32) -> f32;

    /// Sample an index from `0..n`. Returns `0` when `n == 0`.
    fn below(&mut self, n: usize) -> usize;
}

/// Adapts any [`rand::Rng`] into a [`UniformSampler`].
#[derive(Debug, Clone)]
pub struct RngSampler<R> {
    rng: R,
}

impl<R: Rng> RngSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<R: Rng> UniformSampler for RngSampler<R> {
    fn uniform(&mut self, lo: f32, hi: f32) -> f32 {
        if hi > lo {
            self.rng.random_range(lo..hi)
        } else {
            lo
        }
    }

    fn below(&mut self, n: usize) -> usize {
        if n == 0 { 0 } else { self.rng.random_range(0..n) }
    }
}

/// Sampler that always returns the same value.
///
/// `uniform` ignores its range and yields `value`; `below` always yields
/// `0`. Useful for reproducible growth where every cell gains a fixed
/// amount of food per step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSampler {
    pub value: f32,
}

impl FixedSampler {
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

impl UniformSampler for FixedSampler {
    fn uniform(&mut self, _lo: f32, _hi: f32) -> f32 {
        self.value
    }

    fn below(&mut self, _n: usize) -> usize {
        0
    }
}
