//! Source of score jitter.
//!
//! Final scores carry a small uniform jitter so identical responses do not
//! always land on identical scores. Injecting the source keeps that
//! behaviour out of tests.

/// Uniform noise generator.
pub trait RandomSource: Send + Sync {
    /// A value drawn uniformly from `[-half_width, half_width]`.
    ///
    /// Implementations return `0.0` for a non-positive `half_width`.
    fn jitter(&self, half_width: f64) -> f64;
}

/// A source that never perturbs scores.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl RandomSource for NoJitter {
    fn jitter(&self, _half_width: f64) -> f64 {
        0.0
    }
}
