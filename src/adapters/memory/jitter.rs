//! `rand`-backed score jitter sources.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::models::ScoringConfig;
use crate::domain::ports::{NoJitter, RandomSource};

/// Pick the jitter source a scoring configuration asks for.
pub fn jitter_source(config: &ScoringConfig) -> Arc<dyn RandomSource> {
    match (config.jitter_enabled, config.jitter_seed) {
        (false, _) => Arc::new(NoJitter),
        (true, Some(seed)) => Arc::new(SeededJitter::new(seed)),
        (true, None) => Arc::new(UniformJitter),
    }
}

/// `gen_range` panics on an empty or non-finite range.
fn usable_width(half_width: f64) -> bool {
    half_width.is_finite() && half_width > 0.0
}

/// Draws jitter from the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformJitter;

impl RandomSource for UniformJitter {
    fn jitter(&self, half_width: f64) -> f64 {
        if !usable_width(half_width) {
            return 0.0;
        }
        rand::thread_rng().gen_range(-half_width..=half_width)
    }
}

/// Reproducible jitter from a seeded generator.
#[derive(Debug)]
pub struct SeededJitter {
    rng: Mutex<StdRng>,
}

impl SeededJitter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededJitter {
    fn jitter(&self, half_width: f64) -> f64 {
        if !usable_width(half_width) {
            return 0.0;
        }
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen_range(-half_width..=half_width)
    }
}
