//! In-process adapters.

pub mod jitter;
pub mod metrics_store;

pub use jitter::{jitter_source, SeededJitter, UniformJitter};
pub use metrics_store::InMemoryMetricsStore;
