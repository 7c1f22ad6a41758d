//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces the services depend on:
//! - AgentMetricsStore: per-agent test history and levels
//! - DimensionScorer: one quality dimension of a response
//! - RandomSource: jitter applied to final scores
//!
//! These traits keep the scoring logic independent of storage backends and
//! of any particular scoring heuristic.

pub mod dimension_scorer;
pub mod metrics_store;
pub mod random_source;

pub use dimension_scorer::DimensionScorer;
pub use metrics_store::AgentMetricsStore;
pub use random_source::{NoJitter, RandomSource};
