//! Custodes - adaptive test thresholds and response scoring for AI agents
//!
//! Custodes decides whether an AI agent passed a test. Pass marks move with
//! the recent performance of every agent and of the agent under test, and
//! free-text responses are scored across seven quality dimensions.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, errors and port traits
//! - **Service Layer** (`services`): threshold adaptation and the scoring pipeline
//! - **Adapters** (`adapters`): in-memory and SQLite metrics stores, jitter sources
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use custodes::adapters::memory::InMemoryMetricsStore;
//! use custodes::domain::models::{Complexity, TestType};
//! use custodes::services::AdaptiveThresholdService;
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = AdaptiveThresholdService::new(Arc::new(InMemoryMetricsStore::new()));
//!     let threshold = service
//!         .get_adaptive_threshold(TestType::CodeQuality, Complexity::Advanced, None)
//!         .await;
//!     assert_eq!(threshold, 60);
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult, ScoringError, ThresholdError};
pub use domain::models::{
    AgentMetrics, Complexity, Config, EvaluationResult, ScoringConfig, ScoringDimension,
    TestRecord, TestType, ThresholdConfig,
};
pub use domain::ports::{AgentMetricsStore, DimensionScorer, RandomSource};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{AdaptiveThresholdService, IntelligentScoringSystem, ScoringAnalytics};
