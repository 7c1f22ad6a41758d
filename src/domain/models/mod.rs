//! Domain models for the scoring subsystem.

pub mod config;
pub mod scoring;
pub mod test_record;
pub mod threshold;

pub use config::{Config, DatabaseConfig, LoggingConfig, ScoringConfig, ThresholdConfig};
pub use scoring::{
    Assessment, DimensionScores, EvaluationMode, EvaluationResult, Feedback, ResponseComponents,
    ScoringDimension, ScoringWeights, WeightIssue,
};
pub use test_record::{AgentMetrics, Complexity, TestRecord, TestType, AGENT_HISTORY_LIMIT};
pub use threshold::{RangeOverride, ThresholdRange, ThresholdTable, RANGE_CEILING, RANGE_FLOOR};
