//! Domain errors for the Custodes scoring subsystem.

use thiserror::Error;

use super::models::{Complexity, ScoringDimension, TestType};

/// Format an optional identity suffix: ` for guardian`.
fn for_identity(ai_identity: &Option<String>) -> String {
    ai_identity
        .as_deref()
        .map(|ai| format!(" for {ai}"))
        .unwrap_or_default()
}

/// Domain-level errors raised by metrics stores and validation.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Metrics store unavailable: {0}")]
    StoreUnavailable(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

/// Why an adaptive threshold could not be computed from history.
///
/// Public threshold operations never surface these; they log the kind and
/// fall back to the static range minimum.
#[derive(Debug, Error)]
pub enum ThresholdError {
    #[error("No recent {test_type} scores available{}", for_identity(.ai_identity))]
    NoHistoryAvailable {
        test_type: TestType,
        ai_identity: Option<String>,
    },

    #[error("Metrics store unavailable: {0}")]
    MetricsUnavailable(#[from] DomainError),

    #[error("Threshold computation failed for {test_type}/{complexity}: {reason}")]
    ComputationError {
        test_type: TestType,
        complexity: Complexity,
        reason: String,
    },
}

impl ThresholdError {
    /// Short machine-readable kind for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoHistoryAvailable { .. } => "no_history",
            Self::MetricsUnavailable(_) => "metrics_unavailable",
            Self::ComputationError { .. } => "computation_error",
        }
    }
}

/// Failures inside the response scoring pipeline.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Response is empty")]
    EmptyResponse,

    #[error("Component extraction failed: {0}")]
    Extraction(String),

    #[error("Scorer for {dimension} failed: {reason}")]
    Scorer {
        dimension: ScoringDimension,
        reason: String,
    },

    #[error("Non-finite score produced for {0}")]
    NonFiniteScore(String),
}
