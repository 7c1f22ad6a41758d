use async_trait::async_trait;

use crate::domain::errors::ScoringError;
use crate::domain::models::{Complexity, ResponseComponents, ScoringDimension};

/// Produces one dimension score from the components of a response
///
/// The heuristic scorers in [`crate::services::heuristic_scorers`] implement
/// this with keyword counts; model-backed scorers can replace any of them
/// without touching the weighting and pass/fail logic.
#[async_trait]
pub trait DimensionScorer: Send + Sync {
    /// The dimension this scorer is responsible for
    fn dimension(&self) -> ScoringDimension;

    /// Score the response components
    ///
    /// # Returns
    ///
    /// * `Ok(f64)` - Score in `[0, 1]`
    /// * `Err` - If the scorer could not evaluate the response
    async fn score(
        &self,
        components: &ResponseComponents,
        difficulty: Complexity,
    ) -> Result<f64, ScoringError>;
}
