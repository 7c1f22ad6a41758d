//! Multi-dimensional scoring of free-text AI responses.
//!
//! A response is split into components, scored on each
//! [`ScoringDimension`] by a pluggable [`DimensionScorer`], boosted by the
//! responding AI's bonuses and combined with the difficulty tier's weights.
//! Pass/fail uses the shared [`ThresholdPolicy`] on the unit scale.
//!
//! Evaluation never fails from the caller's point of view: any pipeline
//! error produces a length/difficulty estimate marked
//! [`EvaluationMode::Fallback`].

use chrono::Utc;
use futures::future::join_all;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::errors::ScoringError;
use crate::domain::models::{
    Assessment, Complexity, DimensionScores, EvaluationMode, EvaluationResult, Feedback,
    ResponseComponents, ScoringConfig, ScoringDimension, ScoringWeights,
};
use crate::domain::ports::{DimensionScorer, RandomSource};
use crate::services::component_extractor::extract_components;
use crate::services::heuristic_scorers::default_scorers;
use crate::services::scoring_history::{ScoringAnalytics, ScoringHistory, ScoringHistoryEntry};
use crate::services::statistics::mean;
use crate::services::threshold_policy::ThresholdPolicy;

/// Base threshold for a tier missing from the configured table.
pub const DEFAULT_BASE_THRESHOLD: f64 = 0.7;

/// Scores AI responses and keeps a bounded history of the outcomes.
pub struct IntelligentScoringSystem {
    scorers: Vec<Arc<dyn DimensionScorer>>,
    weights: ScoringWeights,
    ai_bonuses: HashMap<String, BTreeMap<ScoringDimension, f64>>,
    base_thresholds: BTreeMap<Complexity, f64>,
    policy: ThresholdPolicy,
    jitter: f64,
    fallback_jitter: f64,
    random: Arc<dyn RandomSource>,
    history: ScoringHistory,
}

impl IntelligentScoringSystem {
    /// Create a scoring system with the heuristic scorers
    pub fn new(config: &ScoringConfig, random: Arc<dyn RandomSource>) -> Self {
        Self {
            scorers: default_scorers(),
            weights: config.weights.clone(),
            ai_bonuses: config
                .ai_bonuses
                .iter()
                .map(|(ai, bonuses)| (ai.to_lowercase(), bonuses.clone()))
                .collect(),
            base_thresholds: config.base_thresholds.clone(),
            policy: ThresholdPolicy::unit(config),
            jitter: config.jitter,
            fallback_jitter: config.fallback_jitter,
            random,
            history: ScoringHistory::new(config.history_capacity),
        }
    }

    /// Replace the scorer for `scorer.dimension()`, or add one for a
    /// dimension that had none.
    pub fn with_scorer(mut self, scorer: Arc<dyn DimensionScorer>) -> Self {
        let dimension = scorer.dimension();
        self.scorers.retain(|s| s.dimension() != dimension);
        self.scorers.push(scorer);
        self
    }

    /// Pass threshold for a difficulty and responding AI, in `[0, 1]`.
    pub fn threshold_for(&self, difficulty: Complexity, ai_identity: &str) -> f64 {
        let base = self
            .base_thresholds
            .get(&difficulty)
            .copied()
            .unwrap_or(DEFAULT_BASE_THRESHOLD);
        self.policy
            .clamp(base + self.policy.identity_offset(Some(ai_identity)))
    }

    /// Evaluate a response. Never fails; see [`EvaluationMode::Fallback`].
    #[instrument(skip(self, response), fields(response_len = response.len()))]
    pub async fn evaluate_ai_response(
        &self,
        response: &str,
        difficulty: Complexity,
        ai_identity: &str,
    ) -> EvaluationResult {
        match self.try_evaluate(response, difficulty, ai_identity).await {
            Ok(result) => {
                tracing::info!(
                    ai_identity,
                    difficulty = %difficulty,
                    score = result.final_score,
                    threshold = result.threshold,
                    passed = result.passed,
                    "Evaluation completed"
                );
                result
            }
            Err(err) => {
                tracing::warn!(
                    ai_identity,
                    difficulty = %difficulty,
                    error = %err,
                    "Evaluation failed; using fallback estimate"
                );
                self.fallback_evaluation(response, difficulty, ai_identity, &err)
            }
        }
    }

    /// Run the full pipeline, surfacing the first error.
    ///
    /// Successful evaluations are appended to the history.
    pub async fn try_evaluate(
        &self,
        response: &str,
        difficulty: Complexity,
        ai_identity: &str,
    ) -> Result<EvaluationResult, ScoringError> {
        if response.trim().is_empty() {
            return Err(ScoringError::EmptyResponse);
        }

        let components = extract_components(response)?;
        let dimension_scores = self.score_dimensions(&components, difficulty).await?;
        let adjusted_scores = self.apply_ai_bonuses(&dimension_scores, ai_identity);

        let weighted = self.weighted_score(&adjusted_scores, difficulty)?;
        let final_score = (weighted + self.random.jitter(self.jitter)).clamp(0.0, 1.0);

        let threshold = self.threshold_for(difficulty, ai_identity);
        let feedback = generate_feedback(&dimension_scores, final_score);
        let evaluated_at = Utc::now();

        self.history
            .push(ScoringHistoryEntry {
                ai_identity: ai_identity.to_string(),
                final_score,
                dimension_scores: dimension_scores.clone(),
                difficulty,
                timestamp: evaluated_at,
            })
            .await;

        Ok(EvaluationResult {
            id: Uuid::new_v4(),
            final_score,
            passed: final_score >= threshold,
            threshold,
            dimension_scores,
            adjusted_scores,
            feedback,
            difficulty,
            ai_identity: ai_identity.to_string(),
            evaluated_at,
            mode: EvaluationMode::Full,
            fallback_reason: None,
        })
    }

    /// Aggregate statistics over the retained history.
    pub async fn get_scoring_analytics(&self) -> Option<ScoringAnalytics> {
        self.history.analytics().await
    }

    async fn score_dimensions(
        &self,
        components: &ResponseComponents,
        difficulty: Complexity,
    ) -> Result<DimensionScores, ScoringError> {
        let results = join_all(self.scorers.iter().map(|scorer| async move {
            (scorer.dimension(), scorer.score(components, difficulty).await)
        }))
        .await;

        let mut scores = DimensionScores::new();
        for (dimension, result) in results {
            let score = result?;
            if !score.is_finite() {
                return Err(ScoringError::NonFiniteScore(dimension.to_string()));
            }
            scores.insert(dimension, score.clamp(0.0, 1.0));
        }
        Ok(scores)
    }

    fn apply_ai_bonuses(&self, scores: &DimensionScores, ai_identity: &str) -> DimensionScores {
        let mut adjusted = scores.clone();
        if let Some(bonuses) = self.ai_bonuses.get(&ai_identity.to_lowercase()) {
            for (dimension, bonus) in bonuses {
                if let Some(score) = adjusted.get_mut(dimension) {
                    *score = (*score + bonus).min(1.0);
                }
            }
        }
        adjusted
    }

    /// Weighted mean over the tier's dimensions, or a plain mean when the
    /// tier has no usable weights.
    fn weighted_score(
        &self,
        scores: &DimensionScores,
        difficulty: Complexity,
    ) -> Result<f64, ScoringError> {
        let (weighted, total_weight) = self
            .weights
            .for_tier(difficulty)
            .map(|weights| {
                scores
                    .iter()
                    .filter_map(|(dimension, score)| weights.get(dimension).map(|w| (score, w)))
                    .fold((0.0, 0.0), |(sum, total), (score, weight)| {
                        (sum + score * weight, total + weight)
                    })
            })
            .unwrap_or((0.0, 0.0));

        if total_weight > 0.0 {
            return Ok(weighted / total_weight);
        }
        let values: Vec<f64> = scores.values().copied().collect();
        mean(&values).ok_or_else(|| ScoringError::Scorer {
            dimension: ScoringDimension::CodeQuality,
            reason: "no dimension scores to combine".to_string(),
        })
    }

    fn fallback_evaluation(
        &self,
        response: &str,
        difficulty: Complexity,
        ai_identity: &str,
        err: &ScoringError,
    ) -> EvaluationResult {
        let length = response.chars().count();
        let length_bonus = if length > 500 { 0.1 } else { 0.0 };
        let base = 0.5 + length_bonus + fallback_difficulty_adjustment(difficulty);
        let final_score = (base + self.random.jitter(self.fallback_jitter)).clamp(0.0, 1.0);
        let threshold = self.threshold_for(difficulty, ai_identity);

        let dimension_scores: DimensionScores = [
            (ScoringDimension::CodeQuality, base),
            (ScoringDimension::ProblemSolving, base),
        ]
        .into_iter()
        .collect();

        EvaluationResult {
            id: Uuid::new_v4(),
            final_score,
            passed: final_score >= threshold,
            threshold,
            adjusted_scores: dimension_scores.clone(),
            dimension_scores,
            feedback: Feedback {
                overall_assessment: "Fallback evaluation completed".to_string(),
                strengths: vec!["Task completed".to_string()],
                areas_for_improvement: vec!["General improvement needed".to_string()],
                specific_recommendations: vec!["Continue learning".to_string()],
                difficulty_appropriate: true,
            },
            difficulty,
            ai_identity: ai_identity.to_string(),
            evaluated_at: Utc::now(),
            mode: EvaluationMode::Fallback,
            fallback_reason: Some(err.to_string()),
        }
    }
}

fn fallback_difficulty_adjustment(difficulty: Complexity) -> f64 {
    match difficulty {
        Complexity::Basic => 0.0,
        Complexity::Intermediate => -0.05,
        Complexity::Advanced => -0.1,
        Complexity::Expert => -0.15,
        Complexity::Master => -0.2,
    }
}

/// Feedback is derived from the raw dimension scores, before AI bonuses.
fn generate_feedback(scores: &DimensionScores, final_score: f64) -> Feedback {
    let mut strengths = Vec::new();
    let mut areas_for_improvement = Vec::new();
    for (dimension, &score) in scores {
        if score >= 0.8 {
            strengths.push(format!("Strong {}", dimension.label()));
        } else if score >= 0.6 {
            strengths.push(format!("Good {}", dimension.label()));
        }

        if score < 0.5 {
            areas_for_improvement.push(format!("Needs improvement in {}", dimension.label()));
        } else if score < 0.7 {
            areas_for_improvement.push(format!("Could improve {}", dimension.label()));
        }
    }

    let score_of = |dimension: ScoringDimension| scores.get(&dimension).copied().unwrap_or(0.0);
    let recommendations = [
        (ScoringDimension::CodeQuality, 0.7, "Focus on writing cleaner, more readable code"),
        (ScoringDimension::Security, 0.6, "Pay more attention to security best practices"),
        (ScoringDimension::Innovation, 0.5, "Consider more creative and innovative approaches"),
        (
            ScoringDimension::Efficiency,
            0.6,
            "Focus on optimizing performance and resource usage",
        ),
    ];
    let specific_recommendations = recommendations
        .into_iter()
        .filter(|(dimension, below, _)| score_of(*dimension) < *below)
        .map(|(_, _, text)| text.to_string())
        .collect();

    Feedback {
        overall_assessment: Assessment::from_score(final_score).summary().to_string(),
        strengths,
        areas_for_improvement,
        specific_recommendations,
        difficulty_appropriate: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::NoJitter;
    use async_trait::async_trait;

    fn system() -> IntelligentScoringSystem {
        IntelligentScoringSystem::new(&ScoringConfig::default(), Arc::new(NoJitter))
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    struct BrokenScorer;

    #[async_trait]
    impl DimensionScorer for BrokenScorer {
        fn dimension(&self) -> ScoringDimension {
            ScoringDimension::Security
        }

        async fn score(
            &self,
            _components: &ResponseComponents,
            _difficulty: Complexity,
        ) -> Result<f64, ScoringError> {
            Err(ScoringError::Scorer {
                dimension: ScoringDimension::Security,
                reason: "model offline".to_string(),
            })
        }
    }

    struct FixedScorer(ScoringDimension, f64);

    #[async_trait]
    impl DimensionScorer for FixedScorer {
        fn dimension(&self) -> ScoringDimension {
            self.0
        }

        async fn score(
            &self,
            _components: &ResponseComponents,
            _difficulty: Complexity,
        ) -> Result<f64, ScoringError> {
            Ok(self.1)
        }
    }

    #[test]
    fn test_thresholds_by_difficulty_and_identity() {
        let system = system();
        assert!(approx(system.threshold_for(Complexity::Basic, "imperium"), 0.65));
        assert!(approx(system.threshold_for(Complexity::Master, "Imperium"), 0.85));
        assert!(approx(system.threshold_for(Complexity::Advanced, "sandbox"), 0.7));
        assert!(approx(system.threshold_for(Complexity::Basic, "unknown"), 0.6));
    }

    #[tokio::test]
    async fn test_plain_text_uses_base_scores_and_bonuses() {
        let system = system();
        let result = system
            .evaluate_ai_response("hello world", Complexity::Basic, "imperium")
            .await;

        assert_eq!(result.mode, EvaluationMode::Full);
        assert!(approx(result.dimension_scores[&ScoringDimension::Innovation], 0.3));
        assert!(approx(result.adjusted_scores[&ScoringDimension::Innovation], 0.4));
        assert!(approx(result.adjusted_scores[&ScoringDimension::Efficiency], 0.55));
        // 0.3*0.3 + 0.5*0.4 + 0.4*0.1 + 0.55*0.2
        assert!(approx(result.final_score, 0.44));
        assert!(approx(result.threshold, 0.65));
        assert!(!result.passed);
    }

    #[tokio::test]
    async fn test_feedback_uses_unadjusted_scores() {
        let system = system();
        let result = system
            .evaluate_ai_response("hello world", Complexity::Basic, "imperium")
            .await;

        let feedback = &result.feedback;
        assert_eq!(feedback.overall_assessment, "Needs improvement in multiple areas");
        assert!(feedback.strengths.is_empty());
        assert!(feedback
            .areas_for_improvement
            .contains(&"Needs improvement in innovation".to_string()));
        assert!(feedback
            .areas_for_improvement
            .contains(&"Could improve problem solving".to_string()));
        assert_eq!(feedback.specific_recommendations.len(), 4);
    }

    #[tokio::test]
    async fn test_successful_evaluations_are_recorded() {
        let system = system();
        system
            .evaluate_ai_response("Explanation: use a hash map", Complexity::Basic, "guardian")
            .await;

        let analytics = system.get_scoring_analytics().await.unwrap();
        assert_eq!(analytics.total_evaluations, 1);
        assert!(analytics.ai_performance.contains_key("guardian"));
    }

    #[tokio::test]
    async fn test_empty_response_falls_back_without_history() {
        let system = system();
        let result = system
            .evaluate_ai_response("   ", Complexity::Basic, "sandbox")
            .await;

        assert!(result.is_fallback());
        assert!(approx(result.final_score, 0.5));
        assert!(approx(result.threshold, 0.6));
        assert!(!result.passed);
        assert_eq!(result.dimension_scores.len(), 2);
        assert!(system.get_scoring_analytics().await.is_none());
    }

    #[tokio::test]
    async fn test_scorer_failure_falls_back_with_length_bonus() {
        let system = system().with_scorer(Arc::new(BrokenScorer));
        let response = "x".repeat(1200);
        let result = system
            .evaluate_ai_response(&response, Complexity::Advanced, "conquest")
            .await;

        assert_eq!(result.mode, EvaluationMode::Fallback);
        // 0.5 + 0.1 - 0.1
        assert!(approx(result.final_score, 0.5));
        assert!(approx(
            result.dimension_scores[&ScoringDimension::CodeQuality],
            0.5
        ));
        assert!(result.fallback_reason.unwrap().contains("model offline"));
    }

    #[tokio::test]
    async fn test_medium_length_fallback_bonus() {
        let system = system().with_scorer(Arc::new(BrokenScorer));
        let result = system
            .evaluate_ai_response(&"y".repeat(600), Complexity::Basic, "sandbox")
            .await;
        assert!(approx(result.final_score, 0.6));
        assert!(result.passed);
    }

    #[tokio::test]
    async fn test_long_fallback_gets_same_bonus_as_medium() {
        let system = system().with_scorer(Arc::new(BrokenScorer));
        let result = system
            .evaluate_ai_response(&"z".repeat(1200), Complexity::Basic, "sandbox")
            .await;
        assert!(approx(result.final_score, 0.6));
    }

    #[tokio::test]
    async fn test_custom_scorer_replaces_heuristic() {
        let system = system().with_scorer(Arc::new(FixedScorer(ScoringDimension::CodeQuality, 1.0)));
        let result = system
            .evaluate_ai_response("hello world", Complexity::Basic, "nobody")
            .await;

        assert!(approx(result.dimension_scores[&ScoringDimension::CodeQuality], 1.0));
        assert_eq!(result.dimension_scores.len(), ScoringDimension::ALL.len());
        assert!(result
            .feedback
            .strengths
            .contains(&"Strong code quality".to_string()));
    }

    #[tokio::test]
    async fn test_bonuses_are_capped_at_one() {
        let system = system().with_scorer(Arc::new(FixedScorer(ScoringDimension::Security, 0.95)));
        let result = system
            .evaluate_ai_response("hello world", Complexity::Advanced, "guardian")
            .await;
        assert!(approx(result.adjusted_scores[&ScoringDimension::Security], 1.0));
    }

    #[tokio::test]
    async fn test_missing_tier_weights_fall_back_to_basic() {
        let mut config = ScoringConfig::default();
        config.weights.0.remove(&Complexity::Master);
        let system = IntelligentScoringSystem::new(&config, Arc::new(NoJitter));

        let result = system
            .evaluate_ai_response("hello world", Complexity::Master, "nobody")
            .await;
        // basic weights over the raw scores: 0.09 + 0.2 + 0.03 + 0.1
        assert!(approx(result.final_score, 0.42));
    }
}
