//! Scoring domain models.
//!
//! Types shared by the scoring pipeline: the dimensions a response is judged
//! on, the per-tier weight table, the components extracted from a response,
//! and the evaluation result handed back to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::test_record::Complexity;

/// Tolerance used when checking weight sums.
const WEIGHT_EPSILON: f64 = 1e-9;

/// A quality dimension a response is scored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringDimension {
    CodeQuality,
    ProblemSolving,
    Innovation,
    Efficiency,
    Security,
    Performance,
    Maintainability,
}

impl ScoringDimension {
    pub const ALL: [Self; 7] = [
        Self::CodeQuality,
        Self::ProblemSolving,
        Self::Innovation,
        Self::Efficiency,
        Self::Security,
        Self::Performance,
        Self::Maintainability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CodeQuality => "code_quality",
            Self::ProblemSolving => "problem_solving",
            Self::Innovation => "innovation",
            Self::Efficiency => "efficiency",
            Self::Security => "security",
            Self::Performance => "performance",
            Self::Maintainability => "maintainability",
        }
    }

    /// Human-readable form used in feedback, e.g. "code quality".
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl std::fmt::Display for ScoringDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-dimension scores, each in `[0, 1]`.
pub type DimensionScores = BTreeMap<ScoringDimension, f64>;

/// Weight table: complexity tier to dimension weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoringWeights(pub BTreeMap<Complexity, BTreeMap<ScoringDimension, f64>>);

impl Default for ScoringWeights {
    fn default() -> Self {
        use ScoringDimension::{
            CodeQuality, Efficiency, Innovation, Maintainability, Performance, ProblemSolving,
            Security,
        };

        let tier = |pairs: &[(ScoringDimension, f64)]| pairs.iter().copied().collect();
        let mut table = BTreeMap::new();
        table.insert(
            Complexity::Basic,
            tier(&[(CodeQuality, 0.3), (ProblemSolving, 0.4), (Innovation, 0.1), (Efficiency, 0.2)]),
        );
        table.insert(
            Complexity::Intermediate,
            tier(&[
                (CodeQuality, 0.25),
                (ProblemSolving, 0.3),
                (Innovation, 0.15),
                (Efficiency, 0.2),
                (Security, 0.1),
            ]),
        );
        table.insert(
            Complexity::Advanced,
            tier(&[
                (CodeQuality, 0.2),
                (ProblemSolving, 0.25),
                (Innovation, 0.2),
                (Efficiency, 0.15),
                (Security, 0.1),
                (Performance, 0.1),
            ]),
        );
        table.insert(
            Complexity::Expert,
            tier(&[
                (CodeQuality, 0.15),
                (ProblemSolving, 0.2),
                (Innovation, 0.25),
                (Efficiency, 0.15),
                (Security, 0.1),
                (Performance, 0.1),
                (Maintainability, 0.05),
            ]),
        );
        table.insert(
            Complexity::Master,
            tier(&[
                (CodeQuality, 0.1),
                (ProblemSolving, 0.15),
                (Innovation, 0.3),
                (Efficiency, 0.15),
                (Security, 0.1),
                (Performance, 0.1),
                (Maintainability, 0.1),
            ]),
        );
        Self(table)
    }
}

impl ScoringWeights {
    /// Weights for a tier, falling back to the basic tier when the tier is
    /// absent from the table.
    pub fn for_tier(&self, tier: Complexity) -> Option<&BTreeMap<ScoringDimension, f64>> {
        self.0.get(&tier).or_else(|| self.0.get(&Complexity::Basic))
    }

    /// Inspect the table for suspicious configurations.
    ///
    /// Sums are reported, never corrected: the scoring system divides by the
    /// tier's total weight at evaluation time.
    pub fn validate(&self) -> Vec<WeightIssue> {
        let mut issues = Vec::new();
        for tier in Complexity::ALL {
            let Some(weights) = self.0.get(&tier) else {
                issues.push(WeightIssue::MissingTier { tier });
                continue;
            };
            if weights.is_empty() {
                issues.push(WeightIssue::EmptyTier { tier });
                continue;
            }
            for (&dimension, &weight) in weights {
                if weight < 0.0 || !weight.is_finite() {
                    issues.push(WeightIssue::InvalidWeight { tier, dimension, weight });
                }
            }
            let sum: f64 = weights.values().sum();
            if sum > 1.0 + WEIGHT_EPSILON {
                issues.push(WeightIssue::SumAboveOne { tier, sum });
            } else if sum < 1.0 - WEIGHT_EPSILON {
                issues.push(WeightIssue::SumBelowOne { tier, sum });
            }
        }
        issues
    }
}

/// Problem found while validating a [`ScoringWeights`] table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeightIssue {
    MissingTier { tier: Complexity },
    EmptyTier { tier: Complexity },
    InvalidWeight { tier: Complexity, dimension: ScoringDimension, weight: f64 },
    SumAboveOne { tier: Complexity, sum: f64 },
    SumBelowOne { tier: Complexity, sum: f64 },
}

impl WeightIssue {
    /// Errors make a configuration unusable; the rest are warnings.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::InvalidWeight { .. } | Self::SumAboveOne { .. })
    }
}

impl std::fmt::Display for WeightIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTier { tier } => {
                write!(f, "tier '{tier}' has no weights; the basic tier is used instead")
            }
            Self::EmptyTier { tier } => {
                write!(f, "tier '{tier}' is empty; scores fall back to a plain mean")
            }
            Self::InvalidWeight { tier, dimension, weight } => {
                write!(f, "tier '{tier}' has invalid weight {weight} for '{dimension}'")
            }
            Self::SumAboveOne { tier, sum } => {
                write!(f, "tier '{tier}' weights sum to {sum:.3}, above 1.0")
            }
            Self::SumBelowOne { tier, sum } => {
                write!(f, "tier '{tier}' weights sum to {sum:.3}, below 1.0")
            }
        }
    }
}

/// Textual pieces pulled out of a free-text response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseComponents {
    pub code_sections: Vec<String>,
    pub explanations: Vec<String>,
    pub reasoning: Vec<String>,
    pub documentation: Vec<String>,
    pub testing_approach: Vec<String>,
    pub optimization_notes: Vec<String>,
    pub security_considerations: Vec<String>,
    pub performance_notes: Vec<String>,
}

impl ResponseComponents {
    /// True when nothing at all was extracted.
    pub fn is_empty(&self) -> bool {
        self.code_sections.is_empty()
            && self.explanations.is_empty()
            && self.reasoning.is_empty()
            && self.documentation.is_empty()
            && self.testing_approach.is_empty()
            && self.optimization_notes.is_empty()
            && self.security_considerations.is_empty()
            && self.performance_notes.is_empty()
    }
}

/// Qualitative bucket for a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assessment {
    Excellent,
    VeryGood,
    Good,
    Satisfactory,
    NeedsImprovement,
}

impl Assessment {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            Self::Excellent
        } else if score >= 0.8 {
            Self::VeryGood
        } else if score >= 0.7 {
            Self::Good
        } else if score >= 0.6 {
            Self::Satisfactory
        } else {
            Self::NeedsImprovement
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::VeryGood => "very_good",
            Self::Good => "good",
            Self::Satisfactory => "satisfactory",
            Self::NeedsImprovement => "needs_improvement",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent performance with comprehensive understanding",
            Self::VeryGood => "Very good performance with solid understanding",
            Self::Good => "Good performance with adequate understanding",
            Self::Satisfactory => "Satisfactory performance with room for improvement",
            Self::NeedsImprovement => "Needs improvement in multiple areas",
        }
    }
}

/// Structured feedback attached to every evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub overall_assessment: String,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub specific_recommendations: Vec<String>,
    pub difficulty_appropriate: bool,
}

/// How an evaluation was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    /// Full component extraction and dimension scoring.
    Full,
    /// The pipeline failed and a length/difficulty estimate was used.
    Fallback,
}

/// Outcome of scoring one AI response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub id: Uuid,
    /// Weighted score in `[0, 1]`.
    pub final_score: f64,
    pub passed: bool,
    pub threshold: f64,
    /// Raw heuristic scores.
    pub dimension_scores: DimensionScores,
    /// Scores after the per-AI bonuses.
    pub adjusted_scores: DimensionScores,
    pub feedback: Feedback,
    pub difficulty: Complexity,
    pub ai_identity: String,
    pub evaluated_at: DateTime<Utc>,
    pub mode: EvaluationMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl EvaluationResult {
    pub fn assessment(&self) -> Assessment {
        Assessment::from_score(self.final_score)
    }

    pub fn is_fallback(&self) -> bool {
        self.mode == EvaluationMode::Fallback
    }
}
