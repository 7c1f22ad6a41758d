pub mod adaptive_threshold;
pub mod component_extractor;
pub mod heuristic_scorers;
pub mod intelligent_scoring;
pub mod scoring_history;
pub mod statistics;
pub mod threshold_policy;

pub use adaptive_threshold::{AdaptiveThresholdService, ThresholdComputation};
pub use component_extractor::extract_components;
pub use heuristic_scorers::{default_scorers, HeuristicScorer};
pub use intelligent_scoring::{IntelligentScoringSystem, DEFAULT_BASE_THRESHOLD};
pub use scoring_history::{
    GroupStats, ScoreDistribution, ScoringAnalytics, ScoringHistory, ScoringHistoryEntry,
};
pub use statistics::ScoreStatistics;
pub use threshold_policy::{AdjustmentKind, AdaptationParams, Personalization, ThresholdPolicy};
