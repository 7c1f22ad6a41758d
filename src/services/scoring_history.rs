//! In-process history of completed evaluations and the analytics derived
//! from it. History is not persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use tokio::sync::RwLock;

use crate::domain::models::{Assessment, Complexity, DimensionScores};
use crate::services::statistics::mean;

/// Number of entries reported as recent activity.
pub const RECENT_ENTRIES: usize = 10;

/// One successful evaluation as kept in history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringHistoryEntry {
    /// Identity as given by the caller, not normalised.
    pub ai_identity: String,
    pub final_score: f64,
    /// Raw scores, before identity bonuses.
    pub dimension_scores: DimensionScores,
    pub difficulty: Complexity,
    pub timestamp: DateTime<Utc>,
}

/// Count of entries per assessment bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreDistribution {
    pub excellent: usize,
    pub very_good: usize,
    pub good: usize,
    pub satisfactory: usize,
    pub needs_improvement: usize,
}

impl ScoreDistribution {
    fn add(&mut self, score: f64) {
        match Assessment::from_score(score) {
            Assessment::Excellent => self.excellent += 1,
            Assessment::VeryGood => self.very_good += 1,
            Assessment::Good => self.good += 1,
            Assessment::Satisfactory => self.satisfactory += 1,
            Assessment::NeedsImprovement => self.needs_improvement += 1,
        }
    }

    /// Sum over every bucket.
    pub fn total(&self) -> usize {
        self.excellent + self.very_good + self.good + self.satisfactory + self.needs_improvement
    }
}

/// Average and count for one identity or difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupStats {
    pub average_score: f64,
    pub total_evaluations: usize,
}

/// Summary of everything currently held in history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringAnalytics {
    pub total_evaluations: usize,
    pub average_score: f64,
    pub score_distribution: ScoreDistribution,
    /// Keyed by identity as recorded.
    pub ai_performance: BTreeMap<String, GroupStats>,
    pub difficulty_performance: BTreeMap<Complexity, GroupStats>,
    /// Newest last.
    pub recent: Vec<ScoringHistoryEntry>,
}

/// Bounded FIFO of evaluation outcomes.
#[derive(Debug)]
pub struct ScoringHistory {
    capacity: usize,
    entries: RwLock<VecDeque<ScoringHistoryEntry>>,
}

impl ScoringHistory {
    /// Empty history holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: RwLock::new(VecDeque::with_capacity(capacity.clamp(1, 1024))),
        }
    }

    /// Entries currently held.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Append an entry, evicting the oldest once over capacity.
    pub async fn push(&self, entry: ScoringHistoryEntry) {
        let mut entries = self.entries.write().await;
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    /// Aggregate statistics, or `None` before the first evaluation.
    pub async fn analytics(&self) -> Option<ScoringAnalytics> {
        let entries = self.entries.read().await;
        let scores: Vec<f64> = entries.iter().map(|e| e.final_score).collect();
        let average_score = mean(&scores)?;

        let mut score_distribution = ScoreDistribution::default();
        let mut by_ai: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut by_difficulty: BTreeMap<Complexity, Vec<f64>> = BTreeMap::new();
        for entry in entries.iter() {
            score_distribution.add(entry.final_score);
            by_ai
                .entry(entry.ai_identity.clone())
                .or_default()
                .push(entry.final_score);
            by_difficulty
                .entry(entry.difficulty)
                .or_default()
                .push(entry.final_score);
        }

        let skip = entries.len().saturating_sub(RECENT_ENTRIES);
        Some(ScoringAnalytics {
            total_evaluations: entries.len(),
            average_score,
            score_distribution,
            ai_performance: group_stats(by_ai),
            difficulty_performance: group_stats(by_difficulty),
            recent: entries.iter().skip(skip).cloned().collect(),
        })
    }
}

fn group_stats<K: Ord>(groups: BTreeMap<K, Vec<f64>>) -> BTreeMap<K, GroupStats> {
    groups
        .into_iter()
        .filter_map(|(key, scores)| {
            mean(&scores).map(|average_score| {
                (
                    key,
                    GroupStats {
                        average_score,
                        total_evaluations: scores.len(),
                    },
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ai: &str, score: f64, difficulty: Complexity) -> ScoringHistoryEntry {
        ScoringHistoryEntry {
            ai_identity: ai.to_string(),
            final_score: score,
            dimension_scores: DimensionScores::new(),
            difficulty,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_empty_history_has_no_analytics() {
        let history = ScoringHistory::new(10);
        assert!(history.is_empty().await);
        assert!(history.analytics().await.is_none());
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let history = ScoringHistory::new(3);
        for i in 0..5 {
            history
                .push(entry("imperium", f64::from(i) / 10.0, Complexity::Basic))
                .await;
        }
        assert_eq!(history.len().await, 3);

        let analytics = history.analytics().await.unwrap();
        assert_eq!(analytics.recent.first().unwrap().final_score, 0.2);
        assert_eq!(analytics.recent.last().unwrap().final_score, 0.4);
    }

    #[tokio::test]
    async fn test_analytics_groups_and_buckets() {
        let history = ScoringHistory::new(100);
        history.push(entry("imperium", 0.95, Complexity::Expert)).await;
        history.push(entry("imperium", 0.75, Complexity::Basic)).await;
        history.push(entry("guardian", 0.55, Complexity::Basic)).await;

        let analytics = history.analytics().await.unwrap();
        assert_eq!(analytics.total_evaluations, 3);
        assert!((analytics.average_score - 0.75).abs() < 1e-9);
        assert_eq!(analytics.score_distribution.excellent, 1);
        assert_eq!(analytics.score_distribution.good, 1);
        assert_eq!(analytics.score_distribution.needs_improvement, 1);
        assert_eq!(analytics.score_distribution.total(), 3);

        let imperium = analytics.ai_performance["imperium"];
        assert_eq!(imperium.total_evaluations, 2);
        assert!((imperium.average_score - 0.85).abs() < 1e-9);
        assert_eq!(
            analytics.difficulty_performance[&Complexity::Basic].total_evaluations,
            2
        );
    }

    #[tokio::test]
    async fn test_recent_is_limited() {
        let history = ScoringHistory::new(100);
        for _ in 0..25 {
            history.push(entry("sandbox", 0.6, Complexity::Basic)).await;
        }
        let analytics = history.analytics().await.unwrap();
        assert_eq!(analytics.recent.len(), RECENT_ENTRIES);
    }
}
