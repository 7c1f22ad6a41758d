//! Test record domain model.
//!
//! A test record is produced every time an AI identity completes a test.
//! Records are append-only: the threshold service only ever reads them in
//! aggregate, and nothing in the system updates or deletes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of records a metrics store keeps per agent.
pub const AGENT_HISTORY_LIMIT: usize = 50;

/// Category of test an AI identity can be put through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    KnowledgeVerification,
    CodeQuality,
    SecurityAwareness,
    PerformanceOptimization,
    InnovationCapability,
    SelfImprovement,
    CrossAiCollaboration,
    ExperimentalValidation,
}

impl TestType {
    /// Every test type, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::KnowledgeVerification,
        Self::CodeQuality,
        Self::SecurityAwareness,
        Self::PerformanceOptimization,
        Self::InnovationCapability,
        Self::SelfImprovement,
        Self::CrossAiCollaboration,
        Self::ExperimentalValidation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KnowledgeVerification => "knowledge_verification",
            Self::CodeQuality => "code_quality",
            Self::SecurityAwareness => "security_awareness",
            Self::PerformanceOptimization => "performance_optimization",
            Self::InnovationCapability => "innovation_capability",
            Self::SelfImprovement => "self_improvement",
            Self::CrossAiCollaboration => "cross_ai_collaboration",
            Self::ExperimentalValidation => "experimental_validation",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|test_type| test_type.as_str() == normalized)
    }
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered complexity tier.
///
/// The threshold service calls this the test complexity; the scoring system
/// calls it the difficulty. Both use the same tiers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    #[default]
    Basic,
    Intermediate,
    Advanced,
    Expert,
    Master,
}

impl Complexity {
    /// Every tier, easiest first.
    pub const ALL: [Self; 5] = [
        Self::Basic,
        Self::Intermediate,
        Self::Advanced,
        Self::Expert,
        Self::Master,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
            Self::Master => "master",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Some(Self::Basic),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            "expert" => Some(Self::Expert),
            "master" => Some(Self::Master),
            _ => None,
        }
    }

    /// Expert and master tiers unlock the extra heuristic bonuses.
    pub fn is_advanced_tier(&self) -> bool {
        matches!(self, Self::Expert | Self::Master)
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single completed test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    pub id: Uuid,
    pub ai_identifier: String,
    pub test_type: TestType,
    pub complexity: Complexity,
    /// Score on a 0-100 scale.
    pub score: f64,
    pub passed: bool,
    pub timestamp: DateTime<Utc>,
}

impl TestRecord {
    /// Create a record stamped with the current time.
    ///
    /// The score is clamped into 0-100.
    pub fn new(
        ai_identifier: impl Into<String>,
        test_type: TestType,
        complexity: Complexity,
        score: f64,
        passed: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            ai_identifier: ai_identifier.into(),
            test_type,
            complexity,
            score: score.clamp(0.0, 100.0),
            passed,
            timestamp: Utc::now(),
        }
    }

    /// Override the timestamp; used when replaying historical data.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Metrics for one AI identity as served by an
/// [`AgentMetricsStore`](crate::domain::ports::AgentMetricsStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMetrics {
    pub agent_type: String,
    /// Progression level, starting at 1.
    pub level: u32,
    /// Oldest first.
    pub test_history: Vec<TestRecord>,
}

impl AgentMetrics {
    pub fn new(agent_type: impl Into<String>) -> Self {
        Self {
            agent_type: agent_type.into(),
            level: 1,
            test_history: Vec::new(),
        }
    }

    /// Scores of the most recent `limit` records of `test_type`, oldest first.
    pub fn recent_scores(&self, test_type: TestType, limit: usize) -> Vec<&TestRecord> {
        let mut matching: Vec<&TestRecord> = self
            .test_history
            .iter()
            .rev()
            .filter(|record| record.test_type == test_type)
            .take(limit)
            .collect();
        matching.reverse();
        matching
    }

    /// Fraction of recorded tests that passed, or `None` without history.
    pub fn pass_rate(&self) -> Option<f64> {
        if self.test_history.is_empty() {
            return None;
        }
        let passed = self.test_history.iter().filter(|r| r.passed).count();
        Some(passed as f64 / self.test_history.len() as f64)
    }

    /// Append a record, dropping the oldest entries beyond [`AGENT_HISTORY_LIMIT`].
    pub fn push_record(&mut self, record: TestRecord) {
        self.test_history.push(record);
        if self.test_history.len() > AGENT_HISTORY_LIMIT {
            let excess = self.test_history.len() - AGENT_HISTORY_LIMIT;
            self.test_history.drain(..excess);
        }
    }
}
