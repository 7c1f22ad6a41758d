//! Common test utilities for integration tests
//!
//! Shared fixtures for building agent histories and scoring systems.

#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;

use custodes::adapters::memory::InMemoryMetricsStore;
use custodes::domain::models::{AgentMetrics, Complexity, ScoringConfig, TestRecord, TestType};
use custodes::domain::ports::NoJitter;
use custodes::services::IntelligentScoringSystem;

/// Records for one agent, one minute apart, oldest first.
pub fn history(
    ai: &str,
    test_type: TestType,
    complexity: Complexity,
    scores: &[f64],
) -> Vec<TestRecord> {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
    scores
        .iter()
        .enumerate()
        .map(|(i, &score)| {
            TestRecord::new(ai, test_type, complexity, score, score >= 60.0)
                .at(start + Duration::minutes(i as i64))
        })
        .collect()
}

/// Metrics for one agent at `level` holding `records`.
pub fn agent(ai: &str, level: u32, records: Vec<TestRecord>) -> AgentMetrics {
    let mut metrics = AgentMetrics::new(ai);
    metrics.level = level;
    for record in records {
        metrics.push_record(record);
    }
    metrics
}

/// In-memory store pre-populated with `agents`.
pub fn store_with(agents: Vec<AgentMetrics>) -> Arc<InMemoryMetricsStore> {
    Arc::new(InMemoryMetricsStore::with_metrics(agents))
}

/// Scoring system with default weights and no jitter.
pub fn deterministic_scoring() -> IntelligentScoringSystem {
    IntelligentScoringSystem::new(&ScoringConfig::default(), Arc::new(NoJitter))
}
