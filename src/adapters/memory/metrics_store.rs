//! In-memory implementation of the AgentMetricsStore.
//!
//! Holds every agent's metrics behind a `tokio::sync::RwLock`. Nothing is
//! persisted; used by tests and by callers that feed history in directly.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AgentMetrics, TestRecord};
use crate::domain::ports::AgentMetricsStore;

#[derive(Debug, Default)]
pub struct InMemoryMetricsStore {
    agents: RwLock<HashMap<String, AgentMetrics>>,
}

impl InMemoryMetricsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with metrics.
    pub fn with_metrics(metrics: impl IntoIterator<Item = AgentMetrics>) -> Self {
        let agents = metrics
            .into_iter()
            .map(|m| (m.agent_type.clone(), m))
            .collect();
        Self {
            agents: RwLock::new(agents),
        }
    }
}

#[async_trait]
impl AgentMetricsStore for InMemoryMetricsStore {
    async fn get_all_agent_metrics(&self) -> DomainResult<HashMap<String, AgentMetrics>> {
        Ok(self.agents.read().await.clone())
    }

    async fn get_agent_metrics(&self, ai_identity: &str) -> DomainResult<Option<AgentMetrics>> {
        Ok(self.agents.read().await.get(ai_identity).cloned())
    }

    async fn record_test(&self, record: &TestRecord) -> DomainResult<()> {
        if !record.score.is_finite() {
            return Err(DomainError::ValidationFailed(format!(
                "score for {} is not a finite number",
                record.ai_identifier
            )));
        }
        let mut agents = self.agents.write().await;
        agents
            .entry(record.ai_identifier.clone())
            .or_insert_with(|| AgentMetrics::new(record.ai_identifier.clone()))
            .push_record(record.clone());
        Ok(())
    }

    async fn set_level(&self, ai_identity: &str, level: u32) -> DomainResult<()> {
        if level == 0 {
            return Err(DomainError::ValidationFailed(
                "agent level must be at least 1".to_string(),
            ));
        }
        let mut agents = self.agents.write().await;
        agents
            .entry(ai_identity.to_string())
            .or_insert_with(|| AgentMetrics::new(ai_identity))
            .level = level;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Complexity, TestType, AGENT_HISTORY_LIMIT};

    #[tokio::test]
    async fn test_record_creates_agent() {
        let store = InMemoryMetricsStore::new();
        let record = TestRecord::new("guardian", TestType::SecurityAwareness, Complexity::Expert, 81.0, true);
        store.record_test(&record).await.unwrap();

        let metrics = store.get_agent_metrics("guardian").await.unwrap().unwrap();
        assert_eq!(metrics.level, 1);
        assert_eq!(metrics.test_history, vec![record]);
        assert!(store.get_agent_metrics("imperium").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_non_finite_scores() {
        let store = InMemoryMetricsStore::new();
        for score in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let record = TestRecord {
                score,
                ..TestRecord::new("sandbox", TestType::CodeQuality, Complexity::Basic, 0.0, false)
            };
            assert!(matches!(
                store.record_test(&record).await,
                Err(DomainError::ValidationFailed(_))
            ));
        }
        assert!(store.get_agent_metrics("sandbox").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_is_capped() {
        let store = InMemoryMetricsStore::new();
        for i in 0..(AGENT_HISTORY_LIMIT + 5) {
            let record = TestRecord::new("sandbox", TestType::CodeQuality, Complexity::Basic, i as f64, true);
            store.record_test(&record).await.unwrap();
        }
        let all = store.get_all_agent_metrics().await.unwrap();
        assert_eq!(all["sandbox"].test_history.len(), AGENT_HISTORY_LIMIT);
    }

    #[tokio::test]
    async fn test_set_level() {
        let store = InMemoryMetricsStore::new();
        store.set_level("conquest", 4).await.unwrap();
        assert_eq!(store.get_agent_metrics("conquest").await.unwrap().unwrap().level, 4);
        assert!(matches!(
            store.set_level("conquest", 0).await,
            Err(DomainError::ValidationFailed(_))
        ));
    }
}
