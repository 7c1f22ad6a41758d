use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{AgentMetrics, TestRecord};

/// Store of per-agent test history and progression levels
///
/// This is the only collaborator the threshold service depends on. Stores
/// keep the most recent [`AGENT_HISTORY_LIMIT`](crate::domain::models::AGENT_HISTORY_LIMIT)
/// records per agent, oldest first.
#[async_trait]
pub trait AgentMetricsStore: Send + Sync {
    /// Metrics for every known agent, keyed by agent identity
    async fn get_all_agent_metrics(&self) -> DomainResult<HashMap<String, AgentMetrics>>;

    /// Metrics for a single agent
    ///
    /// Returns `None` if the agent has never been recorded.
    async fn get_agent_metrics(&self, ai_identity: &str) -> DomainResult<Option<AgentMetrics>>;

    /// Append a completed test to the agent's history
    ///
    /// Unknown agents are created at level 1.
    async fn record_test(&self, record: &TestRecord) -> DomainResult<()>;

    /// Set an agent's progression level
    ///
    /// # Errors
    /// Returns `ValidationFailed` for level 0.
    async fn set_level(&self, ai_identity: &str, level: u32) -> DomainResult<()>;
}
