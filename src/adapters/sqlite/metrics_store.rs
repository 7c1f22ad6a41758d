//! SQLite implementation of the AgentMetricsStore.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    AgentMetrics, Complexity, TestRecord, TestType, AGENT_HISTORY_LIMIT,
};
use crate::domain::ports::AgentMetricsStore;

/// Timestamps are stored fixed-width so text ordering matches time ordering.
fn timestamp(ts: &chrono::DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

#[derive(Clone)]
pub struct SqliteMetricsStore {
    pool: SqlitePool,
}

impl SqliteMetricsStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Newest records for one agent, returned oldest first.
    async fn recent_records(&self, ai_identity: &str) -> DomainResult<Vec<TestRecord>> {
        let rows: Vec<TestRecordRow> = sqlx::query_as(
            r#"SELECT id, ai_identity, test_type, complexity, score, passed, recorded_at
               FROM test_records
               WHERE ai_identity = ?
               ORDER BY recorded_at DESC, rowid DESC
               LIMIT ?"#,
        )
        .bind(ai_identity)
        .bind(AGENT_HISTORY_LIMIT as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut records = rows
            .into_iter()
            .map(TestRecord::try_from)
            .collect::<DomainResult<Vec<_>>>()?;
        records.reverse();
        Ok(records)
    }

    async fn load_metrics(&self, agent: AgentRow) -> DomainResult<AgentMetrics> {
        let level = u32::try_from(agent.level).map_err(|_| {
            DomainError::SerializationError(format!(
                "Invalid level {} for {}",
                agent.level, agent.ai_identity
            ))
        })?;
        let test_history = self.recent_records(&agent.ai_identity).await?;

        Ok(AgentMetrics {
            agent_type: agent.ai_identity,
            level,
            test_history,
        })
    }
}

#[async_trait]
impl AgentMetricsStore for SqliteMetricsStore {
    async fn get_all_agent_metrics(&self) -> DomainResult<HashMap<String, AgentMetrics>> {
        let agents: Vec<AgentRow> =
            sqlx::query_as("SELECT ai_identity, level FROM agents ORDER BY ai_identity")
                .fetch_all(&self.pool)
                .await?;

        let mut all = HashMap::with_capacity(agents.len());
        for agent in agents {
            let metrics = self.load_metrics(agent).await?;
            all.insert(metrics.agent_type.clone(), metrics);
        }
        Ok(all)
    }

    async fn get_agent_metrics(&self, ai_identity: &str) -> DomainResult<Option<AgentMetrics>> {
        let agent: Option<AgentRow> =
            sqlx::query_as("SELECT ai_identity, level FROM agents WHERE ai_identity = ?")
                .bind(ai_identity)
                .fetch_optional(&self.pool)
                .await?;

        match agent {
            Some(agent) => Ok(Some(self.load_metrics(agent).await?)),
            None => Ok(None),
        }
    }

    async fn record_test(&self, record: &TestRecord) -> DomainResult<()> {
        if !record.score.is_finite() {
            return Err(DomainError::ValidationFailed(format!(
                "score for {} is not a finite number",
                record.ai_identifier
            )));
        }

        let now = timestamp(&Utc::now());
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO agents (ai_identity, level, created_at, updated_at)
               VALUES (?, 1, ?, ?)
               ON CONFLICT(ai_identity) DO UPDATE SET updated_at = excluded.updated_at"#,
        )
        .bind(&record.ai_identifier)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"INSERT INTO test_records (id, ai_identity, test_type, complexity, score, passed, recorded_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(record.id.to_string())
        .bind(&record.ai_identifier)
        .bind(record.test_type.as_str())
        .bind(record.complexity.as_str())
        .bind(record.score)
        .bind(i32::from(record.passed))
        .bind(timestamp(&record.timestamp))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn set_level(&self, ai_identity: &str, level: u32) -> DomainResult<()> {
        if level == 0 {
            return Err(DomainError::ValidationFailed(
                "agent level must be at least 1".to_string(),
            ));
        }

        let now = timestamp(&Utc::now());
        sqlx::query(
            r#"INSERT INTO agents (ai_identity, level, created_at, updated_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT(ai_identity) DO UPDATE SET
                   level = excluded.level,
                   updated_at = excluded.updated_at"#,
        )
        .bind(ai_identity)
        .bind(i64::from(level))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct AgentRow {
    ai_identity: String,
    level: i64,
}

#[derive(sqlx::FromRow)]
struct TestRecordRow {
    id: String,
    ai_identity: String,
    test_type: String,
    complexity: String,
    score: f64,
    passed: i32,
    recorded_at: String,
}

impl TryFrom<TestRecordRow> for TestRecord {
    type Error = DomainError;

    fn try_from(row: TestRecordRow) -> Result<Self, Self::Error> {
        let test_type = TestType::from_str(&row.test_type).ok_or_else(|| {
            DomainError::SerializationError(format!("Invalid test type: {}", row.test_type))
        })?;
        let complexity = Complexity::from_str(&row.complexity).ok_or_else(|| {
            DomainError::SerializationError(format!("Invalid complexity: {}", row.complexity))
        })?;

        Ok(TestRecord {
            id: super::parse_uuid(&row.id)?,
            ai_identifier: row.ai_identity,
            test_type,
            complexity,
            score: row.score,
            passed: row.passed != 0,
            timestamp: super::parse_datetime(&row.recorded_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use chrono::Duration;

    async fn setup_store() -> SqliteMetricsStore {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteMetricsStore::new(pool)
    }

    #[tokio::test]
    async fn test_record_and_read_back() {
        let store = setup_store().await;
        let record = TestRecord::new(
            "guardian",
            TestType::SecurityAwareness,
            Complexity::Expert,
            81.5,
            true,
        );
        store.record_test(&record).await.unwrap();

        let metrics = store.get_agent_metrics("guardian").await.unwrap().unwrap();
        assert_eq!(metrics.level, 1);
        assert_eq!(metrics.test_history.len(), 1);

        let stored = &metrics.test_history[0];
        assert_eq!(stored.id, record.id);
        assert_eq!(stored.test_type, TestType::SecurityAwareness);
        assert_eq!(stored.complexity, Complexity::Expert);
        assert_eq!(stored.score, 81.5);
        assert!(stored.passed);
        assert_eq!(stored.timestamp, record.timestamp);
    }

    #[tokio::test]
    async fn test_unknown_agent_is_none() {
        let store = setup_store().await;
        assert!(store.get_agent_metrics("nobody").await.unwrap().is_none());
        assert!(store.get_all_agent_metrics().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_keeps_newest_records_oldest_first() {
        let store = setup_store().await;
        let start = Utc::now() - Duration::hours(2);
        let total = AGENT_HISTORY_LIMIT + 5;
        for i in 0..total {
            let record = TestRecord::new(
                "imperium",
                TestType::CodeQuality,
                Complexity::Basic,
                i as f64,
                true,
            )
            .at(start + Duration::seconds(i as i64));
            store.record_test(&record).await.unwrap();
        }

        let metrics = store.get_agent_metrics("imperium").await.unwrap().unwrap();
        assert_eq!(metrics.test_history.len(), AGENT_HISTORY_LIMIT);
        assert_eq!(metrics.test_history.first().unwrap().score, 5.0);
        assert_eq!(
            metrics.test_history.last().unwrap().score,
            (total - 1) as f64
        );
    }

    #[tokio::test]
    async fn test_set_level_creates_and_updates() {
        let store = setup_store().await;
        store.set_level("conquest", 3).await.unwrap();
        assert_eq!(store.get_agent_metrics("conquest").await.unwrap().unwrap().level, 3);

        store.set_level("conquest", 4).await.unwrap();
        let record = TestRecord::new("conquest", TestType::PerformanceOptimization, Complexity::Advanced, 70.0, true);
        store.record_test(&record).await.unwrap();

        let metrics = store.get_agent_metrics("conquest").await.unwrap().unwrap();
        assert_eq!(metrics.level, 4);
        assert_eq!(metrics.test_history.len(), 1);
    }

    #[tokio::test]
    async fn test_set_level_rejects_zero() {
        let store = setup_store().await;
        let err = store.set_level("sandbox", 0).await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_all_metrics_keyed_by_identity() {
        let store = setup_store().await;
        for ai in ["imperium", "guardian"] {
            let record = TestRecord::new(ai, TestType::KnowledgeVerification, Complexity::Basic, 60.0, true);
            store.record_test(&record).await.unwrap();
        }

        let all = store.get_all_agent_metrics().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["guardian"].agent_type, "guardian");
    }
}
