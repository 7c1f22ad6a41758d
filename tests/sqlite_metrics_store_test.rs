//! SQLite metrics store driven through the threshold service.

mod common;

use std::sync::Arc;

use custodes::adapters::sqlite::{create_migrated_test_pool, initialize_database, SqliteMetricsStore};
use custodes::domain::errors::DomainError;
use custodes::domain::models::{Complexity, DatabaseConfig, TestType, AGENT_HISTORY_LIMIT};
use custodes::domain::ports::AgentMetricsStore;
use custodes::services::AdaptiveThresholdService;

use common::history;

async fn setup_store() -> Arc<SqliteMetricsStore> {
    let pool = create_migrated_test_pool()
        .await
        .expect("Failed to create test pool");
    Arc::new(SqliteMetricsStore::new(pool))
}

#[tokio::test]
async fn test_recorded_history_drives_thresholds() {
    let store = setup_store().await;
    for record in history("imperium", TestType::CodeQuality, Complexity::Advanced, &[90.0; 5]) {
        store.record_test(&record).await.unwrap();
    }

    let service = AdaptiveThresholdService::new(store.clone());
    assert_eq!(
        service
            .get_adaptive_threshold(TestType::CodeQuality, Complexity::Advanced, None)
            .await,
        65
    );
    assert_eq!(
        service
            .get_ai_specific_threshold(TestType::CodeQuality, Complexity::Advanced, "imperium")
            .await,
        75
    );
}

#[tokio::test]
async fn test_history_is_capped_and_ordered() {
    let store = setup_store().await;
    let scores: Vec<f64> = (0..60).map(f64::from).collect();
    for record in history("sandbox", TestType::SelfImprovement, Complexity::Basic, &scores) {
        store.record_test(&record).await.unwrap();
    }

    let metrics = store.get_agent_metrics("sandbox").await.unwrap().unwrap();
    assert_eq!(metrics.test_history.len(), AGENT_HISTORY_LIMIT);
    assert_eq!(metrics.test_history.first().map(|r| r.score), Some(10.0));
    assert_eq!(metrics.test_history.last().map(|r| r.score), Some(59.0));
}

#[tokio::test]
async fn test_levels_persist_and_reject_zero() {
    let store = setup_store().await;
    store.set_level("guardian", 4).await.unwrap();

    let metrics = store.get_agent_metrics("guardian").await.unwrap().unwrap();
    assert_eq!(metrics.level, 4);
    assert!(metrics.test_history.is_empty());

    let err = store.set_level("guardian", 0).await.unwrap_err();
    assert!(matches!(err, DomainError::ValidationFailed(_)));
}

#[tokio::test]
async fn test_file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        path: dir.path().join("metrics.db").display().to_string(),
        ..DatabaseConfig::default()
    };

    let pool = initialize_database(&config).await.unwrap();
    let store = SqliteMetricsStore::new(pool.clone());
    for record in history("conquest", TestType::CodeQuality, Complexity::Basic, &[55.0, 65.0]) {
        store.record_test(&record).await.unwrap();
    }
    pool.close().await;

    let reopened = SqliteMetricsStore::new(initialize_database(&config).await.unwrap());
    let all = reopened.get_all_agent_metrics().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all["conquest"].test_history.len(), 2);
    assert_eq!(all["conquest"].pass_rate(), Some(0.5));
}
