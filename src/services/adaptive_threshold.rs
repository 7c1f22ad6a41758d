//! Adaptive pass/fail thresholds for test scores.
//!
//! Thresholds start from a static (test type, complexity) range and move with
//! the statistics of recent scores held by an [`AgentMetricsStore`]:
//!
//! - pooled mean above the range maximum: harder, up to +10 points
//! - pooled mean below the range minimum: easier, down to -5 points
//! - inside the range: nudged by 20% of the short-window trend
//!
//! Callers always receive a usable threshold in `[30, 95]`. When history is
//! missing or the store fails, the static range minimum is returned and the
//! typed reason is logged; the `try_*` variants expose that reason.

use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

use crate::domain::errors::ThresholdError;
use crate::domain::models::{
    AgentMetrics, Complexity, TestRecord, TestType, ThresholdConfig, ThresholdRange,
    ThresholdTable,
};
use crate::domain::ports::AgentMetricsStore;
use crate::services::statistics::ScoreStatistics;
use crate::services::threshold_policy::{AdjustmentKind, Personalization, ThresholdPolicy};

/// Breakdown of how a threshold was reached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdComputation {
    pub test_type: TestType,
    pub complexity: Complexity,
    /// `None` for pooled thresholds.
    pub ai_identity: Option<String>,
    /// Static range the computation started from.
    pub range: ThresholdRange,
    /// Statistics of the scores used; `None` on fallback.
    pub statistics: Option<ScoreStatistics>,
    pub adjustment: AdjustmentKind,
    /// Agent factors, present only for agent-specific thresholds.
    pub personalization: Option<Personalization>,
    /// Final threshold, rounded.
    pub threshold: u32,
    /// Error kind when the static minimum was used as a fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

/// Computes dynamic thresholds from recent aggregate performance.
pub struct AdaptiveThresholdService {
    store: Arc<dyn AgentMetricsStore>,
    table: ThresholdTable,
    policy: ThresholdPolicy,
    per_agent_window: usize,
    trend_short_window: usize,
    trend_min_samples: usize,
}

impl AdaptiveThresholdService {
    /// Create a service with the default table and parameters
    pub fn new(store: Arc<dyn AgentMetricsStore>) -> Self {
        Self::from_config(store, &ThresholdConfig::default())
    }

    /// Create a service from configuration, applying any range overrides
    pub fn from_config(store: Arc<dyn AgentMetricsStore>, config: &ThresholdConfig) -> Self {
        Self {
            store,
            table: ThresholdTable::with_overrides(&config.range_overrides),
            policy: ThresholdPolicy::percent(config),
            per_agent_window: config.per_agent_window,
            trend_short_window: config.trend_short_window,
            trend_min_samples: config.trend_min_samples,
        }
    }

    /// Static minimum for a pair, clamped and rounded
    pub fn static_minimum(&self, test_type: TestType, complexity: Complexity) -> u32 {
        round_threshold(
            self.policy
                .static_threshold(self.table.range(test_type, complexity), None),
        )
    }

    /// Adaptive threshold for a test.
    ///
    /// With an identity this delegates to [`Self::get_ai_specific_threshold`];
    /// otherwise scores of every agent are pooled.
    #[instrument(skip(self))]
    pub async fn get_adaptive_threshold(
        &self,
        test_type: TestType,
        complexity: Complexity,
        ai_identity: Option<&str>,
    ) -> u32 {
        if let Some(ai) = ai_identity {
            return self.get_ai_specific_threshold(test_type, complexity, ai).await;
        }
        self.explain_threshold(test_type, complexity, None)
            .await
            .threshold
    }

    /// Threshold personalised to one agent's history and level.
    #[instrument(skip(self))]
    pub async fn get_ai_specific_threshold(
        &self,
        test_type: TestType,
        complexity: Complexity,
        ai_identity: &str,
    ) -> u32 {
        self.explain_threshold(test_type, complexity, Some(ai_identity))
            .await
            .threshold
    }

    /// Full breakdown of a threshold, including any fallback reason.
    pub async fn explain_threshold(
        &self,
        test_type: TestType,
        complexity: Complexity,
        ai_identity: Option<&str>,
    ) -> ThresholdComputation {
        let result = match ai_identity {
            Some(ai) => self.try_get_ai_specific_threshold(test_type, complexity, ai).await,
            None => self.try_get_adaptive_threshold(test_type, complexity).await,
        };

        result.unwrap_or_else(|err| {
            match &err {
                ThresholdError::NoHistoryAvailable { .. } => tracing::debug!(
                    test_type = %test_type,
                    complexity = %complexity,
                    "{err}; using static minimum"
                ),
                _ => tracing::warn!(
                    test_type = %test_type,
                    complexity = %complexity,
                    kind = err.kind(),
                    error = %err,
                    "Adaptive threshold unavailable; using static minimum"
                ),
            }
            self.fallback(test_type, complexity, ai_identity, &err)
        })
    }

    /// Pooled threshold across all agents, with the failure reason exposed.
    pub async fn try_get_adaptive_threshold(
        &self,
        test_type: TestType,
        complexity: Complexity,
    ) -> Result<ThresholdComputation, ThresholdError> {
        let all_metrics = self.store.get_all_agent_metrics().await?;

        let mut agents: Vec<&AgentMetrics> = all_metrics.values().collect();
        agents.sort_by(|a, b| a.agent_type.cmp(&b.agent_type));

        let mut pooled: Vec<&TestRecord> = agents
            .iter()
            .flat_map(|metrics| metrics.recent_scores(test_type, self.per_agent_window))
            .collect();
        pooled.sort_by_key(|record| record.timestamp);

        let samples: Vec<f64> = pooled.iter().map(|record| record.score).collect();
        let stats = self.statistics(&samples, test_type, complexity, None)?;

        let range = self.table.range(test_type, complexity);
        let (value, adjustment) = self.policy.adapt(range, &stats);
        let threshold = round_threshold(value);

        tracing::debug!(
            test_type = %test_type,
            complexity = %complexity,
            samples = stats.count,
            mean = stats.mean,
            std_dev = stats.std_dev,
            threshold,
            "Computed pooled adaptive threshold"
        );

        Ok(ThresholdComputation {
            test_type,
            complexity,
            ai_identity: None,
            range,
            statistics: Some(stats),
            adjustment,
            personalization: None,
            threshold,
            fallback_reason: None,
        })
    }

    /// Agent-specific threshold, with the failure reason exposed.
    pub async fn try_get_ai_specific_threshold(
        &self,
        test_type: TestType,
        complexity: Complexity,
        ai_identity: &str,
    ) -> Result<ThresholdComputation, ThresholdError> {
        let no_history = || ThresholdError::NoHistoryAvailable {
            test_type,
            ai_identity: Some(ai_identity.to_string()),
        };

        let metrics = self
            .store
            .get_agent_metrics(ai_identity)
            .await?
            .ok_or_else(no_history)?;

        let samples: Vec<f64> = metrics
            .recent_scores(test_type, self.per_agent_window)
            .iter()
            .map(|record| record.score)
            .collect();
        let stats = self.statistics(&samples, test_type, complexity, Some(ai_identity))?;

        let range = self.table.range(test_type, complexity);
        let (base, adjustment) = self.policy.adapt(range, &stats);
        let (value, personalization) = self.policy.personalize(base, stats.mean, metrics.level);
        let threshold = round_threshold(value);

        tracing::debug!(
            test_type = %test_type,
            complexity = %complexity,
            ai_identity,
            level = metrics.level,
            base,
            threshold,
            "Computed agent-specific threshold"
        );

        Ok(ThresholdComputation {
            test_type,
            complexity,
            ai_identity: Some(ai_identity.to_string()),
            range,
            statistics: Some(stats),
            adjustment,
            personalization: Some(personalization),
            threshold,
            fallback_reason: None,
        })
    }

    fn statistics(
        &self,
        samples: &[f64],
        test_type: TestType,
        complexity: Complexity,
        ai_identity: Option<&str>,
    ) -> Result<ScoreStatistics, ThresholdError> {
        let stats = ScoreStatistics::from_samples(
            samples,
            self.trend_short_window,
            self.trend_min_samples,
        )
        .ok_or_else(|| ThresholdError::NoHistoryAvailable {
            test_type,
            ai_identity: ai_identity.map(str::to_string),
        })?;

        if !stats.is_finite() {
            return Err(ThresholdError::ComputationError {
                test_type,
                complexity,
                reason: format!("non-finite statistics over {} samples", stats.count),
            });
        }
        Ok(stats)
    }

    fn fallback(
        &self,
        test_type: TestType,
        complexity: Complexity,
        ai_identity: Option<&str>,
        err: &ThresholdError,
    ) -> ThresholdComputation {
        ThresholdComputation {
            test_type,
            complexity,
            ai_identity: ai_identity.map(str::to_string),
            range: self.table.range(test_type, complexity),
            statistics: None,
            adjustment: AdjustmentKind::Static,
            personalization: None,
            threshold: self.static_minimum(test_type, complexity),
            fallback_reason: Some(err.kind().to_string()),
        }
    }
}

fn round_threshold(value: f64) -> u32 {
    value.round().max(0.0) as u32
}
