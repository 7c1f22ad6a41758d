//! Shared threshold policy.
//!
//! Both the adaptive threshold service (0-100 scale) and the scoring system
//! (0-1 scale) derive pass thresholds from a static base, an optional
//! per-identity offset and a clamp. [`ThresholdPolicy`] holds those rules
//! once; the two consumers differ only in the parameters they build it with.

use serde::Serialize;
use std::collections::HashMap;

use crate::domain::models::{ScoringConfig, ThresholdConfig, ThresholdRange};
use crate::services::statistics::ScoreStatistics;

/// Statistical adaptation parameters (see [`ThresholdConfig`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptationParams {
    /// Share of the excess over the range maximum added to the minimum.
    pub harder_factor: f64,
    pub max_harder_adjustment: f64,
    /// Share of the shortfall below the range minimum taken off it.
    pub easier_factor: f64,
    pub max_easier_adjustment: f64,
    /// Multiplier on the short-window trend inside the range.
    pub trend_factor: f64,
    /// Points an agent's mean must differ from the base before it counts.
    pub personal_deviation_trigger: f64,
    pub personal_raise_cap: f64,
    pub personal_lower_cap: f64,
    /// Threshold growth per level above 1.
    pub level_step: f64,
}

impl From<&ThresholdConfig> for AdaptationParams {
    fn from(config: &ThresholdConfig) -> Self {
        Self {
            harder_factor: config.harder_factor,
            max_harder_adjustment: config.max_harder_adjustment,
            easier_factor: config.easier_factor,
            max_easier_adjustment: config.max_easier_adjustment,
            trend_factor: config.trend_factor,
            personal_deviation_trigger: config.personal_deviation_trigger,
            personal_raise_cap: config.personal_raise_cap,
            personal_lower_cap: config.personal_lower_cap,
            level_step: config.level_step,
        }
    }
}

impl Default for AdaptationParams {
    fn default() -> Self {
        Self::from(&ThresholdConfig::default())
    }
}

/// Which rule moved the threshold away from the static minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// No history, or too little to detect a trend.
    Static,
    /// Recent scores exceed the range maximum.
    Harder,
    /// Recent scores fall below the range minimum.
    Easier,
    /// Scores sit inside the range; nudged by their trend.
    Trend,
}

/// Factors applied when personalising a threshold to one agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Personalization {
    /// Mean of the agent's recent scores.
    pub agent_mean: f64,
    pub deviation_factor: f64,
    /// Level used, never below 1.
    pub level: u32,
    pub level_factor: f64,
}

/// Threshold rules shared by every consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdPolicy {
    floor: f64,
    ceiling: f64,
    identity_offsets: HashMap<String, f64>,
    adaptation: AdaptationParams,
}

impl ThresholdPolicy {
    /// Policy clamping to `[floor, ceiling]` with default adaptation and no offsets.
    pub fn new(floor: f64, ceiling: f64) -> Self {
        Self {
            floor,
            ceiling,
            identity_offsets: HashMap::new(),
            adaptation: AdaptationParams::default(),
        }
    }

    /// Policy on the 0-100 scale used for test-score thresholds.
    pub fn percent(config: &ThresholdConfig) -> Self {
        Self::new(config.floor, config.ceiling).with_adaptation(AdaptationParams::from(config))
    }

    /// Policy on the 0-1 scale used for evaluated responses.
    pub fn unit(config: &ScoringConfig) -> Self {
        let offsets = config
            .ai_threshold_offsets
            .iter()
            .map(|(ai, offset)| (ai.to_lowercase(), *offset));
        Self::new(config.threshold_floor, config.threshold_ceiling).with_identity_offsets(offsets)
    }

    /// Replace the per-identity offsets. Keys are expected lowercase.
    pub fn with_identity_offsets(
        mut self,
        offsets: impl IntoIterator<Item = (String, f64)>,
    ) -> Self {
        self.identity_offsets = offsets.into_iter().collect();
        self
    }

    /// Replace the adaptation parameters.
    pub fn with_adaptation(mut self, adaptation: AdaptationParams) -> Self {
        self.adaptation = adaptation;
        self
    }

    /// Clamp a threshold into the policy bounds.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.floor, self.ceiling)
    }

    /// Offset for an identity, matched case-insensitively.
    pub fn identity_offset(&self, ai_identity: Option<&str>) -> f64 {
        ai_identity
            .and_then(|ai| self.identity_offsets.get(&ai.to_lowercase()))
            .copied()
            .unwrap_or(0.0)
    }

    /// Threshold without any history: range minimum plus identity offset.
    pub fn static_threshold(&self, range: ThresholdRange, ai_identity: Option<&str>) -> f64 {
        self.clamp(range.minimum + self.identity_offset(ai_identity))
    }

    /// Move the range minimum according to recent score statistics.
    ///
    /// The result is clamped but not rounded.
    pub fn adapt(&self, range: ThresholdRange, stats: &ScoreStatistics) -> (f64, AdjustmentKind) {
        let p = &self.adaptation;
        let (value, kind) = if stats.mean > range.maximum {
            let raise = ((stats.mean - range.maximum) * p.harder_factor).min(p.max_harder_adjustment);
            (range.minimum + raise, AdjustmentKind::Harder)
        } else if stats.mean < range.minimum {
            let cut = ((range.minimum - stats.mean) * p.easier_factor).min(p.max_easier_adjustment);
            ((range.minimum - cut).max(self.floor), AdjustmentKind::Easier)
        } else if let Some(trend) = stats.trend {
            (range.minimum + trend * p.trend_factor, AdjustmentKind::Trend)
        } else {
            (range.minimum, AdjustmentKind::Static)
        };
        (self.clamp(value), kind)
    }

    /// Personalise a base threshold to an agent's own average and level.
    pub fn personalize(&self, base: f64, agent_mean: f64, level: u32) -> (f64, Personalization) {
        let p = &self.adaptation;
        let deviation = agent_mean - base;
        let deviation_factor = if deviation > p.personal_deviation_trigger {
            1.0 + (deviation / 100.0).min(p.personal_raise_cap)
        } else if deviation < -p.personal_deviation_trigger {
            1.0 - (-deviation / 100.0).min(p.personal_lower_cap)
        } else {
            1.0
        };
        let level = level.max(1);
        let level_factor = 1.0 + f64::from(level - 1) * p.level_step;

        let value = self.clamp(base * deviation_factor * level_factor);
        (
            value,
            Personalization {
                agent_mean,
                deviation_factor,
                level,
                level_factor,
            },
        )
    }
}
