use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::scoring::{ScoringDimension, ScoringWeights};
use super::test_record::Complexity;
use super::threshold::RangeOverride;

/// Main configuration structure for Custodes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Adaptive threshold configuration
    #[serde(default)]
    pub threshold: ThresholdConfig,

    /// Response scoring configuration
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".custodes/metrics.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// `SQLite` connection URL for the configured path.
    pub fn url(&self) -> String {
        if self.path.starts_with("sqlite:") {
            self.path.clone()
        } else {
            format!("sqlite:{}", self.path)
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Rotation policy for file output: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Parameters of the adaptive threshold service (0-100 scale).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ThresholdConfig {
    /// Lowest threshold ever returned
    pub floor: f64,
    /// Highest threshold ever returned
    pub ceiling: f64,
    /// Recent scores taken from each agent's history
    pub per_agent_window: usize,
    /// Samples required before the trend nudge applies
    pub trend_min_samples: usize,
    /// Most recent samples forming the short trend window
    pub trend_short_window: usize,
    /// Share of the trend delta applied to the threshold
    pub trend_factor: f64,
    /// Share of the excess over the range maximum added to the minimum
    pub harder_factor: f64,
    /// Cap on the upward adjustment
    pub max_harder_adjustment: f64,
    /// Share of the shortfall under the range minimum subtracted from it
    pub easier_factor: f64,
    /// Cap on the downward adjustment
    pub max_easier_adjustment: f64,
    /// Deviation (in points) of an agent's average before it is personalised
    pub personal_deviation_trigger: f64,
    /// Largest relative raise for agents above the base threshold
    pub personal_raise_cap: f64,
    /// Largest relative cut for agents below the base threshold
    pub personal_lower_cap: f64,
    /// Relative increase per level above 1
    pub level_step: f64,
    /// Replacements for cells of the static range table
    pub range_overrides: Vec<RangeOverride>,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            floor: 30.0,
            ceiling: 95.0,
            per_agent_window: 10,
            trend_min_samples: 5,
            trend_short_window: 3,
            trend_factor: 0.2,
            harder_factor: 0.5,
            max_harder_adjustment: 10.0,
            easier_factor: 0.3,
            max_easier_adjustment: 5.0,
            personal_deviation_trigger: 10.0,
            personal_raise_cap: 0.15,
            personal_lower_cap: 0.10,
            level_step: 0.05,
            range_overrides: Vec::new(),
        }
    }
}

/// Parameters of the response scoring system (0-1 scale).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ScoringConfig {
    /// Dimension weights per complexity tier
    pub weights: ScoringWeights,
    /// Additive dimension bonuses per AI identity (lowercase keys)
    pub ai_bonuses: BTreeMap<String, BTreeMap<ScoringDimension, f64>>,
    /// Pass threshold per difficulty before AI offsets
    pub base_thresholds: BTreeMap<Complexity, f64>,
    /// Threshold offsets per AI identity (lowercase keys)
    pub ai_threshold_offsets: BTreeMap<String, f64>,
    pub threshold_floor: f64,
    pub threshold_ceiling: f64,
    /// Half-width of the uniform jitter added to final scores
    pub jitter: f64,
    /// Half-width of the jitter added to fallback scores
    pub fallback_jitter: f64,
    /// Disable to make evaluations deterministic
    pub jitter_enabled: bool,
    /// Seed for reproducible jitter
    pub jitter_seed: Option<u64>,
    /// Evaluations retained for analytics
    pub history_capacity: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            ai_bonuses: default_ai_bonuses(),
            base_thresholds: default_base_thresholds(),
            ai_threshold_offsets: default_ai_threshold_offsets(),
            threshold_floor: 0.5,
            threshold_ceiling: 0.95,
            jitter: 0.02,
            fallback_jitter: 0.05,
            jitter_enabled: true,
            jitter_seed: None,
            history_capacity: 1000,
        }
    }
}

fn default_ai_bonuses() -> BTreeMap<String, BTreeMap<ScoringDimension, f64>> {
    use ScoringDimension::{CodeQuality, Efficiency, Innovation, Performance, ProblemSolving, Security};

    let entries: [(&str, &[(ScoringDimension, f64)]); 4] = [
        ("imperium", &[(Innovation, 0.1), (Efficiency, 0.05)]),
        ("guardian", &[(Security, 0.15), (CodeQuality, 0.05)]),
        ("sandbox", &[(ProblemSolving, 0.1)]),
        ("conquest", &[(Performance, 0.1)]),
    ];
    entries
        .into_iter()
        .map(|(ai, bonuses)| (ai.to_string(), bonuses.iter().copied().collect()))
        .collect()
}

fn default_base_thresholds() -> BTreeMap<Complexity, f64> {
    [
        (Complexity::Basic, 0.6),
        (Complexity::Intermediate, 0.65),
        (Complexity::Advanced, 0.7),
        (Complexity::Expert, 0.75),
        (Complexity::Master, 0.8),
    ]
    .into_iter()
    .collect()
}

fn default_ai_threshold_offsets() -> BTreeMap<String, f64> {
    [("imperium", 0.05), ("guardian", 0.03), ("sandbox", 0.0), ("conquest", 0.02)]
        .into_iter()
        .map(|(ai, offset)| (ai.to_string(), offset))
        .collect()
}
