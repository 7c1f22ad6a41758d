use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project configuration, relative to the working directory
pub const PROJECT_CONFIG: &str = ".custodes/config.yaml";
/// Local overrides, relative to the working directory
pub const LOCAL_CONFIG: &str = ".custodes/local.yaml";
/// Prefix of environment overrides; `__` separates nested keys
pub const ENV_PREFIX: &str = "CUSTODES_";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["json", "pretty"];
const ROTATIONS: [&str; 3] = ["daily", "hourly", "never"];

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid {section} bounds: floor ({floor}) must be below ceiling ({ceiling}) within [{min}, {max}]")]
    InvalidThresholdBounds {
        section: &'static str,
        floor: f64,
        ceiling: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid scoring weights: {0}")]
    InvalidWeights(String),

    #[error("Invalid history_capacity: 0. Must be at least 1")]
    InvalidHistoryCapacity,

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .custodes/config.yaml (project config)
    /// 3. .custodes/local.yaml (project local overrides, optional)
    /// 4. Environment variables (CUSTODES_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(PROJECT_CONFIG))
            .merge(Yaml::file(LOCAL_CONFIG))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring environment
    /// overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    ///
    /// Weight tiers that sum below 1.0 are only logged; everything else
    /// listed in [`ConfigError`] is rejected.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        if !LOG_FORMATS.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }
        if !ROTATIONS.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        Self::validate_threshold(config)?;
        Self::validate_scoring(config)?;
        Ok(())
    }

    fn validate_threshold(config: &Config) -> Result<(), ConfigError> {
        let threshold = &config.threshold;
        check_bounds("threshold", threshold.floor, threshold.ceiling, 0.0, 100.0)?;

        if threshold.per_agent_window == 0 || threshold.trend_short_window == 0 {
            return Err(ConfigError::ValidationFailed(
                "threshold windows must hold at least one score".to_string(),
            ));
        }

        let factors = [
            ("harder_factor", threshold.harder_factor),
            ("max_harder_adjustment", threshold.max_harder_adjustment),
            ("easier_factor", threshold.easier_factor),
            ("max_easier_adjustment", threshold.max_easier_adjustment),
            ("trend_factor", threshold.trend_factor),
            ("personal_raise_cap", threshold.personal_raise_cap),
            ("personal_lower_cap", threshold.personal_lower_cap),
            ("level_step", threshold.level_step),
        ];
        if let Some((name, value)) = factors
            .iter()
            .find(|(_, value)| !value.is_finite() || *value < 0.0)
        {
            return Err(ConfigError::ValidationFailed(format!(
                "threshold.{name} must be a non-negative number, got {value}"
            )));
        }

        for range in &threshold.range_overrides {
            if !(range.minimum.is_finite() && range.maximum.is_finite())
                || range.minimum > range.maximum
            {
                return Err(ConfigError::ValidationFailed(format!(
                    "range override for {}/{} has minimum {} above maximum {}",
                    range.test_type, range.complexity, range.minimum, range.maximum
                )));
            }
        }
        Ok(())
    }

    fn validate_scoring(config: &Config) -> Result<(), ConfigError> {
        let scoring = &config.scoring;
        check_bounds(
            "scoring threshold",
            scoring.threshold_floor,
            scoring.threshold_ceiling,
            0.0,
            1.0,
        )?;

        if scoring.history_capacity == 0 {
            return Err(ConfigError::InvalidHistoryCapacity);
        }

        for (name, value) in [("jitter", scoring.jitter), ("fallback_jitter", scoring.fallback_jitter)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::ValidationFailed(format!(
                    "scoring.{name} must be a non-negative number, got {value}"
                )));
            }
        }

        let non_finite = scoring
            .ai_bonuses
            .values()
            .flat_map(|bonuses| bonuses.values())
            .chain(scoring.ai_threshold_offsets.values())
            .chain(scoring.base_thresholds.values())
            .any(|value| !value.is_finite());
        if non_finite {
            return Err(ConfigError::ValidationFailed(
                "scoring bonuses, offsets and base thresholds must be finite".to_string(),
            ));
        }

        let issues = scoring.weights.validate();
        let errors: Vec<String> = issues
            .iter()
            .filter(|issue| issue.is_error())
            .map(ToString::to_string)
            .collect();
        if !errors.is_empty() {
            return Err(ConfigError::InvalidWeights(errors.join("; ")));
        }
        for issue in issues.iter().filter(|issue| !issue.is_error()) {
            tracing::warn!(%issue, "Scoring weight table warning");
        }
        Ok(())
    }
}

fn check_bounds(
    section: &'static str,
    floor: f64,
    ceiling: f64,
    min: f64,
    max: f64,
) -> Result<(), ConfigError> {
    let valid = floor.is_finite()
        && ceiling.is_finite()
        && floor >= min
        && ceiling <= max
        && floor < ceiling;
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidThresholdBounds {
            section,
            floor,
            ceiling,
            min,
            max,
        })
    }
}
