//! CLI command implementations.

pub mod agents;
pub mod config;
pub mod evaluate;
pub mod level;
pub mod record;
pub mod threshold;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::adapters::sqlite::{initialize_database, SqliteMetricsStore};
use crate::domain::models::{Complexity, Config, TestType};
use crate::infrastructure::config::ConfigLoader;

/// Loaded configuration shared by every command.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: Config,
    pub json: bool,
}

impl CommandContext {
    /// Load from `path` if given, otherwise from the project config files.
    pub fn load(path: Option<&Path>, json: bool) -> Result<Self> {
        let config = match path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };
        Ok(Self { config, json })
    }

    /// Open the metrics database, applying pending migrations.
    pub async fn metrics_store(&self) -> Result<Arc<SqliteMetricsStore>> {
        let pool = initialize_database(&self.config.database)
            .await
            .with_context(|| format!("Failed to open database at {}", self.config.database.path))?;
        Ok(Arc::new(SqliteMetricsStore::new(pool)))
    }
}

pub(crate) fn parse_test_type(s: &str) -> Result<TestType, String> {
    TestType::from_str(s).ok_or_else(|| {
        let valid: Vec<&str> = TestType::ALL.iter().map(TestType::as_str).collect();
        format!("unknown test type '{s}'; expected one of: {}", valid.join(", "))
    })
}

pub(crate) fn parse_complexity(s: &str) -> Result<Complexity, String> {
    Complexity::from_str(s).ok_or_else(|| {
        let valid: Vec<&str> = Complexity::ALL.iter().map(Complexity::as_str).collect();
        format!("unknown complexity '{s}'; expected one of: {}", valid.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_test_type_accepts_dashes() {
        assert_eq!(parse_test_type("code-quality"), Ok(TestType::CodeQuality));
        assert!(parse_test_type("poetry").unwrap_err().contains("code_quality"));
    }

    #[test]
    fn test_parse_complexity() {
        assert_eq!(parse_complexity("Expert"), Ok(Complexity::Expert));
        assert!(parse_complexity("legendary").is_err());
    }
}
