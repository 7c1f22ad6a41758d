//! `custodes config`

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use super::CommandContext;
use crate::cli::output::{list_table, output, CommandOutput};
use crate::domain::models::{Complexity, ThresholdTable, WeightIssue};
use crate::services::{ThresholdPolicy, DEFAULT_BASE_THRESHOLD};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Report weight table issues and the effective threshold ranges
    Check,
    /// Print the effective configuration as YAML
    Show,
}

#[derive(Debug, Serialize)]
pub struct RangeRow {
    pub test_type: String,
    pub complexity: Complexity,
    pub minimum: f64,
    pub maximum: f64,
}

#[derive(Debug, Serialize)]
pub struct TierThreshold {
    pub difficulty: Complexity,
    pub threshold: f64,
}

#[derive(Debug, Serialize)]
pub struct ConfigCheckOutput {
    pub weight_issues: Vec<WeightIssue>,
    pub scoring_thresholds: Vec<TierThreshold>,
    pub ranges: Vec<RangeRow>,
}

impl CommandOutput for ConfigCheckOutput {
    fn to_human(&self) -> String {
        let mut sections = Vec::new();

        if self.weight_issues.is_empty() {
            sections.push("Scoring weights: ok".to_string());
        } else {
            let issues: Vec<String> = self
                .weight_issues
                .iter()
                .map(|issue| {
                    let kind = if issue.is_error() { "error" } else { "warning" };
                    format!("  {kind}: {issue}")
                })
                .collect();
            sections.push(format!("Scoring weights:\n{}", issues.join("\n")));
        }

        let tiers: Vec<String> = self
            .scoring_thresholds
            .iter()
            .map(|t| format!("{} {:.2}", t.difficulty, t.threshold))
            .collect();
        sections.push(format!("Scoring thresholds: {}", tiers.join(", ")));

        let mut table = list_table(&["test type", "complexity", "min", "max"]);
        for row in &self.ranges {
            table.add_row(vec![
                row.test_type.clone(),
                row.complexity.to_string(),
                format!("{:.0}", row.minimum),
                format!("{:.0}", row.maximum),
            ]);
        }
        sections.push(format!("Threshold ranges:\n{table}"));

        sections.join("\n\n")
    }
}

#[derive(Debug, Serialize)]
pub struct ConfigShowOutput {
    #[serde(flatten)]
    pub config: crate::domain::models::Config,
    #[serde(skip)]
    pub yaml: String,
}

impl CommandOutput for ConfigShowOutput {
    fn to_human(&self) -> String {
        self.yaml.trim_end().to_string()
    }
}

pub async fn execute(args: ConfigArgs, ctx: &CommandContext) -> Result<()> {
    match args.command {
        ConfigCommands::Check => {
            let scoring = &ctx.config.scoring;
            let policy = ThresholdPolicy::unit(scoring);
            let scoring_thresholds = Complexity::ALL
                .into_iter()
                .map(|difficulty| TierThreshold {
                    difficulty,
                    threshold: policy.clamp(
                        scoring
                            .base_thresholds
                            .get(&difficulty)
                            .copied()
                            .unwrap_or(DEFAULT_BASE_THRESHOLD),
                    ),
                })
                .collect();
            let ranges = ThresholdTable::with_overrides(&ctx.config.threshold.range_overrides)
                .iter()
                .map(|(test_type, complexity, range)| RangeRow {
                    test_type: test_type.to_string(),
                    complexity,
                    minimum: range.minimum,
                    maximum: range.maximum,
                })
                .collect();

            output(
                &ConfigCheckOutput {
                    weight_issues: scoring.weights.validate(),
                    scoring_thresholds,
                    ranges,
                },
                ctx.json,
            );
        }
        ConfigCommands::Show => {
            let yaml = serde_yaml::to_string(&ctx.config)
                .context("Failed to serialize configuration")?;
            output(
                &ConfigShowOutput {
                    config: ctx.config.clone(),
                    yaml,
                },
                ctx.json,
            );
        }
    }
    Ok(())
}
