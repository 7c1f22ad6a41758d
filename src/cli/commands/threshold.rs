//! `custodes threshold`

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::{parse_complexity, parse_test_type, CommandContext};
use crate::cli::output::{list_table, output, CommandOutput};
use crate::domain::models::{Complexity, TestType};
use crate::services::{AdaptiveThresholdService, ThresholdComputation};

#[derive(Args, Debug)]
pub struct ThresholdArgs {
    /// Test type, e.g. code_quality
    #[arg(short, long, value_parser = parse_test_type)]
    pub test_type: TestType,

    /// Complexity tier: basic, intermediate, advanced, expert, master
    #[arg(short = 'C', long, value_parser = parse_complexity)]
    pub complexity: Complexity,

    /// Personalise the threshold for one agent
    #[arg(long)]
    pub ai: Option<String>,

    /// Show how the threshold was derived
    #[arg(long)]
    pub explain: bool,
}

#[derive(Debug, Serialize)]
pub struct ThresholdOutput {
    #[serde(flatten)]
    pub computation: ThresholdComputation,
    #[serde(skip)]
    pub explain: bool,
}

impl CommandOutput for ThresholdOutput {
    fn to_human(&self) -> String {
        let c = &self.computation;
        let subject = c
            .ai_identity
            .as_deref()
            .map(|ai| format!(" for {ai}"))
            .unwrap_or_default();
        let headline = format!(
            "Threshold for {}/{}{}: {}",
            c.test_type, c.complexity, subject, c.threshold
        );
        if !self.explain {
            return headline;
        }

        let mut table = list_table(&["factor", "value"]);
        table.add_row(vec![
            "static range".to_string(),
            format!("{:.0}-{:.0}", c.range.minimum, c.range.maximum),
        ]);
        if let Some(stats) = &c.statistics {
            table.add_row(vec!["samples".to_string(), stats.count.to_string()]);
            table.add_row(vec!["mean".to_string(), format!("{:.2}", stats.mean)]);
            table.add_row(vec!["std dev".to_string(), format!("{:.2}", stats.std_dev)]);
            if let Some(trend) = stats.trend {
                table.add_row(vec!["trend".to_string(), format!("{trend:+.2}")]);
            }
        }
        table.add_row(vec![
            "adjustment".to_string(),
            format!("{:?}", c.adjustment).to_lowercase(),
        ]);
        if let Some(p) = &c.personalization {
            table.add_row(vec!["agent mean".to_string(), format!("{:.2}", p.agent_mean)]);
            table.add_row(vec![
                "deviation factor".to_string(),
                format!("{:.3}", p.deviation_factor),
            ]);
            table.add_row(vec![
                "level factor".to_string(),
                format!("{:.3} (level {})", p.level_factor, p.level),
            ]);
        }
        if let Some(reason) = &c.fallback_reason {
            table.add_row(vec!["fallback".to_string(), reason.clone()]);
        }

        format!("{headline}\n\n{table}")
    }
}

pub async fn execute(args: ThresholdArgs, ctx: &CommandContext) -> Result<()> {
    let store = ctx.metrics_store().await?;
    let service = AdaptiveThresholdService::from_config(store, &ctx.config.threshold);

    let computation = service
        .explain_threshold(args.test_type, args.complexity, args.ai.as_deref())
        .await;

    output(
        &ThresholdOutput {
            computation,
            explain: args.explain,
        },
        ctx.json,
    );
    Ok(())
}
