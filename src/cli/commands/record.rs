//! `custodes record`

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::{parse_complexity, parse_test_type, CommandContext};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Complexity, TestRecord, TestType};
use crate::domain::ports::AgentMetricsStore;
use crate::services::AdaptiveThresholdService;

#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Agent identity
    #[arg(long)]
    pub ai: String,

    /// Test type, e.g. security_awareness
    #[arg(short, long, value_parser = parse_test_type)]
    pub test_type: TestType,

    /// Complexity tier
    #[arg(short = 'C', long, value_parser = parse_complexity)]
    pub complexity: Complexity,

    /// Score on the 0-100 scale
    #[arg(short, long, value_parser = parse_score)]
    pub score: f64,

    /// Mark the test as passed; otherwise the score is judged against the
    /// agent's current adaptive threshold
    #[arg(long)]
    pub passed: bool,
}

fn parse_score(s: &str) -> Result<f64, String> {
    let score: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if (0.0..=100.0).contains(&score) {
        Ok(score)
    } else {
        Err(format!("score {score} is outside 0-100"))
    }
}

#[derive(Debug, Serialize)]
pub struct RecordOutput {
    pub record: TestRecord,
    /// Threshold the score was judged against, when `--passed` was not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judged_against: Option<u32>,
}

impl CommandOutput for RecordOutput {
    fn to_human(&self) -> String {
        let r = &self.record;
        let verdict = if r.passed { "passed" } else { "failed" };
        let basis = self
            .judged_against
            .map(|t| format!(" (threshold {t})"))
            .unwrap_or_default();
        format!(
            "Recorded {} {}/{} score {:.1} for {}: {verdict}{basis}",
            r.id, r.test_type, r.complexity, r.score, r.ai_identifier
        )
    }
}

pub async fn execute(args: RecordArgs, ctx: &CommandContext) -> Result<()> {
    let store = ctx.metrics_store().await?;

    let (passed, judged_against) = if args.passed {
        (true, None)
    } else {
        let service = AdaptiveThresholdService::from_config(store.clone(), &ctx.config.threshold);
        let threshold = service
            .get_ai_specific_threshold(args.test_type, args.complexity, &args.ai)
            .await;
        (args.score >= f64::from(threshold), Some(threshold))
    };

    let record = TestRecord::new(args.ai, args.test_type, args.complexity, args.score, passed);
    store.record_test(&record).await?;

    output(&RecordOutput { record, judged_against }, ctx.json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_score_bounds() {
        assert_eq!(parse_score("72.5"), Ok(72.5));
        assert!(parse_score("101").is_err());
        assert!(parse_score("-1").is_err());
        assert!(parse_score("high").is_err());
    }
}
