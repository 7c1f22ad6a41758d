//! `custodes evaluate`

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

use super::{parse_complexity, CommandContext};
use crate::adapters::memory::jitter_source;
use crate::cli::output::{list_table, output, percent, CommandOutput};
use crate::domain::models::{Complexity, EvaluationResult};
use crate::services::{IntelligentScoringSystem, ScoringAnalytics};

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Difficulty tier the responses were written for
    #[arg(short, long, value_parser = parse_complexity, default_value = "basic")]
    pub difficulty: Complexity,

    /// Identity of the agent that wrote the responses
    #[arg(long, default_value = "unknown")]
    pub ai: String,

    /// Response files; reads stdin when none are given
    pub files: Vec<PathBuf>,

    /// Disable score jitter
    #[arg(long, conflicts_with = "seed")]
    pub no_jitter: bool,

    /// Seed the jitter source for reproducible scores
    #[arg(long)]
    pub seed: Option<u64>,

    /// Append analytics over every evaluated response
    #[arg(long)]
    pub summary: bool,
}

#[derive(Debug, Serialize)]
pub struct EvaluatedResponse {
    /// File name, or "-" for stdin
    pub source: String,
    #[serde(flatten)]
    pub result: EvaluationResult,
}

#[derive(Debug, Serialize)]
pub struct EvaluateOutput {
    pub evaluations: Vec<EvaluatedResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics: Option<ScoringAnalytics>,
}

impl EvaluatedResponse {
    fn describe(&self) -> String {
        let r = &self.result;
        let verdict = if r.passed { "PASS" } else { "FAIL" };
        let mut lines = vec![format!(
            "{}: {verdict} {:.3} (threshold {:.2}, {}, {})",
            self.source,
            r.final_score,
            r.threshold,
            r.difficulty,
            r.assessment().as_str()
        )];
        if let Some(reason) = &r.fallback_reason {
            lines.push(format!("  fallback: {reason}"));
        }

        let mut table = list_table(&["dimension", "raw", "adjusted"]);
        for (dimension, raw) in &r.dimension_scores {
            let adjusted = r.adjusted_scores.get(dimension).copied().unwrap_or(*raw);
            table.add_row(vec![
                dimension.label(),
                format!("{raw:.2}"),
                format!("{adjusted:.2}"),
            ]);
        }
        lines.push(table.to_string());

        let feedback = &r.feedback;
        lines.push(format!("  {}", feedback.overall_assessment));
        for (title, items) in [
            ("strengths", &feedback.strengths),
            ("improve", &feedback.areas_for_improvement),
            ("recommend", &feedback.specific_recommendations),
        ] {
            if !items.is_empty() {
                lines.push(format!("  {title}: {}", items.join("; ")));
            }
        }
        lines.join("\n")
    }
}

fn describe_analytics(analytics: &ScoringAnalytics) -> String {
    let d = &analytics.score_distribution;
    let mut table = list_table(&["agent", "evaluations", "average"]);
    for (ai, stats) in &analytics.ai_performance {
        table.add_row(vec![
            ai.clone(),
            stats.total_evaluations.to_string(),
            percent(stats.average_score),
        ]);
    }
    format!(
        "Summary: {} evaluation(s), average {}\n\
         Distribution: excellent {}, very good {}, good {}, satisfactory {}, needs improvement {}\n{table}",
        analytics.total_evaluations,
        percent(analytics.average_score),
        d.excellent,
        d.very_good,
        d.good,
        d.satisfactory,
        d.needs_improvement,
    )
}

impl CommandOutput for EvaluateOutput {
    fn to_human(&self) -> String {
        let mut sections: Vec<String> =
            self.evaluations.iter().map(EvaluatedResponse::describe).collect();
        if let Some(analytics) = &self.analytics {
            sections.push(describe_analytics(analytics));
        }
        sections.join("\n\n")
    }
}

async fn read_responses(files: &[PathBuf]) -> Result<Vec<(String, String)>> {
    if files.is_empty() {
        let mut body = String::new();
        tokio::io::stdin()
            .read_to_string(&mut body)
            .await
            .context("Failed to read response from stdin")?;
        return Ok(vec![("-".to_string(), body)]);
    }

    let mut responses = Vec::with_capacity(files.len());
    for path in files {
        let body = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        responses.push((path.display().to_string(), body));
    }
    Ok(responses)
}

pub async fn execute(args: EvaluateArgs, ctx: &CommandContext) -> Result<()> {
    let mut scoring = ctx.config.scoring.clone();
    if args.no_jitter {
        scoring.jitter_enabled = false;
    }
    if let Some(seed) = args.seed {
        scoring.jitter_enabled = true;
        scoring.jitter_seed = Some(seed);
    }

    let system = IntelligentScoringSystem::new(&scoring, jitter_source(&scoring));
    let responses = read_responses(&args.files).await?;

    let mut evaluations = Vec::with_capacity(responses.len());
    for (source, body) in responses {
        let result = system
            .evaluate_ai_response(&body, args.difficulty, &args.ai)
            .await;
        evaluations.push(EvaluatedResponse { source, result });
    }

    let analytics = if args.summary {
        system.get_scoring_analytics().await
    } else {
        None
    };

    output(&EvaluateOutput { evaluations, analytics }, ctx.json);
    Ok(())
}
