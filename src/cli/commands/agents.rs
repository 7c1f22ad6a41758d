//! `custodes agents`

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use super::CommandContext;
use crate::cli::output::{list_table, output, percent, CommandOutput};
use crate::domain::models::AgentMetrics;
use crate::domain::ports::AgentMetricsStore;

#[derive(Args, Debug)]
pub struct AgentsArgs {}

#[derive(Debug, Serialize)]
pub struct AgentSummary {
    pub ai_identity: String,
    pub level: u32,
    pub records: usize,
    pub pass_rate: Option<f64>,
    pub last_test: Option<DateTime<Utc>>,
}

impl From<&AgentMetrics> for AgentSummary {
    fn from(metrics: &AgentMetrics) -> Self {
        Self {
            ai_identity: metrics.agent_type.clone(),
            level: metrics.level,
            records: metrics.test_history.len(),
            pass_rate: metrics.pass_rate(),
            last_test: metrics.test_history.last().map(|r| r.timestamp),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AgentListOutput {
    pub agents: Vec<AgentSummary>,
    pub total: usize,
}

impl CommandOutput for AgentListOutput {
    fn to_human(&self) -> String {
        if self.agents.is_empty() {
            return "No agents found.".to_string();
        }

        let mut table = list_table(&["agent", "level", "records", "pass rate", "last test"]);
        for agent in &self.agents {
            table.add_row(vec![
                agent.ai_identity.clone(),
                agent.level.to_string(),
                agent.records.to_string(),
                agent.pass_rate.map_or_else(|| "-".to_string(), percent),
                agent
                    .last_test
                    .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string()),
            ]);
        }
        format!("{} agent(s):\n{table}", self.total)
    }
}

pub async fn execute(_args: AgentsArgs, ctx: &CommandContext) -> Result<()> {
    let store = ctx.metrics_store().await?;
    let all = store.get_all_agent_metrics().await?;

    let mut agents: Vec<AgentSummary> = all.values().map(AgentSummary::from).collect();
    agents.sort_by(|a, b| a.ai_identity.cmp(&b.ai_identity));

    output(
        &AgentListOutput {
            total: agents.len(),
            agents,
        },
        ctx.json,
    );
    Ok(())
}
