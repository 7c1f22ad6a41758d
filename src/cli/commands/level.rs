//! `custodes level`

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::CommandContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::ports::AgentMetricsStore;

#[derive(Args, Debug)]
pub struct LevelArgs {
    /// Agent identity
    #[arg(long)]
    pub ai: String,

    /// New level, starting at 1
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub level: u32,
}

#[derive(Debug, Serialize)]
pub struct LevelOutput {
    pub ai_identity: String,
    pub level: u32,
}

impl CommandOutput for LevelOutput {
    fn to_human(&self) -> String {
        format!("{} is now level {}", self.ai_identity, self.level)
    }
}

pub async fn execute(args: LevelArgs, ctx: &CommandContext) -> Result<()> {
    let store = ctx.metrics_store().await?;
    store.set_level(&args.ai, args.level).await?;

    output(
        &LevelOutput {
            ai_identity: args.ai,
            level: args.level,
        },
        ctx.json,
    );
    Ok(())
}
