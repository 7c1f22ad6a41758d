//! Custodes CLI entry point.

use clap::Parser;

use custodes::cli::commands::{self, CommandContext};
use custodes::cli::{Cli, Commands};
use custodes::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let ctx = match CommandContext::load(cli.config.as_deref(), cli.json) {
        Ok(ctx) => ctx,
        Err(err) => custodes::cli::handle_error(err, cli.json),
    };

    // Held for the whole run so buffered file output is flushed on exit.
    let logger = LogConfig::try_from(&ctx.config.logging).and_then(|c| LoggerImpl::init(&c));
    let _logger = match logger {
        Ok(logger) => logger,
        Err(err) => custodes::cli::handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Threshold(args) => commands::threshold::execute(args, &ctx).await,
        Commands::Record(args) => commands::record::execute(args, &ctx).await,
        Commands::Level(args) => commands::level::execute(args, &ctx).await,
        Commands::Agents(args) => commands::agents::execute(args, &ctx).await,
        Commands::Evaluate(args) => commands::evaluate::execute(args, &ctx).await,
        Commands::Config(args) => commands::config::execute(args, &ctx).await,
    };

    if let Err(err) = result {
        custodes::cli::handle_error(err, cli.json);
    }
}
