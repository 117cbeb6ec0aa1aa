#[path = "llm-audit/args.rs"]
mod args;
#[path = "llm-audit/commands.rs"]
mod commands;
#[path = "llm-audit/logging.rs"]
mod logging;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = args::CliArgs::parse();
    let _logger = logging::init_with_env(&args.log_level, None)?;
    commands::run(args).await
}
