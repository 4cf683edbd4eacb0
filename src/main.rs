use clap::Parser;

use social_users::cli::{Cli, execute_command, load_and_merge_config};
use social_users::logger::init_logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = load_and_merge_config(&cli)?;
    init_logger(&settings.logger)?;

    execute_command(&cli, settings).await.inspect_err(|e| {
        tracing::error!(error = %e, "Command failed");
    })
}
