use clap::Parser;
use eventflow::commands::Cli;
use eventflow::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    let cli = Cli::parse();
    info!("Starting eventflow");

    // Load configuration
    let config = startup::load_config().await?;

    startup::run(cli, config).await
}
