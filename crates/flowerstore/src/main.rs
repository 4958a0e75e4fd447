use anyhow::Result;
use clap::Parser;
use flowerstore::cli::{self, Cli, ux};
use flowerstore::log::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose
        && let Err(e) = setup_logging()
    {
        ux::present_error(e.context("Failed to set up logging"));
    }

    if let Err(e) = cli::run(&cli).await {
        ux::present_error(e);
        std::process::exit(1);
    }
    Ok(())
}
