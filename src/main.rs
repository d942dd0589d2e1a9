mod cli;
mod controller;
mod engine;
mod error;
mod logging;
mod model;
#[cfg(feature = "tui")]
mod orchestrator;
mod text_summary;
#[cfg(feature = "tui")]
mod tui;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    logging::init_tracing();
    let is_headless = args.json || args.text;

    match cli::run(args).await {
        // Headless modes report failure through the exit code.
        Ok(cli::Outcome::Failed) => std::process::exit(1),
        Ok(cli::Outcome::Completed) => {
            if is_headless {
                std::process::exit(0);
            }
            Ok(())
        }
        Err(e) => Err(e),
    }
}
