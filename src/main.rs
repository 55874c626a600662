//! npsites - Browse national park sites by state and find places nearby
//!
//! Scrapes the park service site for the sites in a state, looks up points of
//! interest near a chosen site, and caches every response on disk.

use clap::Parser;
use std::io;
use std::process::ExitCode;

use npsites::app::App;
use npsites::cli::{Cli, Settings};
use npsites::logging;

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_cli(&cli)?;
    logging::init();
    tracing::debug!(cache_file = %settings.cache_file.display(), "Starting session");

    let mut app = App::new(&settings);
    let stdin = io::stdin();
    app.run(stdin.lock(), io::stdout()).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
