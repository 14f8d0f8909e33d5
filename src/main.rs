//! odrive - OneDrive command-line client
//!
//! Device-code OAuth login, token refresh and one Graph operation per
//! invocation.

mod app;
mod auth;
mod cli;
mod client;
mod config;
mod drive;
mod error;
mod token;

#[cfg(test)]
mod testutil;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::app::App;
use crate::cli::Cli;
use crate::error::OdriveError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    if let Err(e) = run(&cli).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        if matches!(e, OdriveError::Usage(_)) {
            eprintln!("\nUse 'odrive --help' for usage information.");
        }
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: &Cli) -> error::Result<()> {
    let command = cli.command()?;
    let app = App::new()?;
    app.run(command).await
}
