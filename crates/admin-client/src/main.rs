//! coop-admin command-line client
//!
//! Logs go to stderr; command output goes to stdout.

use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coop_admin::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coop_admin=info,coop_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("Failed to install log subscriber")?;

    let cli = Cli::parse();

    if let Err(e) = cli::run(cli).await {
        tracing::debug!("Command failed: {:?}", e);
        eprintln!("Error: {}", e.user_message());
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
