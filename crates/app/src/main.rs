//! Relay - Main Entry Point
//!
//! Loads settings, wires the dispatcher and runs one command.

mod app;
mod cli;

use anyhow::Result;
use clap::Parser;
use relay_infrastructure::load_settings;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only command output.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
        settings.validate()?;
    }

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %settings.base_url,
        "starting relay"
    );

    App::build(settings).await?.run(cli.command).await
}
