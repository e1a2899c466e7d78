#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod command;
mod config;
mod telemetry;

use std::process;

use anyhow::Context;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "szamba_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "szamba_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "szamba_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "szamba_cli::command";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::debug!(
            target: TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing()?;
    cli.log();

    let config = cli.storage.provider_config();
    config
        .validate()
        .context("invalid storage configuration")?;

    let provider = config
        .connect()
        .with_context(|| format!("failed to connect to {} storage", config.backend_name()))?;

    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        provider = provider.identifier(),
        command = cli.command.name(),
        "file provider ready"
    );

    let outcome = cli.command.execute(provider.as_ref()).await?;
    outcome.report()
}
