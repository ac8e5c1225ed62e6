//! Copert - Interactive AI coding assistant
//!
//! CLI entry point.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod settings;

const VERBOSE_FILTER: &str = "copert=debug,copert_core=debug,copert_tools=debug,copert_llm=debug";
const QUIET_FILTER: &str = "copert=warn,copert_core=warn,copert_tools=warn,copert_llm=warn";

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.copert");
    let _ = dotenvy::dotenv();

    let cli = cli::Cli::parse();
    let mut settings = settings::load_settings()?;
    cli.apply_overrides(&mut settings);

    let default_filter = if settings.agent.verbose {
        VERBOSE_FILTER
    } else {
        QUIET_FILTER
    };
    // stderr keeps log lines out of the REPL transcript on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!(
        version = env!("CARGO_PKG_VERSION"),
        model = %settings.llm.model,
        max_iterations = settings.agent.max_iterations,
        "Starting Copert"
    );

    cli::run(cli, settings).await
}
