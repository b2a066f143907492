//! Runway CLI - Startup runway analytics
//!
//! Usage:
//!   runway import --file CSV                  Validate and summarize a CSV
//!   runway metrics --file CSV                 Burn, runway, expense breakdown
//!   runway optimize --file CSV --months 3     Cost-cutting plan
//!   runway anomalies --file CSV               Spending anomaly alerts
//!   runway serve --port 8000                  Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let settings = commands::load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Import { file } => commands::cmd_import(&file),
        Commands::Metrics {
            file,
            cash_balance,
            json,
        } => commands::cmd_metrics(&settings, &file, cash_balance, json),
        Commands::Optimize {
            file,
            months,
            cash_balance,
            json,
        } => commands::cmd_optimize(&settings, &file, months, cash_balance, json),
        Commands::Anomalies {
            file,
            threshold,
            json,
        } => commands::cmd_anomalies(&settings, &file, threshold, json),
        Commands::Serve {
            port,
            host,
            allow_origin,
        } => commands::cmd_serve(settings, &host, port, allow_origin).await,
    }
}
