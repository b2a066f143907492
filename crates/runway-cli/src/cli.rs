//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Runway - Burn, runway and cost-cutting analysis for startups
#[derive(Parser)]
#[command(name = "runway")]
#[command(about = "Startup runway analytics from a transaction CSV", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ~/.local/share/runway/config/runway.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a transaction CSV and summarize its contents
    Import {
        /// CSV file with date, amount and category columns
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show burn rate, runway and expense breakdown
    Metrics {
        /// CSV file with date, amount and category columns
        #[arg(short, long)]
        file: PathBuf,

        /// Cash on hand (defaults to the configured balance)
        #[arg(long)]
        cash_balance: Option<f64>,

        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build a cost-cutting plan that extends runway
    Optimize {
        /// CSV file with date, amount and category columns
        #[arg(short, long)]
        file: PathBuf,

        /// Months to extend runway by
        #[arg(short, long)]
        months: f64,

        /// Cash on hand (defaults to the configured balance)
        #[arg(long)]
        cash_balance: Option<f64>,

        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Flag categories whose latest month is out of line with their history
    Anomalies {
        /// CSV file with date, amount and category columns
        #[arg(short, long)]
        file: PathBuf,

        /// Z-score above which a category is flagged (defaults to the configured threshold)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Allowed CORS origin (repeatable)
        #[arg(long = "allow-origin")]
        allow_origin: Vec<String>,
    },
}
