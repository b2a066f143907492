//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analysis` - Metrics, optimize and anomaly commands
//! - `import` - CSV validation and summary
//! - `serve` - Web server command
//!
//! Shared helpers for loading settings and reading the transaction CSV live here.

pub mod analysis;
pub mod import;
pub mod serve;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use runway_core::{parse_transactions_csv, ImportSummary, RunwayConfig, TransactionRecord};
use tracing::debug;

// Re-export command functions for main.rs
pub use analysis::*;
pub use import::*;
pub use serve::*;

/// Load settings from an explicit file, the override location, or the embedded defaults
pub fn load_settings(path: Option<&Path>) -> Result<RunwayConfig> {
    match path {
        Some(path) => RunwayConfig::from_path(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => RunwayConfig::load().context("Failed to load config"),
    }
}

/// Read and normalize a transaction CSV
pub fn read_table(file: &Path) -> Result<(Vec<TransactionRecord>, ImportSummary)> {
    let bytes =
        fs::read(file).with_context(|| format!("Failed to open file: {}", file.display()))?;
    let (records, summary) = parse_transactions_csv(&bytes)
        .with_context(|| format!("Failed to import {}", file.display()))?;

    debug!("Loaded {} transactions from {}", records.len(), file.display());
    Ok((records, summary))
}

/// Human-readable runway, where `None` means burn is not positive
pub fn format_runway(runway: Option<f64>) -> String {
    match runway {
        Some(months) => format!("{:.2} months", months),
        None => "infinite".to_string(),
    }
}
