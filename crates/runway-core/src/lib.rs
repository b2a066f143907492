//! Runway Core Library
//!
//! Shared functionality for the runway analytics engine:
//! - CSV import into a normalized transaction table
//! - Metrics engine (burn rate, runway, expense breakdown)
//! - Greedy optimizer that builds a cost-cutting plan
//! - Z-score anomaly detection over monthly category spend
//! - Layered configuration for the tunable constants
//!
//! The analyses are pure functions over a borrowed `&[TransactionRecord]`.
//! They never hold on to the table and never modify it.

pub mod anomaly;
pub mod config;
pub mod error;
pub mod import;
pub mod metrics;
pub mod models;
pub mod optimizer;
pub mod stats;
pub mod validate;

pub use anomaly::{detect_anomalies, AnomalyDetector};
pub use config::{AnomalyConfig, FallbackAction, OptimizerConfig, RunwayConfig};
pub use error::{Error, Result};
pub use import::parse_transactions_csv;
pub use metrics::{compute_metrics, monthly_burn, runway_months};
pub use models::*;
pub use optimizer::{optimize, RunwayOptimizer};
pub use validate::require_positive;
