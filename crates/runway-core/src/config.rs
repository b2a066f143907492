//! Runway configuration
//!
//! Tunable constants for the optimizer and anomaly detector, plus the default
//! cash balance used when a caller does not supply one.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path (`--config`), or the override in the data dir
//!    (~/.local/share/runway/config/runway.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Override files only need the keys they change.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/runway.toml");

/// A fixed, data-independent saving tried after category cuts run out
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FallbackAction {
    pub description: String,
    pub monthly_savings: f64,
}

impl FallbackAction {
    pub fn new(description: impl Into<String>, monthly_savings: f64) -> Self {
        Self {
            description: description.into(),
            monthly_savings,
        }
    }
}

/// Greedy optimizer settings
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerConfig {
    /// Fractions tried per category, strictly increasing
    pub cut_levels: Vec<f64>,
    /// Applied in order once every category cut has been tried
    pub fallback_actions: Vec<FallbackAction>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            cut_levels: vec![0.10, 0.20, 0.30],
            fallback_actions: vec![
                FallbackAction::new("Delay 1 hire", 8000.0),
                FallbackAction::new("Renegotiate cloud contract", 1500.0),
            ],
        }
    }
}

/// Anomaly detector settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyConfig {
    /// |z| above this is anomalous
    pub threshold: f64,
    /// |z| above this is high severity
    pub high_severity_z: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            threshold: 1.5,
            high_severity_z: 2.5,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RunwayConfig {
    pub default_cash_balance: f64,
    pub optimizer: OptimizerConfig,
    pub anomaly: AnomalyConfig,
}

impl Default for RunwayConfig {
    fn default() -> Self {
        Self {
            default_cash_balance: 400_000.0,
            optimizer: OptimizerConfig::default(),
            anomaly: AnomalyConfig::default(),
        }
    }
}

impl RunwayConfig {
    /// Load from the default override location, falling back to embedded defaults
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from an explicit file; the file must exist
    pub fn from_path(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    /// Parse config from TOML content layered over the defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }

    /// Check that every value is usable by the analyses
    pub fn validate(&self) -> Result<()> {
        if !is_positive(self.default_cash_balance) {
            return Err(Error::Config(format!(
                "defaults.cash_balance must be positive, got {}",
                self.default_cash_balance
            )));
        }

        if self.optimizer.cut_levels.is_empty() {
            return Err(Error::Config("optimizer.cut_levels must not be empty".into()));
        }
        for level in &self.optimizer.cut_levels {
            if !is_positive(*level) || *level >= 1.0 {
                return Err(Error::Config(format!(
                    "optimizer.cut_levels entries must be between 0 and 1, got {}",
                    level
                )));
            }
        }
        if self.optimizer.cut_levels.windows(2).any(|w| w[1] <= w[0]) {
            return Err(Error::Config(
                "optimizer.cut_levels must be strictly increasing".into(),
            ));
        }

        for action in &self.optimizer.fallback_actions {
            if action.description.trim().is_empty() {
                return Err(Error::Config(
                    "optimizer.fallback_actions entries need a description".into(),
                ));
            }
            if !(action.monthly_savings.is_finite() && action.monthly_savings >= 0.0) {
                return Err(Error::Config(format!(
                    "fallback action '{}' has negative savings",
                    action.description
                )));
            }
        }

        if !is_positive(self.anomaly.threshold) {
            return Err(Error::Config("anomaly.threshold must be positive".into()));
        }
        if !is_positive(self.anomaly.high_severity_z) {
            return Err(Error::Config("anomaly.high_severity_z must be positive".into()));
        }

        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("runway").join("config").join("runway.toml"))
}

/// Load configuration (override first, then default)
fn load_config(explicit_path: Option<&Path>) -> Result<RunwayConfig> {
    let content = if let Some(path) = explicit_path {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        debug!("Loading config from {}", path.display());
        fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
    } else {
        match default_config_path() {
            Some(default_path) if default_path.exists() => {
                debug!("Loading config override from {}", default_path.display());
                fs::read_to_string(&default_path)
                    .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
            }
            _ => DEFAULT_CONFIG.to_string(),
        }
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    defaults: Option<RawDefaults>,
    optimizer: Option<RawOptimizer>,
    anomaly: Option<RawAnomaly>,
}

#[derive(Debug, Deserialize)]
struct RawDefaults {
    cash_balance: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawOptimizer {
    cut_levels: Option<Vec<f64>>,
    fallback_actions: Option<Vec<FallbackAction>>,
}

#[derive(Debug, Deserialize)]
struct RawAnomaly {
    threshold: Option<f64>,
    high_severity_z: Option<f64>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<RunwayConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = RunwayConfig::default();

    if let Some(defaults) = raw.defaults {
        if let Some(cash) = defaults.cash_balance {
            config.default_cash_balance = cash;
        }
    }

    if let Some(optimizer) = raw.optimizer {
        if let Some(levels) = optimizer.cut_levels {
            config.optimizer.cut_levels = levels;
        }
        if let Some(actions) = optimizer.fallback_actions {
            config.optimizer.fallback_actions = actions;
        }
    }

    if let Some(anomaly) = raw.anomaly {
        if let Some(threshold) = anomaly.threshold {
            config.anomaly.threshold = threshold;
        }
        if let Some(high) = anomaly.high_severity_z {
            config.anomaly.high_severity_z = high;
        }
    }

    config.validate()?;
    Ok(config)
}
