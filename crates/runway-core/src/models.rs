//! Domain models for Runway

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Category assigned when the source row has none
pub const DEFAULT_CATEGORY: &str = "Other";

/// A normalized transaction row
///
/// Produced by [`crate::import`]; the analyses only ever borrow a slice of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    /// Negative = expense, positive = revenue
    pub amount: f64,
    /// Canonical category name, never empty
    pub category: String,
    /// Calendar month of `date` as "YYYY-MM"
    pub month: String,
}

impl TransactionRecord {
    /// Build a record, deriving the month key from the date
    pub fn new(date: NaiveDate, amount: f64, category: impl Into<String>) -> Self {
        let category = category.into();
        let category = if category.trim().is_empty() {
            DEFAULT_CATEGORY.to_string()
        } else {
            category
        };

        Self {
            date,
            amount,
            category,
            month: month_key(date),
        }
    }

    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    pub fn is_revenue(&self) -> bool {
        self.amount > 0.0
    }
}

/// Format a date as its "YYYY-MM" month key
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// One category in the expense breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseLine {
    pub category: String,
    pub amount: f64,
    /// Share of total expense, 0-100
    pub pct: f64,
}

/// Burn, runway and expense breakdown for a transaction table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub cash_balance: f64,
    pub monthly_burn: f64,
    /// None when burn is zero or negative (infinite runway)
    pub runway_months: Option<f64>,
    pub expenses: Vec<ExpenseLine>,
    pub top_cost_drivers: Vec<ExpenseLine>,
    pub months_observed: Vec<String>,
}

/// A single step of a cost-cutting plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutAction {
    pub action: String,
    /// None for fixed fallback actions
    pub category: Option<String>,
    pub cut_pct: Option<f64>,
    pub monthly_savings_est: f64,
}

impl CutAction {
    pub fn category_cut(category: &str, cut_pct: f64, monthly_savings_est: f64) -> Self {
        // Rounded rather than truncated: 0.29 * 100 is 28.999... in f64
        Self {
            action: format!("Cut {} by {}%", category, (cut_pct * 100.0).round() as i64),
            category: Some(category.to_string()),
            cut_pct: Some(cut_pct),
            monthly_savings_est,
        }
    }

    pub fn fixed(description: &str, monthly_savings_est: f64) -> Self {
        Self {
            action: description.to_string(),
            category: None,
            cut_pct: None,
            monthly_savings_est,
        }
    }
}

/// Outcome of a runway optimization run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// None when runway was already infinite
    pub current_runway: Option<f64>,
    pub target_runway: Option<f64>,
    /// None when the plan makes runway infinite
    pub new_runway: Option<f64>,
    pub monthly_burn_before: f64,
    pub monthly_burn_after: f64,
    pub plan: Vec<CutAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl OptimizationResult {
    /// True when the plan reached its target (or made runway infinite)
    pub fn reached_target(&self) -> bool {
        match (self.new_runway, self.target_runway) {
            (None, _) => true,
            (Some(new), Some(target)) => new >= target,
            (Some(_), None) => false,
        }
    }
}

/// Severity of a spending anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalySeverity {
    Medium,
    High,
}

impl AnomalySeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Sort rank (lower sorts first)
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
        }
    }
}

impl std::str::FromStr for AnomalySeverity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

impl std::fmt::Display for AnomalySeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction of a spending change relative to the category mean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendDirection {
    Increase,
    Decrease,
}

impl SpendDirection {
    pub fn from_z_score(z: f64) -> Self {
        if z > 0.0 {
            Self::Increase
        } else {
            Self::Decrease
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increase => "increase",
            Self::Decrease => "decrease",
        }
    }
}

impl std::fmt::Display for SpendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-category statistics from the anomaly detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAnomalyReport {
    pub category: String,
    pub monthly_avg: f64,
    pub latest_month: String,
    pub latest_amount: f64,
    pub std_dev: f64,
    pub z_score: f64,
    pub is_anomaly: bool,
}

/// Alert raised for a category whose latest month is anomalous
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyAlert {
    pub category: String,
    pub severity: AnomalySeverity,
    pub message: String,
    pub normal_avg: f64,
    pub current: f64,
    pub pct_change: f64,
    pub z_score: f64,
}

/// Full output of the anomaly detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    /// High severity first, then by descending |z_score|
    pub alerts: Vec<AnomalyAlert>,
    pub categories_analyzed: usize,
    pub anomalies_found: usize,
    pub category_analysis: Vec<CategoryAnomalyReport>,
}

/// Counts reported after a CSV import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub rows: usize,
    pub months_detected: usize,
    pub categories_detected: usize,
}
