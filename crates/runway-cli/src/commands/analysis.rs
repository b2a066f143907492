//! Metrics, optimize and anomaly command implementations

use std::fmt;
use std::path::Path;

use anyhow::Result;
use runway_core::stats::format_dollars;
use runway_core::{
    compute_metrics, require_positive, AnomalyDetector, AnomalyReport, AnomalySeverity,
    MetricsSnapshot, OptimizationResult, RunwayConfig, RunwayOptimizer,
};

use super::{format_runway, read_table};

pub fn cmd_metrics(
    settings: &RunwayConfig,
    file: &Path,
    cash_balance: Option<f64>,
    json: bool,
) -> Result<()> {
    let cash_balance = resolve_cash_balance(settings, cash_balance)?;
    let (table, _) = read_table(file)?;

    let snapshot = compute_metrics(&table, cash_balance);

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", MetricsView(&snapshot));
    }
    Ok(())
}

pub fn cmd_optimize(
    settings: &RunwayConfig,
    file: &Path,
    months: f64,
    cash_balance: Option<f64>,
    json: bool,
) -> Result<()> {
    let months = require_positive("months", months)?;
    let cash_balance = resolve_cash_balance(settings, cash_balance)?;
    let (table, _) = read_table(file)?;

    let result = RunwayOptimizer::with_config(settings.optimizer.clone()).optimize(
        &table,
        cash_balance,
        months,
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", PlanView(&result));
    }
    Ok(())
}

pub fn cmd_anomalies(
    settings: &RunwayConfig,
    file: &Path,
    threshold: Option<f64>,
    json: bool,
) -> Result<()> {
    let mut config = settings.anomaly;
    if let Some(threshold) = threshold {
        config.threshold = require_positive("threshold", threshold)?;
    }
    let (table, _) = read_table(file)?;

    let report = AnomalyDetector::with_config(config).detect(&table);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", AnomalyView(&report));
    }
    Ok(())
}

fn resolve_cash_balance(settings: &RunwayConfig, requested: Option<f64>) -> Result<f64> {
    match requested {
        Some(cash) => Ok(require_positive("cash_balance", cash)?),
        None => Ok(settings.default_cash_balance),
    }
}

/// Terminal rendering of a metrics snapshot
pub struct MetricsView<'a>(pub &'a MetricsSnapshot);

impl fmt::Display for MetricsView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.0;

        writeln!(f, "📊 Runway Metrics")?;
        writeln!(f, "   Cash balance:  {}", format_dollars(snapshot.cash_balance))?;
        writeln!(f, "   Monthly burn:  {}", format_dollars(snapshot.monthly_burn))?;
        writeln!(f, "   Runway:        {}", format_runway(snapshot.runway_months))?;
        writeln!(f, "   Months:        {}", snapshot.months_observed.len())?;

        if snapshot.expenses.is_empty() {
            return writeln!(f, "\n   No expenses found.");
        }

        writeln!(f, "\n   {:<20} {:>14} {:>8}", "Category", "Amount", "Share")?;
        writeln!(f, "   {}", "─".repeat(44))?;
        for line in &snapshot.expenses {
            writeln!(
                f,
                "   {:<20} {:>14} {:>7.2}%",
                line.category,
                format_dollars(line.amount),
                line.pct
            )?;
        }

        let drivers: Vec<&str> = snapshot
            .top_cost_drivers
            .iter()
            .map(|l| l.category.as_str())
            .collect();
        writeln!(f, "\n   Top cost drivers: {}", drivers.join(", "))
    }
}

/// Terminal rendering of an optimization plan
pub struct PlanView<'a>(pub &'a OptimizationResult);

impl fmt::Display for PlanView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;

        writeln!(f, "✂️  Runway Optimization")?;
        writeln!(f, "   Current runway: {}", format_runway(result.current_runway))?;
        if let Some(target) = result.target_runway {
            writeln!(f, "   Target runway:  {:.2} months", target)?;
        }
        writeln!(f, "   New runway:     {}", format_runway(result.new_runway))?;
        writeln!(
            f,
            "   Monthly burn:   {} -> {}",
            format_dollars(result.monthly_burn_before),
            format_dollars(result.monthly_burn_after)
        )?;

        if !result.plan.is_empty() {
            writeln!(f, "\n   Plan:")?;
            for (i, action) in result.plan.iter().enumerate() {
                writeln!(
                    f,
                    "   {:>2}. {:<32} saves ~{}/month",
                    i + 1,
                    action.action,
                    format_dollars(action.monthly_savings_est)
                )?;
            }
        }

        if let Some(note) = &result.note {
            writeln!(f, "\n   ⚠️  {}", note)?;
        }

        Ok(())
    }
}

/// Terminal rendering of an anomaly report
pub struct AnomalyView<'a>(pub &'a AnomalyReport);

impl fmt::Display for AnomalyView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;

        writeln!(
            f,
            "🔍 Spending Anomalies ({} of {} categories flagged)",
            report.anomalies_found, report.categories_analyzed
        )?;

        if report.alerts.is_empty() {
            return writeln!(f, "   No anomalies detected.");
        }

        for alert in &report.alerts {
            let icon = match alert.severity {
                AnomalySeverity::High => "🔴",
                AnomalySeverity::Medium => "🟡",
            };
            writeln!(
                f,
                "   {} [{}] {} (z = {:.2})",
                icon, alert.severity, alert.message, alert.z_score
            )?;
        }

        Ok(())
    }
}
