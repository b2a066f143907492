//! Spending anomaly detection
//!
//! Flags categories whose latest month of spend sits far from their own
//! history, measured as a z-score against the category's monthly totals.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::config::AnomalyConfig;
use crate::models::{
    AnomalyAlert, AnomalyReport, AnomalySeverity, CategoryAnomalyReport, SpendDirection,
    TransactionRecord,
};
use crate::stats::{format_dollars, mean, round2, round_to, sample_std_dev};

/// Detect anomalies with the given z-score threshold
pub fn detect_anomalies(table: &[TransactionRecord], threshold: f64) -> AnomalyReport {
    AnomalyDetector::with_threshold(threshold).detect(table)
}

/// Z-score detector over per-category monthly expense totals
#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    config: AnomalyConfig,
}

impl AnomalyDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnomalyConfig) -> Self {
        Self { config }
    }

    /// Default config with a different anomaly threshold
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            config: AnomalyConfig {
                threshold,
                ..AnomalyConfig::default()
            },
        }
    }

    pub fn config(&self) -> &AnomalyConfig {
        &self.config
    }

    pub fn detect(&self, table: &[TransactionRecord]) -> AnomalyReport {
        let mut category_analysis = Vec::new();
        let mut alerts = Vec::new();

        for (category, monthly) in monthly_expense_series(table) {
            if monthly.len() < 2 {
                debug!("Skipping {}: only {} month(s) of spend", category, monthly.len());
                continue;
            }

            let values: Vec<f64> = monthly.values().copied().collect();
            let avg = mean(&values);
            let std_dev = sample_std_dev(&values);
            let (latest_month, latest) = match monthly.iter().next_back() {
                Some((month, amount)) => (month.to_string(), *amount),
                None => continue,
            };

            let z = if std_dev > 0.0 {
                (latest - avg) / std_dev
            } else {
                0.0
            };
            let is_anomaly = z.abs() > self.config.threshold;

            debug!(
                "{}: avg {:.2}, std {:.2}, latest {} = {:.2}, z {:.2}",
                category, avg, std_dev, latest_month, latest, z
            );

            category_analysis.push(CategoryAnomalyReport {
                category: category.to_string(),
                monthly_avg: round2(avg),
                latest_month,
                latest_amount: round2(latest),
                std_dev: round2(std_dev),
                z_score: round2(z),
                is_anomaly,
            });

            if is_anomaly {
                alerts.push(self.build_alert(category, avg, latest, z));
            }
        }

        alerts.sort_by(|a, b| {
            a.severity
                .rank()
                .cmp(&b.severity.rank())
                .then_with(|| b.z_score.abs().total_cmp(&a.z_score.abs()))
        });

        debug!(
            "Analyzed {} categories, {} anomalies",
            category_analysis.len(),
            alerts.len()
        );

        AnomalyReport {
            anomalies_found: alerts.len(),
            categories_analyzed: category_analysis.len(),
            alerts,
            category_analysis,
        }
    }

    fn build_alert(&self, category: &str, avg: f64, latest: f64, z: f64) -> AnomalyAlert {
        let severity = if z.abs() > self.config.high_severity_z {
            AnomalySeverity::High
        } else {
            AnomalySeverity::Medium
        };
        let direction = SpendDirection::from_z_score(z);
        let pct_change = if avg != 0.0 {
            (latest - avg) / avg * 100.0
        } else {
            0.0
        };

        AnomalyAlert {
            category: category.to_string(),
            severity,
            message: format!(
                "{} spending {} detected: {} vs avg {} ({:+.0}%)",
                category,
                direction,
                format_dollars(latest),
                format_dollars(avg),
                pct_change
            ),
            normal_avg: round2(avg),
            current: round2(latest),
            pct_change: round_to(pct_change, 1),
            z_score: round2(z),
        }
    }
}

/// Monthly absolute expense totals per category, categories in first-seen order
fn monthly_expense_series(table: &[TransactionRecord]) -> Vec<(&str, BTreeMap<&str, f64>)> {
    let mut series: Vec<(&str, BTreeMap<&str, f64>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in table.iter().filter(|r| r.is_expense()) {
        let i = *index.entry(record.category.as_str()).or_insert_with(|| {
            series.push((record.category.as_str(), BTreeMap::new()));
            series.len() - 1
        });
        *series[i].1.entry(record.month.as_str()).or_insert(0.0) += record.amount.abs();
    }

    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(m: u32, amount: f64, category: &str) -> TransactionRecord {
        TransactionRecord::new(NaiveDate::from_ymd_opt(2024, m, 10).unwrap(), amount, category)
    }

    /// `baseline` for months 1..n, then `latest` in month n
    fn series(category: &str, n: u32, baseline: f64, latest: f64) -> Vec<TransactionRecord> {
        let mut rows: Vec<TransactionRecord> =
            (1..n).map(|m| record(m, -baseline, category)).collect();
        rows.push(record(n, -latest, category));
        rows
    }

    #[test]
    fn test_payroll_example_is_not_anomalous() {
        let table = vec![record(1, -50000.0, "Payroll"), record(2, -70000.0, "Payroll")];
        let report = detect_anomalies(&table, 1.5);

        assert_eq!(report.categories_analyzed, 1);
        assert_eq!(report.anomalies_found, 0);
        assert!(report.alerts.is_empty());

        let payroll = &report.category_analysis[0];
        assert_eq!(payroll.monthly_avg, 60000.0);
        assert_eq!(payroll.std_dev, 14142.14);
        assert_eq!(payroll.latest_month, "2024-02");
        assert_eq!(payroll.latest_amount, 70000.0);
        assert_eq!(payroll.z_score, 0.71);
        assert!(!payroll.is_anomaly);
    }

    #[test]
    fn test_lower_threshold_flags_payroll() {
        let table = vec![record(1, -50000.0, "Payroll"), record(2, -70000.0, "Payroll")];
        let report = detect_anomalies(&table, 0.5);

        assert_eq!(report.anomalies_found, 1);
        let alert = &report.alerts[0];
        assert_eq!(alert.severity, AnomalySeverity::Medium);
        assert_eq!(alert.pct_change, 16.7);
        assert_eq!(
            alert.message,
            "Payroll spending increase detected: $70,000 vs avg $60,000 (+17%)"
        );
    }

    #[test]
    fn test_constant_spend_has_zero_z_score() {
        let table = series("SaaS", 4, 1200.0, 1200.0);
        let report = AnomalyDetector::new().detect(&table);

        assert_eq!(report.category_analysis[0].std_dev, 0.0);
        assert_eq!(report.category_analysis[0].z_score, 0.0);
        assert!(!report.category_analysis[0].is_anomaly);
        assert!(report.alerts.is_empty());
    }

    #[test]
    fn test_single_month_categories_are_skipped() {
        let mut table = vec![record(1, -900.0, "Rent")];
        table.extend(series("Cloud", 3, 100.0, 100.0));
        let report = AnomalyDetector::new().detect(&table);

        assert_eq!(report.categories_analyzed, 1);
        assert_eq!(report.category_analysis[0].category, "Cloud");
    }

    #[test]
    fn test_revenue_is_ignored() {
        let mut table = series("Cloud", 3, 100.0, 100.0);
        table.push(record(3, 90000.0, "Cloud"));
        let report = AnomalyDetector::new().detect(&table);

        assert_eq!(report.category_analysis[0].latest_amount, 100.0);
        assert!(report.alerts.is_empty());
    }

    #[test]
    fn test_rows_in_same_month_are_summed() {
        let table = vec![
            record(1, -100.0, "Cloud"),
            record(2, -60.0, "Cloud"),
            record(2, -40.0, "Cloud"),
        ];
        let report = AnomalyDetector::new().detect(&table);
        assert_eq!(report.category_analysis[0].latest_amount, 100.0);
        assert_eq!(report.category_analysis[0].z_score, 0.0);
    }

    #[test]
    fn test_spike_message_and_severity() {
        // Five flat months then a spike: z = 5 / sqrt(6) ~ 2.04
        let table = series("Cloud", 6, 1000.0, 5000.0);
        let report = AnomalyDetector::new().detect(&table);

        assert_eq!(report.anomalies_found, 1);
        let alert = &report.alerts[0];
        assert_eq!(alert.category, "Cloud");
        assert_eq!(alert.severity, AnomalySeverity::Medium);
        assert_eq!(alert.z_score, 2.04);
        assert_eq!(alert.normal_avg, 1666.67);
        assert_eq!(alert.current, 5000.0);
        assert_eq!(alert.pct_change, 200.0);
        assert_eq!(
            alert.message,
            "Cloud spending increase detected: $5,000 vs avg $1,667 (+200%)"
        );
    }

    #[test]
    fn test_drop_is_a_decrease() {
        let table = series("Marketing", 6, 1000.0, 200.0);
        let report = AnomalyDetector::new().detect(&table);

        let alert = &report.alerts[0];
        assert_eq!(alert.z_score, -2.04);
        assert_eq!(alert.pct_change, -76.9);
        assert!(alert.message.contains("spending decrease detected"));
        assert!(alert.message.ends_with("(-77%)"));
    }

    #[test]
    fn test_high_severity_above_configured_z() {
        // Eight flat months then a spike: z = 8 / 3 ~ 2.67
        let table = series("Payroll", 9, 10000.0, 40000.0);
        let report = AnomalyDetector::new().detect(&table);
        assert_eq!(report.alerts[0].severity, AnomalySeverity::High);

        let lenient = AnomalyDetector::with_config(AnomalyConfig {
            threshold: 1.5,
            high_severity_z: 3.0,
        });
        assert_eq!(lenient.detect(&table).alerts[0].severity, AnomalySeverity::Medium);
    }

    #[test]
    fn test_alerts_sorted_high_first_then_by_abs_z() {
        let mut table = Vec::new();
        // z ~ 1.79, medium
        table.extend(series("SaaS", 5, 100.0, 500.0));
        // z ~ 2.67, high
        table.extend(series("Payroll", 9, 10000.0, 40000.0));
        // z ~ -2.04, medium
        table.extend(series("Rent", 6, 3000.0, 500.0));

        let report = AnomalyDetector::new().detect(&table);
        let order: Vec<&str> = report.alerts.iter().map(|a| a.category.as_str()).collect();
        assert_eq!(order, vec!["Payroll", "Rent", "SaaS"]);

        // Per-category analysis keeps first-seen order
        let analysis: Vec<&str> = report
            .category_analysis
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert_eq!(analysis, vec!["SaaS", "Payroll", "Rent"]);
    }

    #[test]
    fn test_empty_table() {
        let report = detect_anomalies(&[], 1.5);
        assert_eq!(report.categories_analyzed, 0);
        assert_eq!(report.anomalies_found, 0);
        assert!(report.alerts.is_empty());
    }
}
