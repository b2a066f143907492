//! Metrics engine: burn rate, runway and expense breakdown
//!
//! Everything here is a pure function of the transaction table. The burn
//! formula is also the optimizer's objective function, so it is exposed on
//! its own as [`monthly_burn`].

use std::collections::{BTreeMap, HashMap};

use crate::models::{ExpenseLine, MetricsSnapshot, TransactionRecord};
use crate::stats::{mean, round2};

/// Number of categories reported as top cost drivers
pub const TOP_COST_DRIVERS: usize = 3;

/// Compute burn, runway and expense breakdown for a table
pub fn compute_metrics(table: &[TransactionRecord], cash_balance: f64) -> MetricsSnapshot {
    let burn = monthly_burn(table);
    let expenses = expense_breakdown(table);
    let top_cost_drivers = expenses.iter().take(TOP_COST_DRIVERS).cloned().collect();

    MetricsSnapshot {
        cash_balance,
        monthly_burn: round2(burn),
        runway_months: runway_months(cash_balance, burn),
        expenses,
        top_cost_drivers,
        months_observed: months_observed(table),
    }
}

/// Mean over observed months of (expense - revenue)
///
/// Returns 0 for an empty table.
pub fn monthly_burn(table: &[TransactionRecord]) -> f64 {
    let mut by_month: BTreeMap<&str, (f64, f64)> = BTreeMap::new();

    for record in table {
        let entry = by_month.entry(record.month.as_str()).or_insert((0.0, 0.0));
        if record.is_expense() {
            entry.0 += record.amount.abs();
        } else if record.is_revenue() {
            entry.1 += record.amount;
        }
    }

    let net_burns: Vec<f64> = by_month
        .values()
        .map(|(expense, revenue)| expense - revenue)
        .collect();

    mean(&net_burns)
}

/// Months of runway at the given burn, rounded to 2 decimals
///
/// None means infinite: zero or negative burn never divides.
pub fn runway_months(cash_balance: f64, monthly_burn: f64) -> Option<f64> {
    if monthly_burn <= 0.0 {
        None
    } else {
        Some(round2(cash_balance / monthly_burn))
    }
}

/// Sorted distinct month keys present in the table
pub fn months_observed(table: &[TransactionRecord]) -> Vec<String> {
    let mut months: Vec<String> = table.iter().map(|r| r.month.clone()).collect();
    months.sort();
    months.dedup();
    months
}

/// Absolute expense total per category, in first-seen order
pub fn category_expense_totals(table: &[TransactionRecord]) -> Vec<(String, f64)> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in table.iter().filter(|r| r.is_expense()) {
        match index.get(record.category.as_str()) {
            Some(&i) => totals[i].1 += record.amount.abs(),
            None => {
                index.insert(record.category.as_str(), totals.len());
                totals.push((record.category.clone(), record.amount.abs()));
            }
        }
    }

    totals
}

/// Category totals sorted by descending amount
///
/// The sort is stable, so equal totals keep first-seen order.
pub fn ranked_expense_categories(table: &[TransactionRecord]) -> Vec<(String, f64)> {
    let mut totals = category_expense_totals(table);
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
    totals
}

/// Expense breakdown by category with percentage of total spend
pub fn expense_breakdown(table: &[TransactionRecord]) -> Vec<ExpenseLine> {
    let ranked = ranked_expense_categories(table);
    let total_expense: f64 = ranked.iter().map(|(_, amount)| amount).sum();

    ranked
        .into_iter()
        .map(|(category, amount)| {
            let pct = if total_expense > 0.0 {
                round2(amount / total_expense * 100.0)
            } else {
                0.0
            };
            ExpenseLine {
                category,
                amount: round2(amount),
                pct,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(y: i32, m: u32, amount: f64, category: &str) -> TransactionRecord {
        TransactionRecord::new(NaiveDate::from_ymd_opt(y, m, 15).unwrap(), amount, category)
    }

    fn payroll_table() -> Vec<TransactionRecord> {
        vec![
            record(2024, 1, -50000.0, "Payroll"),
            record(2024, 2, -70000.0, "Payroll"),
        ]
    }

    #[test]
    fn test_two_month_payroll_example() {
        let snapshot = compute_metrics(&payroll_table(), 400000.0);
        assert_eq!(snapshot.monthly_burn, 60000.0);
        assert_eq!(snapshot.runway_months, Some(6.67));
        assert_eq!(snapshot.months_observed, vec!["2024-01", "2024-02"]);
        assert_eq!(snapshot.expenses.len(), 1);
        assert_eq!(snapshot.expenses[0].category, "Payroll");
        assert_eq!(snapshot.expenses[0].amount, 120000.0);
        assert_eq!(snapshot.expenses[0].pct, 100.0);
    }

    #[test]
    fn test_revenue_offsets_burn() {
        let table = vec![
            record(2024, 1, -10000.0, "Rent"),
            record(2024, 1, 4000.0, "Sales"),
            record(2024, 2, -10000.0, "Rent"),
            record(2024, 2, 2000.0, "Sales"),
        ];
        // (6000 + 8000) / 2
        assert_eq!(monthly_burn(&table), 7000.0);
        let snapshot = compute_metrics(&table, 70000.0);
        assert_eq!(snapshot.runway_months, Some(10.0));
        // Revenue never shows up in the expense breakdown
        assert_eq!(snapshot.expenses.len(), 1);
    }

    #[test]
    fn test_cash_flow_positive_has_infinite_runway() {
        let table = vec![
            record(2024, 1, -1000.0, "SaaS"),
            record(2024, 1, 5000.0, "Sales"),
        ];
        let snapshot = compute_metrics(&table, 100000.0);
        assert!(snapshot.monthly_burn < 0.0);
        assert_eq!(snapshot.runway_months, None);
    }

    #[test]
    fn test_zero_burn_is_infinite_not_zero() {
        let table = vec![
            record(2024, 1, -1000.0, "SaaS"),
            record(2024, 1, 1000.0, "Sales"),
        ];
        assert_eq!(monthly_burn(&table), 0.0);
        assert_eq!(compute_metrics(&table, 5000.0).runway_months, None);
    }

    #[test]
    fn test_empty_table() {
        let snapshot = compute_metrics(&[], 400000.0);
        assert_eq!(snapshot.monthly_burn, 0.0);
        assert_eq!(snapshot.runway_months, None);
        assert!(snapshot.expenses.is_empty());
        assert!(snapshot.top_cost_drivers.is_empty());
        assert!(snapshot.months_observed.is_empty());
    }

    #[test]
    fn test_breakdown_sorted_and_percentages_sum_to_100() {
        let table = vec![
            record(2024, 1, -300.0, "SaaS"),
            record(2024, 1, -5000.0, "Payroll"),
            record(2024, 1, -1200.0, "Cloud"),
            record(2024, 2, -700.0, "Marketing"),
            record(2024, 2, -100.0, "Rent"),
            record(2024, 2, 900.0, "Sales"),
        ];
        let snapshot = compute_metrics(&table, 10000.0);

        let names: Vec<&str> = snapshot.expenses.iter().map(|e| e.category.as_str()).collect();
        assert_eq!(names, vec!["Payroll", "Cloud", "Marketing", "SaaS", "Rent"]);

        let total_pct: f64 = snapshot.expenses.iter().map(|e| e.pct).sum();
        assert!((total_pct - 100.0).abs() < 0.05, "pct sum was {}", total_pct);

        assert_eq!(snapshot.top_cost_drivers.len(), TOP_COST_DRIVERS);
        assert_eq!(snapshot.top_cost_drivers[0].category, "Payroll");
        assert_eq!(snapshot.top_cost_drivers[2].category, "Marketing");
    }

    #[test]
    fn test_revenue_only_table_has_no_expense_percentages() {
        let table = vec![record(2024, 1, 1000.0, "Sales")];
        let snapshot = compute_metrics(&table, 1000.0);
        assert!(snapshot.expenses.is_empty());
        assert_eq!(snapshot.expenses.iter().map(|e| e.pct).sum::<f64>(), 0.0);
    }

    #[test]
    fn test_ranking_ties_keep_first_seen_order() {
        let table = vec![
            record(2024, 1, -100.0, "Rent"),
            record(2024, 1, -100.0, "Cloud"),
            record(2024, 1, -100.0, "SaaS"),
        ];
        let ranked = ranked_expense_categories(&table);
        let names: Vec<&str> = ranked.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Cloud", "SaaS"]);
    }

    #[test]
    fn test_runway_is_none_iff_burn_not_positive() {
        for burn in [-10.0, 0.0, 0.01, 60000.0] {
            let runway = runway_months(400000.0, burn);
            assert_eq!(runway.is_none(), burn <= 0.0);
        }
        assert_eq!(runway_months(400000.0, 60000.0), Some(6.67));
    }

    #[test]
    fn test_months_observed_sorted_and_distinct() {
        let table = vec![
            record(2024, 3, -1.0, "A"),
            record(2023, 12, -1.0, "A"),
            record(2024, 3, -1.0, "B"),
            record(2024, 1, -1.0, "A"),
        ];
        assert_eq!(
            months_observed(&table),
            vec!["2023-12", "2024-01", "2024-03"]
        );
    }
}
