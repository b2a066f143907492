//! Greedy runway optimizer
//!
//! Searches for a list of spending cuts that extends runway by a requested
//! number of months:
//! - Categories are tried largest total spend first
//! - Each category gets the configured cut levels in increasing order, and
//!   cuts compound on the already-reduced amounts
//! - After every single cut the burn is recomputed from scratch and the
//!   search stops as soon as the target (or infinite runway) is reached
//! - If every category cut is exhausted, fixed fallback actions are applied
//!
//! The search mutates a private copy of the table; the caller's slice is
//! never touched, so concurrent calls cannot interfere with each other.

use tracing::debug;

use crate::config::OptimizerConfig;
use crate::metrics::{months_observed, monthly_burn, ranked_expense_categories, runway_months};
use crate::models::{CutAction, OptimizationResult, TransactionRecord};
use crate::stats::round2;

const NOTE_ALREADY_INFINITE: &str = "Net burn is already <= 0; runway is effectively infinite.";
const NOTE_NOW_INFINITE: &str = "Runway is now effectively infinite.";
const NOTE_BEST_EFFORT: &str = "Could not fully reach target runway. This is the best-effort plan.";

/// Build a cost-cutting plan with the default cut levels and fallbacks
pub fn optimize(
    table: &[TransactionRecord],
    cash_balance: f64,
    extend_by_months: f64,
) -> OptimizationResult {
    RunwayOptimizer::new().optimize(table, cash_balance, extend_by_months)
}

/// Greedy cut-plan search with configurable cut levels and fallbacks
#[derive(Debug, Clone, Default)]
pub struct RunwayOptimizer {
    config: OptimizerConfig,
}

impl RunwayOptimizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Search for a plan that extends runway by `extend_by_months`
    ///
    /// `extend_by_months` must be positive; callers validate it first.
    pub fn optimize(
        &self,
        table: &[TransactionRecord],
        cash_balance: f64,
        extend_by_months: f64,
    ) -> OptimizationResult {
        let burn_before = monthly_burn(table);

        let Some(current_runway) = runway_months(cash_balance, burn_before) else {
            debug!(
                "Burn {:.2} is not positive; runway already infinite, nothing to optimize",
                burn_before
            );
            return OptimizationResult {
                current_runway: None,
                target_runway: None,
                new_runway: None,
                monthly_burn_before: round2(burn_before),
                monthly_burn_after: round2(burn_before),
                plan: Vec::new(),
                note: Some(NOTE_ALREADY_INFINITE.to_string()),
            };
        };

        let target_runway = round2(current_runway + extend_by_months);
        debug!(
            "Optimizing runway {:.2} -> {:.2} months (burn {:.2})",
            current_runway, target_runway, burn_before
        );

        let mut search = PlanSearch {
            cash_balance,
            burn_before,
            current_runway,
            target_runway,
            plan: Vec::new(),
        };

        // Category averages always divide by the full set of observed months
        let month_count = months_observed(table).len().max(1) as f64;
        let mut working: Vec<TransactionRecord> = table.to_vec();

        for (category, total) in ranked_expense_categories(table) {
            debug!("Trying cuts on {} (total spend {:.2})", category, total);

            for &cut_pct in &self.config.cut_levels {
                let category_spend: f64 = working
                    .iter()
                    .filter(|r| r.is_expense() && r.category == category)
                    .map(|r| r.amount.abs())
                    .sum();
                let savings_est = round2(category_spend / month_count * cut_pct);

                for record in working
                    .iter_mut()
                    .filter(|r| r.is_expense() && r.category == category)
                {
                    record.amount *= 1.0 - cut_pct;
                }

                let new_burn = monthly_burn(&working);
                search
                    .plan
                    .push(CutAction::category_cut(&category, cut_pct, savings_est));

                debug!(
                    "Cut {} by {:.0}%: saves ~{:.2}/month, burn now {:.2}",
                    category,
                    cut_pct * 100.0,
                    savings_est,
                    new_burn
                );

                if let Some(stop) = search.stop_condition(new_burn) {
                    return search.finish(new_burn, stop);
                }
            }
        }

        let mut new_burn = monthly_burn(&working);
        for action in &self.config.fallback_actions {
            new_burn -= action.monthly_savings;
            search
                .plan
                .push(CutAction::fixed(&action.description, action.monthly_savings));

            debug!(
                "Fallback '{}': saves {:.2}/month, burn now {:.2}",
                action.description, action.monthly_savings, new_burn
            );

            if let Some(stop) = search.stop_condition(new_burn) {
                return search.finish(new_burn, stop);
            }
        }

        debug!(
            "Target {:.2} not reached after {} actions",
            search.target_runway,
            search.plan.len()
        );
        search.best_effort(new_burn)
    }
}

/// Why the search ended early
#[derive(Debug, Clone, Copy, PartialEq)]
enum Stop {
    /// Burn dropped to zero or below
    Infinite,
    /// Runway (rounded) reached the target
    Reached(f64),
}

/// Running state of one optimization call
struct PlanSearch {
    cash_balance: f64,
    burn_before: f64,
    current_runway: f64,
    target_runway: f64,
    plan: Vec<CutAction>,
}

impl PlanSearch {
    fn stop_condition(&self, new_burn: f64) -> Option<Stop> {
        match runway_months(self.cash_balance, new_burn) {
            None => Some(Stop::Infinite),
            Some(runway) if runway >= self.target_runway => Some(Stop::Reached(runway)),
            Some(_) => None,
        }
    }

    fn finish(self, new_burn: f64, stop: Stop) -> OptimizationResult {
        match stop {
            Stop::Infinite => self.into_result(new_burn, None, Some(NOTE_NOW_INFINITE)),
            Stop::Reached(runway) => self.into_result(new_burn, Some(runway), None),
        }
    }

    fn best_effort(self, new_burn: f64) -> OptimizationResult {
        let new_runway = runway_months(self.cash_balance, new_burn);
        self.into_result(new_burn, new_runway, Some(NOTE_BEST_EFFORT))
    }

    fn into_result(
        self,
        new_burn: f64,
        new_runway: Option<f64>,
        note: Option<&str>,
    ) -> OptimizationResult {
        OptimizationResult {
            current_runway: Some(self.current_runway),
            target_runway: Some(self.target_runway),
            new_runway,
            monthly_burn_before: round2(self.burn_before),
            monthly_burn_after: round2(new_burn),
            plan: self.plan,
            note: note.map(str::to_string),
        }
    }
}
