//! Metrics, optimization and anomaly handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::warn;

use crate::{AppError, AppState};
use runway_core::{
    compute_metrics, require_positive, AnomalyConfig, AnomalyDetector, AnomalyReport,
    MetricsSnapshot, OptimizationResult, RunwayOptimizer, TransactionRecord,
};

const UPLOAD_FIRST: &str = "POST /upload first";

#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    pub cash_balance: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    /// Extend runway by this many months
    pub months: f64,
    /// Override the configured cash balance
    pub cash_balance: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct AnomalyQuery {
    pub threshold: Option<f64>,
}

/// GET /metrics - Burn, runway and expense breakdown
pub async fn get_metrics(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MetricsQuery>,
) -> Result<Json<MetricsSnapshot>, AppError> {
    let table = current_table(&state).await?;
    let cash_balance = resolve_cash_balance(&state, params.cash_balance)?;

    Ok(Json(compute_metrics(&table, cash_balance)))
}

/// POST /optimize - Cost-cutting plan to extend runway
pub async fn run_optimize(
    State(state): State<Arc<AppState>>,
    Json(body): Json<OptimizeRequest>,
) -> Result<Json<OptimizationResult>, AppError> {
    let table = current_table(&state).await?;
    let months = require_positive("months", body.months).map_err(AppError::from_core)?;
    let cash_balance = resolve_cash_balance(&state, body.cash_balance)?;

    let optimizer = RunwayOptimizer::with_config(state.settings.optimizer.clone());
    Ok(Json(optimizer.optimize(&table, cash_balance, months)))
}

/// GET /anomalies - Z-score alerts on monthly category spend
pub async fn get_anomalies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnomalyQuery>,
) -> Result<Json<AnomalyReport>, AppError> {
    let table = current_table(&state).await?;

    let mut config: AnomalyConfig = state.settings.anomaly;
    if let Some(threshold) = params.threshold {
        config.threshold = require_positive("threshold", threshold).map_err(AppError::from_core)?;
    }

    Ok(Json(AnomalyDetector::with_config(config).detect(&table)))
}

async fn current_table(state: &AppState) -> Result<Arc<Vec<TransactionRecord>>, AppError> {
    state.sessions.snapshot().await.ok_or_else(|| {
        warn!("Analysis requested before any upload");
        AppError::bad_request(UPLOAD_FIRST)
    })
}

fn resolve_cash_balance(state: &AppState, requested: Option<f64>) -> Result<f64, AppError> {
    match requested {
        Some(cash) => require_positive("cash_balance", cash).map_err(AppError::from_core),
        None => Ok(state.settings.default_cash_balance),
    }
}
