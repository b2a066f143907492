//! CSV upload handler

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::info;

use crate::{AppError, AppState, MAX_UPLOAD_SIZE};
use runway_core::{parse_transactions_csv, ImportSummary};

/// POST /upload - Replace the in-memory table with an uploaded CSV
///
/// Expects multipart form with:
/// - file: CSV file with date, amount and category columns (required, max 10MB)
pub async fn upload_csv(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ImportSummary>, AppError> {
    let mut file_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let is_csv = field
            .file_name()
            .map(|name| name.to_lowercase().ends_with(".csv"))
            .unwrap_or(false);
        if !is_csv {
            return Err(AppError::bad_request("Only .csv files are accepted."));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|_| AppError::bad_request("Failed to read file data"))?;
        file_data = Some(bytes.to_vec());
    }

    let file_data = file_data.ok_or_else(|| AppError::bad_request("Missing file field"))?;

    upload_csv_core(&state, file_data).await
}

/// Core upload logic - separated from multipart parsing for testability
pub async fn upload_csv_core(
    state: &AppState,
    file_data: Vec<u8>,
) -> Result<Json<ImportSummary>, AppError> {
    if file_data.len() > MAX_UPLOAD_SIZE {
        return Err(AppError::bad_request(&format!(
            "File too large. Maximum size is {} MB",
            MAX_UPLOAD_SIZE / 1024 / 1024
        )));
    }

    let (records, summary) = parse_transactions_csv(&file_data).map_err(AppError::from_core)?;

    info!(
        "Loaded {} transactions ({} months, {} categories)",
        summary.rows, summary.months_detected, summary.categories_detected
    );
    state.sessions.replace(records).await;

    Ok(Json(summary))
}
