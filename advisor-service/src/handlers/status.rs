use axum::{extract::State, Json};
use validator::Validate;

use crate::dtos::{StatusCheckCreate, StatusCheckResponse};
use crate::models::StatusCheck;
use crate::services::MAX_LIST_LIMIT;
use crate::startup::AppState;
use service_core::error::AppError;

#[tracing::instrument(skip(state, request))]
pub async fn create_status_check(
    State(state): State<AppState>,
    Json(request): Json<StatusCheckCreate>,
) -> Result<Json<StatusCheckResponse>, AppError> {
    request.validate()?;

    let check = StatusCheck::new(request.client_name);
    let store = state.store.clone();
    let record = check.clone();
    tokio::spawn(async move { store.insert_status_check(&record).await })
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Status write task failed: {}", e)))??;

    tracing::info!(status_check_id = %check.id, "Status check recorded");

    Ok(Json(check.into()))
}

#[tracing::instrument(skip(state))]
pub async fn list_status_checks(
    State(state): State<AppState>,
) -> Result<Json<Vec<StatusCheckResponse>>, AppError> {
    let checks = state.store.list_status_checks(MAX_LIST_LIMIT).await?;

    Ok(Json(checks.into_iter().map(Into::into).collect()))
}
