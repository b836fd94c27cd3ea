//! Conciliation endpoints. Mounted behind the auth middleware.

use super::AppState;
use crate::domain::{
    AcceptRequest, ApiError, ApiResult, ConciliationCandidate, PendingConciliationSummary,
};
use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

/// `GET /api/conciliations`
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<PendingConciliationSummary>>> {
    Ok(Json(state.conciliation.list().await?))
}

/// `GET /api/conciliations/{id}`
pub async fn details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ConciliationCandidate>> {
    let index = parse_id(&id)?;
    Ok(Json(state.conciliation.details(index).await?))
}

/// `POST /api/conciliations/{id}/accept`
pub async fn accept(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let index = parse_id(&id)?;
    let request: AcceptRequest =
        serde_json::from_slice(&body).map_err(|_| ApiError::BadRequest("Invalid request"))?;

    state
        .conciliation
        .accept(index, &request.es_row_indices)
        .await?;
    Ok(Json(json!({ "status": "accepted" })))
}

/// `POST /api/conciliations/{id}/reject`
pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let index = parse_id(&id)?;
    state.conciliation.reject(index).await?;
    Ok(Json(json!({ "status": "rejected" })))
}

fn parse_id(raw: &str) -> ApiResult<usize> {
    raw.parse().map_err(|_| ApiError::BadRequest("Invalid ID"))
}
