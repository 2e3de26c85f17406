//! Manual workflow triggers for admins.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::Response;
use serde::Deserialize;

use crate::fulfillment::BatchSummary;
use crate::fulfillment::scheduler::MAX_BATCH_SIZE;
use crate::http::error::{ApiError, workflow_response};
use crate::http::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessClaimRequest {
    pub claim_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProcessBatchRequest {
    pub limit: Option<u32>,
}

/// `POST /api/automation/process-claim`
pub async fn process_claim(
    State(state): State<AppState>,
    Json(req): Json<ProcessClaimRequest>,
) -> Response {
    let result = state.fulfillment.process_claim(req.claim_id.trim()).await;
    workflow_response(&result)
}

/// `POST /api/automation/process-batch`. The body is optional.
pub async fn process_batch(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<BatchSummary>, ApiError> {
    let req: ProcessBatchRequest = if body.is_empty() {
        ProcessBatchRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::bad_request(e.to_string()))?
    };

    let limit = req
        .limit
        .unwrap_or(state.settings.batch_size)
        .clamp(1, MAX_BATCH_SIZE);
    let summary = state
        .fulfillment
        .process_batch(limit)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(summary))
}
