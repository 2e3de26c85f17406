//! Customer-facing claim routes.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;

use crate::claims::{self, ClaimRequest};
use crate::http::error::ApiError;
use crate::http::state::AppState;
use crate::storage::{Claim, OttStatus, PaymentStatus};

/// What a customer may see about their claim.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimStatusView {
    pub claim_id: String,
    pub payment_status: PaymentStatus,
    pub ott_status: OttStatus,
    pub platform: Option<String>,
    pub failure_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ott_code: Option<String>,
    pub created_at: i64,
}

impl From<Claim> for ClaimStatusView {
    fn from(claim: Claim) -> Self {
        let ott_code = if claim.ott_status == OttStatus::Delivered {
            claim.ott_code
        } else {
            None
        };
        Self {
            claim_id: claim.claim_id,
            payment_status: claim.payment_status,
            ott_status: claim.ott_status,
            platform: claim.platform,
            failure_reason: claim.failure_reason,
            ott_code,
            created_at: claim.created_at,
        }
    }
}

/// `POST /api/claims`
pub async fn submit_claim(
    State(state): State<AppState>,
    Json(req): Json<ClaimRequest>,
) -> Result<Response, ApiError> {
    let valid = req.validate()?;
    let claim = claims::submit_claim(&state.db, &valid).await?;

    let response = match claim.ott_status {
        OttStatus::ActivationCodeNotFound => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "claimId": claim.claim_id,
                "error": format!("Invalid activation code: {}", claim.activation_code),
            })),
        ),
        OttStatus::AlreadyClaimed => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "claimId": claim.claim_id,
                "error": format!("Activation code {} has already been claimed", claim.activation_code),
            })),
        ),
        _ => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "claimId": claim.claim_id,
                "processingFee": state.settings.processing_fee,
                "currency": state.settings.currency,
            })),
        ),
    };
    Ok(response.into_response())
}

/// `GET /api/claims/{claim_id}`
pub async fn claim_status(
    State(state): State<AppState>,
    Path(claim_id): Path<String>,
) -> Result<Json<ClaimStatusView>, ApiError> {
    let claim = state.db.get_claim(&claim_id).await?;
    Ok(Json(ClaimStatusView::from(claim)))
}
