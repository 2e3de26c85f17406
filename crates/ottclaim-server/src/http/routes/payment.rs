use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::fulfillment::WorkflowResult;
use crate::http::error::ApiError;
use crate::http::state::AppState;
use crate::storage::PaymentStatus;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub payment_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub success: bool,
    pub claim_id: String,
    pub payment_status: PaymentStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fulfillment: Option<WorkflowResult>,
}

/// `POST /api/claims/{claim_id}/payment`
pub async fn verify_payment(
    State(state): State<AppState>,
    Path(claim_id): Path<String>,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let Some(gateway) = state.payment.as_deref() else {
        return Err(ApiError::service_unavailable(
            "Payment verification is not configured",
        ));
    };

    let claim = state.db.get_claim(&claim_id).await?;
    if claim.ott_status.is_rejected_at_intake() {
        return Err(ApiError::bad_request(format!(
            "Claim {claim_id} cannot be paid ({})",
            claim.ott_status
        )));
    }
    if claim.payment_status == PaymentStatus::Paid {
        return Ok(Json(PaymentResponse {
            success: true,
            claim_id,
            payment_status: PaymentStatus::Paid,
            message: "Payment already verified".to_string(),
            fulfillment: None,
        }));
    }

    let payment_id = req.payment_id.trim();
    if payment_id.is_empty() {
        return Err(ApiError::bad_request("paymentId is required"));
    }

    let used_elsewhere = state
        .db
        .claim_for_payment(payment_id)
        .await?
        .is_some_and(|holder| holder != claim_id);
    if used_elsewhere {
        return Err(ApiError::bad_request(format!(
            "Payment {payment_id} is already used by another claim"
        )));
    }

    let verdict = gateway.verify(payment_id).await?;
    state
        .db
        .update_payment(&claim_id, verdict.status, payment_id)
        .await?;
    info!(claim_id = %claim_id, payment_id, status = %verdict.status, "Payment verified");

    let paid = verdict.status == PaymentStatus::Paid;
    let fulfillment = if paid && state.settings.auto_fulfill_on_payment {
        let result = state.fulfillment.process_claim(&claim_id).await;
        Some(WorkflowResult::from(&result))
    } else {
        None
    };

    Ok(Json(PaymentResponse {
        success: paid,
        claim_id,
        payment_status: verdict.status,
        message: verdict.detail,
        fulfillment,
    }))
}
