use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::claims::ValidationError;
use crate::fulfillment::{ErrorKind, FulfillmentError, FulfillmentOutcome, WorkflowResult};
use crate::payment::PaymentError;
use crate::storage::DatabaseError;

/// Error that renders as `{"success": false, "error": "..."}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, msg)
    }

    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, msg)
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "success": false, "error": self.message })),
        )
            .into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::NotFound(what) => Self::not_found(format!("{what} not found")),
            DatabaseError::Conflict(msg) => Self::bad_request(msg),
            other => {
                error!(error = %other, "Database error");
                Self::internal("Internal storage error")
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::bad_request(e.to_string())
    }
}

impl From<PaymentError> for ApiError {
    fn from(e: PaymentError) -> Self {
        match &e {
            PaymentError::Config(msg) => Self::bad_request(msg.clone()),
            PaymentError::Api { status: 400 | 404, .. } => {
                Self::bad_request("Payment not found at the gateway")
            }
            PaymentError::Api { .. } | PaymentError::Request(_) => {
                error!(error = %e, "Payment gateway call failed");
                Self::bad_gateway("Payment gateway unavailable")
            }
        }
    }
}

/// HTTP status for a workflow error.
pub const fn workflow_status(err: &FulfillmentError) -> StatusCode {
    match err.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Precondition | ErrorKind::Conflict | ErrorKind::ResourceExhausted => {
            StatusCode::BAD_REQUEST
        }
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Render a workflow run as `{success, message, step, ottCode}`.
pub fn workflow_response(result: &Result<FulfillmentOutcome, FulfillmentError>) -> Response {
    let status = match result {
        Ok(_) => StatusCode::OK,
        Err(err) => workflow_status(err),
    };
    (status, Json(WorkflowResult::from(result))).into_response()
}
