//! Admin login and bearer token middleware.

use axum::Json;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::ApiError;
use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// `POST /api/admin/login`
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if !state.admin.login_enabled() {
        return Err(ApiError::service_unavailable("Admin login is not configured"));
    }
    if !state.admin.verify(&req.username, &req.password) {
        warn!(username = %req.username, "Admin login failed");
        return Err(ApiError::unauthorized("Invalid username or password"));
    }

    let (token, expires_in) = state
        .jwt
        .issue_admin_token(&req.username)
        .map_err(|e| ApiError::internal(format!("Failed to issue token: {e}")))?;

    info!(username = %req.username, "Admin logged in");
    Ok(Json(LoginResponse {
        success: true,
        token,
        token_type: "Bearer",
        expires_in,
    }))
}

/// Reject requests without a valid admin bearer token.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;

    let claims = state
        .jwt
        .validate(token)
        .map_err(|_| ApiError::unauthorized("Invalid token"))?;

    if !claims.is_admin() {
        return Err(ApiError::unauthorized("Not an admin token"));
    }

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
