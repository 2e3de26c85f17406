//! HTTP API: customer claim intake, payment verification, and the
//! token-protected admin and automation routes.

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::{ApiSettings, AppState};

use routes::{admin, automation, claims, health, payment};

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/automation/process-claim", post(automation::process_claim))
        .route("/api/automation/process-batch", post(automation::process_batch))
        .route("/api/admin/stats", get(admin::stats))
        .route("/api/admin/claims", get(admin::list_claims))
        .route("/api/admin/claims/{claim_id}", get(admin::get_claim))
        .route("/api/admin/keys", get(admin::list_keys).post(admin::import_keys))
        .route(
            "/api/admin/sales-records",
            get(admin::list_sales_records).post(admin::import_sales_records),
        )
        .route(
            "/api/admin/sales-records/{activation_code}/release",
            post(admin::release_sales_record),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_admin));

    Router::new()
        .route("/health", get(health::health))
        .route("/api/claims", post(claims::submit_claim))
        .route("/api/claims/{claim_id}", get(claims::claim_status))
        .route("/api/claims/{claim_id}/payment", post(payment::verify_payment))
        .route("/api/admin/login", post(auth::login))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
