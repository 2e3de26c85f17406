//! Admin dashboard routes. All of these sit behind `require_admin`.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::http::error::ApiError;
use crate::http::state::AppState;
use crate::storage::{
    Claim, ClaimFilter, KeyInventory, KeyStatus, OttKey, OttStatus, PaymentStatus, SalesRecord,
    SalesStatus,
};

const DEFAULT_PAGE_SIZE: u32 = 50;
const MAX_PAGE_SIZE: u32 = 500;

fn page(limit: Option<u32>, offset: Option<u32>) -> (u32, u32) {
    (
        limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        offset.unwrap_or(0),
    )
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// =========================================================================
// Stats
// =========================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub claims_by_ott_status: BTreeMap<&'static str, i64>,
    pub claims_by_payment_status: BTreeMap<&'static str, i64>,
    pub awaiting_automation: i64,
    pub keys: Vec<KeyInventory>,
    pub sales_records: BTreeMap<&'static str, i64>,
}

/// `GET /api/admin/stats`
pub async fn stats(State(state): State<AppState>) -> Result<Json<Stats>, ApiError> {
    let db = &state.db;
    let claims_by_ott_status = db
        .count_claims_by_ott_status()
        .await?
        .into_iter()
        .map(|(status, n)| (status.as_str(), n))
        .collect();
    let claims_by_payment_status = db
        .count_claims_by_payment_status()
        .await?
        .into_iter()
        .map(|(status, n)| (status.as_str(), n))
        .collect();
    let sales_records = db
        .count_sales_by_status()
        .await?
        .into_iter()
        .map(|(status, n)| (status.as_str(), n))
        .collect();

    Ok(Json(Stats {
        claims_by_ott_status,
        claims_by_payment_status,
        awaiting_automation: db.count_automation_candidates().await?,
        keys: db.key_inventory().await?,
        sales_records,
    }))
}

// =========================================================================
// Claims
// =========================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimListQuery {
    pub ott_status: Option<OttStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// `GET /api/admin/claims`
pub async fn list_claims(
    State(state): State<AppState>,
    Query(query): Query<ClaimListQuery>,
) -> Result<Json<Value>, ApiError> {
    let (limit, offset) = page(query.limit, query.offset);
    let claims = state
        .db
        .list_claims(&ClaimFilter {
            ott_status: query.ott_status,
            payment_status: query.payment_status,
            limit,
            offset,
        })
        .await?;
    Ok(Json(json!({ "claims": claims, "limit": limit, "offset": offset })))
}

/// `GET /api/admin/claims/{claim_id}`
pub async fn get_claim(
    State(state): State<AppState>,
    Path(claim_id): Path<String>,
) -> Result<Json<Claim>, ApiError> {
    Ok(Json(state.db.get_claim(&claim_id).await?))
}

// =========================================================================
// OTT keys
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct KeyImport {
    pub platform: String,
    pub codes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ImportResult {
    pub success: bool,
    pub inserted: usize,
    pub skipped: usize,
}

/// `POST /api/admin/keys`. Blank and already-known codes are skipped.
pub async fn import_keys(
    State(state): State<AppState>,
    Json(req): Json<KeyImport>,
) -> Result<Json<ImportResult>, ApiError> {
    let platform = req.platform.trim();
    if platform.is_empty() {
        return Err(ApiError::bad_request("platform is required"));
    }

    let mut inserted = 0;
    for code in req.codes.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
        if state.db.insert_ott_key(&new_id(), code, platform).await? {
            inserted += 1;
        }
    }
    let skipped = req.codes.len() - inserted;

    info!(platform, inserted, skipped, "Imported OTT keys");
    Ok(Json(ImportResult {
        success: true,
        inserted,
        skipped,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct KeyListQuery {
    pub status: Option<KeyStatus>,
    pub platform: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// `GET /api/admin/keys`
pub async fn list_keys(
    State(state): State<AppState>,
    Query(query): Query<KeyListQuery>,
) -> Result<Json<Vec<OttKey>>, ApiError> {
    let (limit, offset) = page(query.limit, query.offset);
    let keys = state
        .db
        .list_ott_keys(query.status, query.platform.as_deref(), limit, offset)
        .await?;
    Ok(Json(keys))
}

// =========================================================================
// Sales records
// =========================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRecordInput {
    pub activation_code: String,
    pub product: String,
}

#[derive(Debug, Deserialize)]
pub struct SalesImport {
    pub records: Vec<SalesRecordInput>,
}

/// `POST /api/admin/sales-records`
pub async fn import_sales_records(
    State(state): State<AppState>,
    Json(req): Json<SalesImport>,
) -> Result<Json<ImportResult>, ApiError> {
    let mut inserted = 0;
    for record in &req.records {
        let code = record.activation_code.trim();
        let product = record.product.trim();
        if code.is_empty() || product.is_empty() {
            continue;
        }
        if state.db.insert_sales_record(&new_id(), code, product).await? {
            inserted += 1;
        }
    }
    let skipped = req.records.len() - inserted;

    info!(inserted, skipped, "Imported sales records");
    Ok(Json(ImportResult {
        success: true,
        inserted,
        skipped,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct SalesListQuery {
    pub status: Option<SalesStatus>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// `GET /api/admin/sales-records`
pub async fn list_sales_records(
    State(state): State<AppState>,
    Query(query): Query<SalesListQuery>,
) -> Result<Json<Vec<SalesRecord>>, ApiError> {
    let (limit, offset) = page(query.limit, query.offset);
    let records = state
        .db
        .list_sales_records(query.status, limit, offset)
        .await?;
    Ok(Json(records))
}

/// `POST /api/admin/sales-records/{activation_code}/release`
///
/// Returns a claimed record to the pool, for codes stranded by a failed
/// key assignment.
pub async fn release_sales_record(
    State(state): State<AppState>,
    Path(activation_code): Path<String>,
) -> Result<Json<SalesRecord>, ApiError> {
    let record = state
        .db
        .release_sales_record(activation_code.trim())
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!("No claimed sales record for {activation_code}"))
        })?;

    warn!(activation_code = %record.activation_code, "Sales record released by admin");
    Ok(Json(record))
}
