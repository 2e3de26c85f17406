//! Claim intake: validation, id generation and the activation code pre-check.

pub mod validation;

use tracing::info;

pub use validation::{ClaimRequest, ValidClaim, ValidationError, is_valid_email, normalize_phone};

use crate::storage::{Claim, ClaimDatabase, DatabaseError, NewClaim, OttStatus, SalesStatus};

/// Generate a customer-facing claim id: `CLM-` and ten uppercase hex digits.
pub fn generate_claim_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("CLM-{}", hex[..10].to_ascii_uppercase())
}

/// Store a validated claim.
///
/// The activation code is checked against sales records first. Unknown and
/// already-claimed codes are still stored, with the matching `ott_status`,
/// so the rejection stays visible to admins.
pub async fn submit_claim(db: &ClaimDatabase, claim: &ValidClaim) -> Result<Claim, DatabaseError> {
    let ott_status = match db.find_sales_record(&claim.activation_code).await? {
        None => OttStatus::ActivationCodeNotFound,
        Some(record) if record.status == SalesStatus::Claimed => OttStatus::AlreadyClaimed,
        Some(_) => OttStatus::Pending,
    };

    let claim_id = generate_claim_id();
    let stored = db
        .create_claim(&NewClaim {
            claim_id: &claim_id,
            name: &claim.name,
            email: &claim.email,
            phone: claim.phone.as_deref(),
            activation_code: &claim.activation_code,
            purchase_type: claim.purchase_type.as_deref(),
            ott_status,
        })
        .await?;

    info!(claim_id = %stored.claim_id, ott_status = %stored.ott_status, "Claim submitted");
    Ok(stored)
}
