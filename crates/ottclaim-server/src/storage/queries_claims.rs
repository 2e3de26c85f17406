//! Claim queries for the `OTTclaim` server.

use ottclaim_core::db::unix_timestamp;

use super::db::{ClaimDatabase, DatabaseError};
use super::models::{Claim, OttStatus, PaymentStatus};

/// Parameters for recording a new claim.
pub struct NewClaim<'a> {
    pub claim_id: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub activation_code: &'a str,
    pub purchase_type: Option<&'a str>,
    pub ott_status: OttStatus,
}

/// Admin listing filter. `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ClaimFilter {
    pub ott_status: Option<OttStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub limit: u32,
    pub offset: u32,
}

impl ClaimDatabase {
    // =========================================================================
    // Intake
    // =========================================================================

    /// Insert a claim with pending payment.
    pub async fn create_claim(&self, params: &NewClaim<'_>) -> Result<Claim, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO claims (claim_id, name, email, phone, activation_code, purchase_type, payment_status, ott_status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(params.claim_id)
        .bind(params.name)
        .bind(params.email)
        .bind(params.phone)
        .bind(params.activation_code)
        .bind(params.purchase_type)
        .bind(PaymentStatus::Pending)
        .bind(params.ott_status)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_claim(params.claim_id).await
    }

    /// Get a claim by ID.
    pub async fn get_claim(&self, claim_id: &str) -> Result<Claim, DatabaseError> {
        sqlx::query_as::<_, Claim>("SELECT * FROM claims WHERE claim_id = ?")
            .bind(claim_id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Claim {claim_id}")))
    }

    /// List claims, newest first.
    pub async fn list_claims(&self, filter: &ClaimFilter) -> Result<Vec<Claim>, DatabaseError> {
        let claims = sqlx::query_as::<_, Claim>(
            "SELECT * FROM claims \
             WHERE (? IS NULL OR ott_status = ?) AND (? IS NULL OR payment_status = ?) \
             ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
        )
        .bind(filter.ott_status)
        .bind(filter.ott_status)
        .bind(filter.payment_status)
        .bind(filter.payment_status)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(self.pool())
        .await?;

        Ok(claims)
    }

    /// Paid, undelivered claims the automation has not looked at yet, oldest first.
    pub async fn list_automation_candidates(&self, limit: u32) -> Result<Vec<Claim>, DatabaseError> {
        let claims = sqlx::query_as::<_, Claim>(
            "SELECT * FROM claims \
             WHERE payment_status = 'paid' AND ott_status != 'delivered' AND automation_processed = 0 \
             ORDER BY created_at ASC, rowid ASC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(claims)
    }

    // =========================================================================
    // Payment
    // =========================================================================

    /// Record the outcome of a payment verification.
    ///
    /// A gateway payment binds to one claim only; reusing it for another
    /// claim fails with [`DatabaseError::Conflict`].
    pub async fn update_payment(
        &self,
        claim_id: &str,
        status: PaymentStatus,
        payment_id: &str,
    ) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE claims SET payment_status = ?, payment_id = ?, updated_at = ? \
             WHERE claim_id = ? \
             AND NOT EXISTS (SELECT 1 FROM claims WHERE payment_id = ? AND claim_id != ?)",
        )
        .bind(status)
        .bind(payment_id)
        .bind(unix_timestamp())
        .bind(claim_id)
        .bind(payment_id)
        .bind(claim_id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }
        match self.claim_for_payment(payment_id).await? {
            Some(holder) if holder != claim_id => Err(DatabaseError::Conflict(format!(
                "Payment {payment_id} is already used by claim {holder}"
            ))),
            _ => Ok(false),
        }
    }

    /// The claim a gateway payment is bound to, if any.
    pub async fn claim_for_payment(&self, payment_id: &str) -> Result<Option<String>, DatabaseError> {
        let holder = sqlx::query_scalar::<_, String>("SELECT claim_id FROM claims WHERE payment_id = ?")
            .bind(payment_id)
            .fetch_optional(self.pool())
            .await?;

        Ok(holder)
    }

    // =========================================================================
    // Fulfillment
    // =========================================================================

    /// Take the processing lease on a claim for `ttl_secs`.
    ///
    /// Returns `false` if the claim does not exist or another run holds an
    /// unexpired lease.
    pub async fn acquire_claim_lease(&self, claim_id: &str, ttl_secs: i64) -> Result<bool, DatabaseError> {
        let now = unix_timestamp();

        let result = sqlx::query(
            "UPDATE claims SET lease_until = ? \
             WHERE claim_id = ? AND (lease_until IS NULL OR lease_until <= ?)",
        )
        .bind(now + ttl_secs)
        .bind(claim_id)
        .bind(now)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Drop the processing lease on a claim.
    pub async fn release_claim_lease(&self, claim_id: &str) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE claims SET lease_until = NULL WHERE claim_id = ?")
            .bind(claim_id)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    /// Mark a claim delivered with its assigned code.
    ///
    /// Returns `false` if the claim was already delivered.
    pub async fn mark_claim_delivered(
        &self,
        claim_id: &str,
        ott_code: &str,
        platform: &str,
    ) -> Result<bool, DatabaseError> {
        let now = unix_timestamp();

        let result = sqlx::query(
            "UPDATE claims SET ott_status = 'delivered', ott_code = ?, platform = ?, failure_reason = NULL, \
             automation_processed = 1, processed_at = ?, updated_at = ? \
             WHERE claim_id = ? AND ott_status != 'delivered'",
        )
        .bind(ott_code)
        .bind(platform)
        .bind(now)
        .bind(now)
        .bind(claim_id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Mark a claim failed with a reason. Delivered claims are never downgraded.
    pub async fn mark_claim_failed(&self, claim_id: &str, reason: &str) -> Result<bool, DatabaseError> {
        let now = unix_timestamp();

        let result = sqlx::query(
            "UPDATE claims SET ott_status = 'failed', failure_reason = ?, automation_processed = 1, \
             processed_at = ?, updated_at = ? \
             WHERE claim_id = ? AND ott_status != 'delivered'",
        )
        .bind(reason)
        .bind(now)
        .bind(now)
        .bind(claim_id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether any claim for this activation code has been delivered.
    pub async fn is_code_delivered(&self, activation_code: &str) -> Result<bool, DatabaseError> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM claims \
             WHERE TRIM(activation_code) = ? COLLATE NOCASE AND ott_status = 'delivered'",
        )
        .bind(activation_code.trim())
        .fetch_one(self.pool())
        .await?;

        Ok(row.0 > 0)
    }

    /// Record which notification channels reached the customer.
    pub async fn record_notifications(
        &self,
        claim_id: &str,
        email_sent: bool,
        whatsapp_sent: bool,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            "UPDATE claims SET email_sent = ?, whatsapp_sent = ?, updated_at = ? WHERE claim_id = ?",
        )
        .bind(email_sent)
        .bind(whatsapp_sent)
        .bind(unix_timestamp())
        .bind(claim_id)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    // =========================================================================
    // Reporting
    // =========================================================================

    /// Claim counts grouped by fulfillment status.
    pub async fn count_claims_by_ott_status(&self) -> Result<Vec<(OttStatus, i64)>, DatabaseError> {
        let rows = sqlx::query_as::<_, (OttStatus, i64)>(
            "SELECT ott_status, COUNT(*) FROM claims GROUP BY ott_status ORDER BY ott_status",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    /// Claim counts grouped by payment status.
    pub async fn count_claims_by_payment_status(
        &self,
    ) -> Result<Vec<(PaymentStatus, i64)>, DatabaseError> {
        let rows = sqlx::query_as::<_, (PaymentStatus, i64)>(
            "SELECT payment_status, COUNT(*) FROM claims GROUP BY payment_status ORDER BY payment_status",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    /// Number of claims the automation would pick up next.
    pub async fn count_automation_candidates(&self) -> Result<i64, DatabaseError> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM claims \
             WHERE payment_status = 'paid' AND ott_status != 'delivered' AND automation_processed = 0",
        )
        .fetch_one(self.pool())
        .await?;

        Ok(row.0)
    }
}
