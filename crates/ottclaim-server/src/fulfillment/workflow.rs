//! The claim fulfillment workflow.

use tracing::{debug, error, info, instrument, warn};

use ottclaim_core::config::FulfillmentConfig;

use super::outcome::{BatchSummary, FulfillmentError, FulfillmentOutcome, Step, at};
use super::platform::resolve_platform;
use crate::notifications::Notifier;
use crate::storage::{
    Claim, ClaimDatabase, DatabaseError, KeyMatch, OttKey, OttStatus, PaymentStatus, SalesStatus,
};

#[derive(Debug, Clone, Copy)]
pub struct FulfillmentOptions {
    /// Fall back to a key of any platform when none matches.
    pub allow_any_platform_fallback: bool,
}

impl Default for FulfillmentOptions {
    fn default() -> Self {
        Self {
            allow_any_platform_fallback: true,
        }
    }
}

impl From<&FulfillmentConfig> for FulfillmentOptions {
    fn from(config: &FulfillmentConfig) -> Self {
        Self {
            allow_any_platform_fallback: config.allow_any_platform_fallback,
        }
    }
}

/// How long a run may hold a claim before another run can take it over.
const CLAIM_LEASE_SECS: i64 = 300;

/// Turns paid claims into delivered OTT codes.
pub struct FulfillmentService {
    db: ClaimDatabase,
    notifier: Notifier,
    options: FulfillmentOptions,
}

impl FulfillmentService {
    pub const fn new(db: ClaimDatabase, notifier: Notifier, options: FulfillmentOptions) -> Self {
        Self {
            db,
            notifier,
            options,
        }
    }

    /// Run the workflow for one claim.
    ///
    /// Ineligible claims (missing, unpaid, already delivered) are rejected
    /// without touching any record. Every later failure is written to the
    /// claim as `failed` with a reason and reported to the customer. A claim
    /// is processed by one run at a time; a concurrent run is turned away
    /// with [`FulfillmentError::ClaimInProgress`].
    #[instrument(skip_all, fields(claim_id = %claim_id))]
    pub async fn process_claim(&self, claim_id: &str) -> Result<FulfillmentOutcome, FulfillmentError> {
        self.eligible_claim(claim_id).await?;

        let leased = self
            .db
            .acquire_claim_lease(claim_id, CLAIM_LEASE_SECS)
            .await
            .map_err(at(Step::Validation))?;
        if !leased {
            debug!("Claim is being processed by another run");
            return Err(FulfillmentError::ClaimInProgress(claim_id.to_string()));
        }

        let result = self.run_leased(claim_id).await;
        if let Err(e) = self.db.release_claim_lease(claim_id).await {
            warn!(error = %e, "Failed to release claim lease");
        }
        result
    }

    /// Re-check eligibility under the lease, then fulfill.
    async fn run_leased(&self, claim_id: &str) -> Result<FulfillmentOutcome, FulfillmentError> {
        let claim = self.eligible_claim(claim_id).await?;

        match self.fulfill(&claim).await {
            Ok(outcome) => {
                info!(ott_code = %outcome.ott_code, platform = %outcome.platform, "Claim fulfilled");
                Ok(outcome)
            }
            Err(err) => {
                if err.is_terminal() {
                    self.record_failure(&claim, &err).await;
                }
                Err(err)
            }
        }
    }

    async fn eligible_claim(&self, claim_id: &str) -> Result<Claim, FulfillmentError> {
        let claim = match self.db.get_claim(claim_id).await {
            Ok(claim) => claim,
            Err(DatabaseError::NotFound(_)) => {
                return Err(FulfillmentError::ClaimNotFound(claim_id.to_string()));
            }
            Err(e) => return Err(at(Step::Validation)(e)),
        };

        if claim.payment_status != PaymentStatus::Paid {
            return Err(FulfillmentError::PaymentNotCompleted {
                status: claim.payment_status,
            });
        }
        if claim.ott_status == OttStatus::Delivered {
            return Err(FulfillmentError::AlreadyDelivered(claim.claim_id));
        }
        Ok(claim)
    }

    /// Run the workflow over up to `limit` claims awaiting automation,
    /// oldest first, one at a time.
    #[instrument(skip(self))]
    pub async fn process_batch(&self, limit: u32) -> Result<BatchSummary, FulfillmentError> {
        let candidates = self
            .db
            .list_automation_candidates(limit)
            .await
            .map_err(at(Step::Validation))?;

        let mut summary = BatchSummary::default();
        for claim in candidates {
            let result = self.process_claim(&claim.claim_id).await;
            summary.record(&claim.claim_id, &result);
        }

        if summary.processed > 0 {
            info!(
                processed = summary.processed,
                delivered = summary.delivered,
                failed = summary.failed,
                "Batch complete"
            );
        } else {
            debug!("Batch found no claims");
        }
        Ok(summary)
    }

    async fn fulfill(&self, claim: &Claim) -> Result<FulfillmentOutcome, FulfillmentError> {
        let code = claim.activation_code.trim();

        let record = self
            .db
            .find_sales_record(code)
            .await
            .map_err(at(Step::SalesLookup))?
            .ok_or_else(|| FulfillmentError::ActivationCodeNotFound(code.to_string()))?;

        if record.status == SalesStatus::Claimed {
            let stranded = record.claimed_by.as_deref() == Some(claim.email.as_str())
                && !self
                    .db
                    .is_code_delivered(&record.activation_code)
                    .await
                    .map_err(at(Step::DuplicateCheck))?;
            if stranded {
                return Err(FulfillmentError::ActivationCodeHeld(record.activation_code));
            }
            return Err(FulfillmentError::DuplicateClaim(record.activation_code));
        }
        let won = self
            .db
            .claim_sales_record(&record.id, &claim.email)
            .await
            .map_err(at(Step::DuplicateCheck))?;
        if !won {
            return Err(FulfillmentError::DuplicateClaim(record.activation_code));
        }
        debug!(activation_code = %record.activation_code, "Sales record claimed");

        let platform = resolve_platform(&record.product);
        let Some(key) = self.take_key(platform, claim).await? else {
            warn!(
                activation_code = %record.activation_code,
                platform,
                "Sales record stays claimed without a key; release it to retry"
            );
            return Err(FulfillmentError::NoAvailableKeys(platform.to_string()));
        };

        let updated = self
            .db
            .mark_claim_delivered(&claim.claim_id, &key.activation_code, &key.platform)
            .await
            .map_err(at(Step::ClaimUpdate))?;
        if !updated {
            error!(ott_code = %key.activation_code, "Claim delivered concurrently, key left assigned");
            return Err(FulfillmentError::AlreadyDelivered(claim.claim_id.clone()));
        }

        let delivery = self
            .notifier
            .notify_delivered(claim, &key.activation_code, &key.platform)
            .await;
        if let Err(e) = self
            .db
            .record_notifications(&claim.claim_id, delivery.email_sent, delivery.whatsapp_sent)
            .await
        {
            warn!(error = %e, "Failed to record notification flags");
        }

        Ok(FulfillmentOutcome {
            claim_id: claim.claim_id.clone(),
            ott_code: key.activation_code,
            platform: key.platform,
            delivery,
        })
    }

    /// Exact platform, then fuzzy, then (if allowed) any platform.
    async fn take_key(&self, platform: &str, claim: &Claim) -> Result<Option<OttKey>, FulfillmentError> {
        let mut attempts = vec![KeyMatch::Exact(platform), KeyMatch::Fuzzy(platform)];
        if self.options.allow_any_platform_fallback {
            attempts.push(KeyMatch::Any);
        }

        for matching in attempts {
            let key = self
                .db
                .assign_available_key(matching, &claim.email, &claim.claim_id)
                .await
                .map_err(at(Step::KeyAssignment))?;
            if let Some(key) = key {
                if !matches!(matching, KeyMatch::Exact(_)) {
                    info!(requested = platform, assigned = %key.platform, "Assigned key from fallback platform");
                }
                return Ok(Some(key));
            }
        }
        Ok(None)
    }

    async fn record_failure(&self, claim: &Claim, err: &FulfillmentError) {
        let reason = err.to_string();
        warn!(step = ?err.step(), reason = %reason, "Claim fulfillment failed");

        match self.db.mark_claim_failed(&claim.claim_id, &reason).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("Claim already delivered, failure not recorded");
                return;
            }
            Err(e) => error!(error = %e, "Failed to record claim failure"),
        }

        let delivery = self.notifier.notify_failed(claim, &reason).await;
        if let Err(e) = self
            .db
            .record_notifications(&claim.claim_id, delivery.email_sent, delivery.whatsapp_sent)
            .await
        {
            warn!(error = %e, "Failed to record notification flags");
        }
    }
}
