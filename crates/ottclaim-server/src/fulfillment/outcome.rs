//! Workflow results and errors.

use serde::Serialize;
use thiserror::Error;

use crate::notifications::DeliveryReport;
use crate::storage::{DatabaseError, PaymentStatus};

/// The workflow step a result refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Validation,
    SalesLookup,
    DuplicateCheck,
    KeyAssignment,
    ClaimUpdate,
    Completed,
}

/// Coarse error classes, used to pick an HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Precondition,
    Conflict,
    ResourceExhausted,
    Internal,
}

#[derive(Debug, Error)]
pub enum FulfillmentError {
    #[error("Claim not found: {0}")]
    ClaimNotFound(String),

    #[error("Payment not completed (status: {status})")]
    PaymentNotCompleted { status: PaymentStatus },

    #[error("OTT code already delivered for claim {0}")]
    AlreadyDelivered(String),

    #[error("Claim {0} is already being processed")]
    ClaimInProgress(String),

    #[error("Invalid activation code: {0}")]
    ActivationCodeNotFound(String),

    #[error("Duplicate claim: activation code {0} has already been claimed")]
    DuplicateClaim(String),

    #[error("Activation code {0} is still held from an earlier attempt; release it to retry")]
    ActivationCodeHeld(String),

    #[error("No available keys for platform {0}")]
    NoAvailableKeys(String),

    #[error("Internal error: {source}")]
    Database {
        step: Step,
        #[source]
        source: DatabaseError,
    },
}

impl FulfillmentError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ClaimNotFound(_) | Self::ActivationCodeNotFound(_) => ErrorKind::NotFound,
            Self::PaymentNotCompleted { .. } | Self::AlreadyDelivered(_) => ErrorKind::Precondition,
            Self::ClaimInProgress(_) | Self::DuplicateClaim(_) | Self::ActivationCodeHeld(_) => {
                ErrorKind::Conflict
            }
            Self::NoAvailableKeys(_) => ErrorKind::ResourceExhausted,
            Self::Database { .. } => ErrorKind::Internal,
        }
    }

    pub const fn step(&self) -> Step {
        match self {
            Self::ClaimNotFound(_)
            | Self::PaymentNotCompleted { .. }
            | Self::AlreadyDelivered(_)
            | Self::ClaimInProgress(_) => Step::Validation,
            Self::ActivationCodeNotFound(_) => Step::SalesLookup,
            Self::DuplicateClaim(_) | Self::ActivationCodeHeld(_) => Step::DuplicateCheck,
            Self::NoAvailableKeys(_) => Step::KeyAssignment,
            Self::Database { step, .. } => *step,
        }
    }

    /// Whether the failure is written back to the claim and sent to the
    /// customer. Eligibility rejections leave the claim untouched.
    pub const fn is_terminal(&self) -> bool {
        !matches!(self.step(), Step::Validation)
    }
}

/// Tag a storage error with the step it happened in.
pub(crate) fn at(step: Step) -> impl Fn(DatabaseError) -> FulfillmentError {
    move |source| FulfillmentError::Database { step, source }
}

/// A successfully fulfilled claim.
#[derive(Debug, Clone)]
pub struct FulfillmentOutcome {
    pub claim_id: String,
    pub ott_code: String,
    pub platform: String,
    pub delivery: DeliveryReport,
}

impl FulfillmentOutcome {
    pub fn message(&self) -> String {
        let mut message = format!("OTT code for {} assigned", self.platform);
        match (self.delivery.email_sent, self.delivery.whatsapp_sent) {
            (true, true) => message.push_str(" and sent by email and WhatsApp"),
            (true, false) => message.push_str(" and sent by email"),
            (false, true) => message.push_str(" and sent by WhatsApp"),
            (false, false) => message.push_str(", notification not sent"),
        }
        message
    }
}

/// Wire shape of a single workflow run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResult {
    pub success: bool,
    pub message: String,
    pub step: Step,
    pub ott_code: Option<String>,
}

impl From<&Result<FulfillmentOutcome, FulfillmentError>> for WorkflowResult {
    fn from(result: &Result<FulfillmentOutcome, FulfillmentError>) -> Self {
        match result {
            Ok(outcome) => Self {
                success: true,
                message: outcome.message(),
                step: Step::Completed,
                ott_code: Some(outcome.ott_code.clone()),
            },
            Err(err) => Self {
                success: false,
                message: err.to_string(),
                step: err.step(),
                ott_code: None,
            },
        }
    }
}

/// One entry of a batch run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResult {
    pub claim_id: String,
    #[serde(flatten)]
    pub result: WorkflowResult,
}

/// Totals and per-claim results of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub delivered: usize,
    pub failed: usize,
    pub results: Vec<ClaimResult>,
}

impl BatchSummary {
    pub fn record(&mut self, claim_id: &str, result: &Result<FulfillmentOutcome, FulfillmentError>) {
        self.processed += 1;
        if result.is_ok() {
            self.delivered += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(ClaimResult {
            claim_id: claim_id.to_string(),
            result: WorkflowResult::from(result),
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn steps_and_kinds() {
        let err = FulfillmentError::DuplicateClaim("NF-1".into());
        assert_eq!(err.step(), Step::DuplicateCheck);
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.is_terminal());

        let err = FulfillmentError::PaymentNotCompleted {
            status: PaymentStatus::Pending,
        };
        assert_eq!(err.step(), Step::Validation);
        assert!(!err.is_terminal());

        let err = FulfillmentError::ClaimInProgress("CLM-1".into());
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(!err.is_terminal());

        let err = FulfillmentError::ActivationCodeHeld("NF-1".into());
        assert_eq!(err.step(), Step::DuplicateCheck);
        assert!(err.is_terminal());

        let err = at(Step::KeyAssignment)(DatabaseError::Query("locked".into()));
        assert_eq!(err.step(), Step::KeyAssignment);
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.to_string().starts_with("Internal error"));
    }

    #[test]
    fn workflow_result_json_shape() {
        let ok: Result<FulfillmentOutcome, FulfillmentError> = Ok(FulfillmentOutcome {
            claim_id: "CLM-1".into(),
            ott_code: "KEY-1".into(),
            platform: "Netflix".into(),
            delivery: DeliveryReport {
                email_sent: true,
                whatsapp_sent: false,
            },
        });
        let json = serde_json::to_value(WorkflowResult::from(&ok)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["step"], "completed");
        assert_eq!(json["ottCode"], "KEY-1");
        assert_eq!(json["message"], "OTT code for Netflix assigned and sent by email");

        let err: Result<FulfillmentOutcome, FulfillmentError> =
            Err(FulfillmentError::NoAvailableKeys("Netflix".into()));
        let json = serde_json::to_value(WorkflowResult::from(&err)).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["step"], "key_assignment");
        assert!(json["ottCode"].is_null());
    }

    #[test]
    fn batch_summary_counts() {
        let mut summary = BatchSummary::default();
        summary.record("CLM-1", &Err(FulfillmentError::AlreadyDelivered("CLM-1".into())));
        summary.record(
            "CLM-2",
            &Ok(FulfillmentOutcome {
                claim_id: "CLM-2".into(),
                ott_code: "KEY-2".into(),
                platform: "ZEE5".into(),
                delivery: DeliveryReport::default(),
            }),
        );
        assert_eq!((summary.processed, summary.delivered, summary.failed), (2, 1, 1));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["results"][1]["claimId"], "CLM-2");
        assert_eq!(json["results"][1]["ottCode"], "KEY-2");
    }
}
