//! Data models for `OTTclaim` storage.
//!
//! Status columns are stored as snake_case TEXT and surfaced as enums so a
//! misspelt status cannot reach the database.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum OttStatus {
    Pending,
    Delivered,
    Failed,
    AlreadyClaimed,
    ActivationCodeNotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum SalesStatus {
    Available,
    Claimed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum KeyStatus {
    Available,
    Assigned,
    Used,
}

impl PaymentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
        }
    }
}

impl OttStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
            Self::AlreadyClaimed => "already_claimed",
            Self::ActivationCodeNotFound => "activation_code_not_found",
        }
    }

    /// Statuses assigned at intake that can never be paid for or fulfilled.
    pub const fn is_rejected_at_intake(self) -> bool {
        matches!(self, Self::AlreadyClaimed | Self::ActivationCodeNotFound)
    }
}

impl SalesStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Claimed => "claimed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for OttStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer's request to redeem a promotional OTT subscription.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub claim_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub activation_code: String,
    pub purchase_type: Option<String>,
    pub payment_status: PaymentStatus,
    pub payment_id: Option<String>,
    pub ott_status: OttStatus,
    pub ott_code: Option<String>,
    pub platform: Option<String>,
    pub failure_reason: Option<String>,
    pub automation_processed: bool,
    pub email_sent: bool,
    pub whatsapp_sent: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub processed_at: Option<i64>,
}

/// A legitimately sold, claimable product unit.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SalesRecord {
    pub id: String,
    pub activation_code: String,
    pub product: String,
    pub status: SalesStatus,
    pub claimed_by: Option<String>,
    pub claimed_date: Option<i64>,
    pub created_at: i64,
}

/// A redeemable subscription code for a streaming platform.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OttKey {
    pub id: String,
    pub activation_code: String,
    pub platform: String,
    pub status: KeyStatus,
    pub assigned_email: Option<String>,
    pub assigned_date: Option<i64>,
    pub claim_id: Option<String>,
    pub created_at: i64,
}

/// One row of the key inventory report.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct KeyInventory {
    pub platform: String,
    pub status: KeyStatus,
    pub count: i64,
}
