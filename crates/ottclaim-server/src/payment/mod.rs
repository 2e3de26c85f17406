//! Payment verification against the gateway REST API.
//!
//! Checkout itself happens in the customer's browser. The server only
//! fetches the payment the browser reports and decides whether the claim's
//! processing fee was paid.

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use ottclaim_core::config::PaymentConfig;

use crate::outbound::http_client;
use crate::storage::PaymentStatus;

/// Payment gateway client errors.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment gateway configuration error: {0}")]
    Config(String),

    #[error("Payment gateway request failed: {0}")]
    Request(String),

    #[error("Payment gateway API error ({status}): {body}")]
    Api { status: u16, body: String },
}

/// The subset of the gateway's payment entity we care about.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayPayment {
    pub id: String,
    /// Amount in minor currency units.
    pub amount: i64,
    pub currency: String,
    /// `created`, `authorized`, `captured`, `refunded` or `failed`.
    pub status: String,
}

/// What a gateway payment means for a claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentVerdict {
    pub status: PaymentStatus,
    pub detail: String,
}

/// Map a gateway payment onto a claim payment status.
pub fn assess(payment: &GatewayPayment, expected_amount: i64, expected_currency: &str) -> PaymentVerdict {
    match payment.status.as_str() {
        "captured" | "authorized" => {
            if !payment.currency.eq_ignore_ascii_case(expected_currency) {
                PaymentVerdict {
                    status: PaymentStatus::Failed,
                    detail: format!(
                        "Currency mismatch: expected {expected_currency}, got {}",
                        payment.currency
                    ),
                }
            } else if payment.amount < expected_amount {
                PaymentVerdict {
                    status: PaymentStatus::Failed,
                    detail: format!(
                        "Amount too low: expected {expected_amount}, got {}",
                        payment.amount
                    ),
                }
            } else {
                PaymentVerdict {
                    status: PaymentStatus::Paid,
                    detail: format!("Payment {} {}", payment.id, payment.status),
                }
            }
        }
        "failed" => PaymentVerdict {
            status: PaymentStatus::Failed,
            detail: format!("Payment {} failed at the gateway", payment.id),
        },
        other => PaymentVerdict {
            status: PaymentStatus::Pending,
            detail: format!("Payment {} is {other}", payment.id),
        },
    }
}

/// Gateway REST client.
#[derive(Debug)]
pub struct PaymentClient {
    http: reqwest::Client,
    api_url: String,
    key_id: String,
    key_secret: String,
    processing_fee: i64,
    currency: String,
}

impl PaymentClient {
    /// Build a client from config. Returns `Ok(None)` unless both key id and
    /// secret are set.
    pub fn from_config(config: &PaymentConfig) -> Result<Option<Self>, PaymentError> {
        let (Some(key_id), Some(key_secret)) = (
            config.key_id.as_deref().filter(|k| !k.is_empty()),
            config.key_secret.as_deref().filter(|k| !k.is_empty()),
        ) else {
            return Ok(None);
        };
        if config.processing_fee <= 0 {
            return Err(PaymentError::Config(
                "payment.processing_fee must be positive".into(),
            ));
        }

        let http = http_client().map_err(|e| PaymentError::Config(e.to_string()))?;

        Ok(Some(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            key_id: key_id.to_string(),
            key_secret: key_secret.to_string(),
            processing_fee: config.processing_fee,
            currency: config.currency.clone(),
        }))
    }

    /// Fetch a payment by gateway id.
    pub async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, PaymentError> {
        if payment_id.is_empty() || !payment_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(PaymentError::Config(format!("Invalid payment id: {payment_id:?}")));
        }

        let url = format!("{}/payments/{payment_id}", self.api_url);
        let response = self
            .http
            .get(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await
            .map_err(|e| PaymentError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            return Err(PaymentError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payment: GatewayPayment = response
            .json()
            .await
            .map_err(|e| PaymentError::Request(e.to_string()))?;
        debug!(payment_id = %payment.id, status = %payment.status, "Fetched gateway payment");
        Ok(payment)
    }

    /// Fetch and assess a payment against the configured fee.
    pub async fn verify(&self, payment_id: &str) -> Result<PaymentVerdict, PaymentError> {
        let payment = self.fetch_payment(payment_id).await?;
        Ok(assess(&payment, self.processing_fee, &self.currency))
    }
}
