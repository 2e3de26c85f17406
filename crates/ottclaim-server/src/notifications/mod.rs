//! Customer notifications (email and WhatsApp).
//!
//! Both channels are optional. A channel without configuration is skipped,
//! and a failed send is logged and reported back, never retried.

pub mod email;
pub mod templates;
pub mod whatsapp;

use tracing::{debug, warn};

use ottclaim_core::config::{EmailConfig, WhatsAppConfig};

pub use email::{EmailClient, EmailMessage};
pub use whatsapp::{WhatsAppClient, WhatsAppTemplate};

use crate::storage::Claim;

/// Errors that can occur in the notification subsystem.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// The channel is configured inconsistently.
    #[error("Notification config error: {0}")]
    Config(String),

    /// HTTP request to the provider failed.
    #[error("Notification request error: {0}")]
    Request(String),

    /// The provider returned a non-success status code.
    #[error("Notification API error (status {status}): {body}")]
    ApiError {
        /// HTTP status code returned by the provider.
        status: u16,
        /// Response body from the provider.
        body: String,
    },
}

/// Which channels reached the customer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub email_sent: bool,
    pub whatsapp_sent: bool,
}

/// Read a provider error response into a [`NotificationError`].
pub(crate) async fn api_error(response: reqwest::Response) -> NotificationError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read body>".to_string());
    NotificationError::ApiError { status, body }
}

/// Sends claim outcomes to customers over every configured channel.
#[derive(Debug, Default)]
pub struct Notifier {
    email: Option<EmailClient>,
    whatsapp: Option<WhatsAppClient>,
}

impl Notifier {
    pub const fn new(email: Option<EmailClient>, whatsapp: Option<WhatsAppClient>) -> Self {
        Self { email, whatsapp }
    }

    /// A notifier with every channel switched off.
    pub const fn disabled() -> Self {
        Self {
            email: None,
            whatsapp: None,
        }
    }

    pub fn from_config(
        email: &EmailConfig,
        whatsapp: &WhatsAppConfig,
    ) -> Result<Self, NotificationError> {
        Ok(Self {
            email: EmailClient::from_config(email)?,
            whatsapp: WhatsAppClient::from_config(whatsapp)?,
        })
    }

    pub const fn email_enabled(&self) -> bool {
        self.email.is_some()
    }

    pub const fn whatsapp_enabled(&self) -> bool {
        self.whatsapp.is_some()
    }

    /// Tell the customer their code is ready.
    pub async fn notify_delivered(&self, claim: &Claim, ott_code: &str, platform: &str) -> DeliveryReport {
        let content = templates::delivered_email(&claim.name, platform, ott_code, &claim.claim_id);
        let params = templates::delivered_whatsapp_params(&claim.name, platform, ott_code);
        self.dispatch(claim, content, WhatsAppTemplate::Delivered, params)
            .await
    }

    /// Tell the customer their claim failed and why.
    pub async fn notify_failed(&self, claim: &Claim, reason: &str) -> DeliveryReport {
        let content = templates::failed_email(&claim.name, reason, &claim.claim_id);
        let params = templates::failed_whatsapp_params(&claim.name, &claim.claim_id, reason);
        self.dispatch(claim, content, WhatsAppTemplate::Failed, params)
            .await
    }

    async fn dispatch(
        &self,
        claim: &Claim,
        content: templates::EmailContent,
        template: WhatsAppTemplate,
        params: Vec<String>,
    ) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        match &self.email {
            Some(client) => {
                let message = EmailMessage {
                    to: claim.email.clone(),
                    subject: content.subject,
                    html: content.html,
                };
                match client.send(&message).await {
                    Ok(()) => report.email_sent = true,
                    Err(e) => {
                        warn!(claim_id = %claim.claim_id, error = %e, "Email notification failed");
                    }
                }
            }
            None => debug!(claim_id = %claim.claim_id, "Email disabled, skipping"),
        }

        match (&self.whatsapp, claim.phone.as_deref()) {
            (Some(client), Some(phone)) => match client.send_template(phone, template, &params).await {
                Ok(()) => report.whatsapp_sent = true,
                Err(e) => {
                    warn!(claim_id = %claim.claim_id, error = %e, "WhatsApp notification failed");
                }
            },
            (Some(_), None) => debug!(claim_id = %claim.claim_id, "No phone number, skipping WhatsApp"),
            (None, _) => debug!(claim_id = %claim.claim_id, "WhatsApp disabled, skipping"),
        }

        report
    }
}
