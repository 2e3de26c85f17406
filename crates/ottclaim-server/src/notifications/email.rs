//! Transactional email API client.
//!
//! Posts `{from, to, subject, html}` JSON to a configured endpoint with a
//! bearer API key.

use serde::Serialize;
use tracing::debug;

use ottclaim_core::config::EmailConfig;

use super::{NotificationError, api_error};
use crate::outbound::http_client;

/// An email to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Wire body sent to the email API.
#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    from: String,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Client for the transactional email API.
#[derive(Debug)]
pub struct EmailClient {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

impl EmailClient {
    /// Build a client from config. Returns `Ok(None)` when no API URL is set.
    pub fn from_config(config: &EmailConfig) -> Result<Option<Self>, NotificationError> {
        let Some(api_url) = config.api_url.as_deref().filter(|u| !u.is_empty()) else {
            return Ok(None);
        };
        if config.from_address.is_empty() {
            return Err(NotificationError::Config("email.from_address is empty".into()));
        }

        let http = http_client().map_err(|e| NotificationError::Config(e.to_string()))?;
        let from = if config.from_name.is_empty() {
            config.from_address.clone()
        } else {
            format!("{} <{}>", config.from_name, config.from_address)
        };

        debug!(api_url, "Email client initialized");

        Ok(Some(Self {
            http,
            api_url: api_url.to_string(),
            api_key: config.api_key.clone(),
            from,
        }))
    }

    /// The sender as it appears in the `from` field.
    pub fn from_header(&self) -> &str {
        &self.from
    }

    fn request_body<'a>(&self, message: &'a EmailMessage) -> EmailRequest<'a> {
        EmailRequest {
            from: self.from.clone(),
            to: [message.to.as_str()],
            subject: &message.subject,
            html: &message.html,
        }
    }

    /// Send one email.
    pub async fn send(&self, message: &EmailMessage) -> Result<(), NotificationError> {
        let mut request = self.http.post(&self.api_url).json(&self.request_body(message));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NotificationError::Request(e.to_string()))?;

        if response.status().is_success() {
            debug!(to = %message.to, "Email sent");
            Ok(())
        } else {
            Err(api_error(response).await)
        }
    }
}
