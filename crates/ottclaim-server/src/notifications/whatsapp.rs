//! WhatsApp Cloud API client for template messages.

use serde::Serialize;
use tracing::debug;

use ottclaim_core::config::WhatsAppConfig;

use super::{NotificationError, api_error};
use crate::outbound::http_client;

/// Which pre-approved template to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhatsAppTemplate {
    Delivered,
    Failed,
}

#[derive(Debug, Serialize)]
struct TemplateMessage<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    template: TemplateBody<'a>,
}

#[derive(Debug, Serialize)]
struct TemplateBody<'a> {
    name: &'a str,
    language: Language<'a>,
    components: Vec<Component<'a>>,
}

#[derive(Debug, Serialize)]
struct Language<'a> {
    code: &'a str,
}

#[derive(Debug, Serialize)]
struct Component<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    parameters: Vec<TextParameter<'a>>,
}

#[derive(Debug, Serialize)]
struct TextParameter<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

/// Client for the WhatsApp Cloud API messages endpoint.
#[derive(Debug)]
pub struct WhatsAppClient {
    http: reqwest::Client,
    messages_url: String,
    access_token: String,
    success_template: String,
    failure_template: String,
    language_code: String,
}

impl WhatsAppClient {
    /// Build a client from config. Returns `Ok(None)` unless both the access
    /// token and the sender phone number id are set.
    pub fn from_config(config: &WhatsAppConfig) -> Result<Option<Self>, NotificationError> {
        let (Some(token), Some(phone_number_id)) = (
            config.access_token.as_deref().filter(|t| !t.is_empty()),
            config.phone_number_id.as_deref().filter(|p| !p.is_empty()),
        ) else {
            return Ok(None);
        };
        if config.success_template.is_empty() || config.failure_template.is_empty() {
            return Err(NotificationError::Config(
                "whatsapp template names must not be empty".into(),
            ));
        }

        let http = http_client().map_err(|e| NotificationError::Config(e.to_string()))?;
        let messages_url = format!(
            "{}/{phone_number_id}/messages",
            config.api_url.trim_end_matches('/')
        );

        debug!(%messages_url, "WhatsApp client initialized");

        Ok(Some(Self {
            http,
            messages_url,
            access_token: token.to_string(),
            success_template: config.success_template.clone(),
            failure_template: config.failure_template.clone(),
            language_code: config.language_code.clone(),
        }))
    }

    /// The fully-resolved messages endpoint.
    pub fn messages_url(&self) -> &str {
        &self.messages_url
    }

    fn template_name(&self, template: WhatsAppTemplate) -> &str {
        match template {
            WhatsAppTemplate::Delivered => &self.success_template,
            WhatsAppTemplate::Failed => &self.failure_template,
        }
    }

    fn build_message<'a>(
        &'a self,
        phone: &'a str,
        template: WhatsAppTemplate,
        params: &'a [String],
    ) -> TemplateMessage<'a> {
        TemplateMessage {
            messaging_product: "whatsapp",
            to: phone,
            kind: "template",
            template: TemplateBody {
                name: self.template_name(template),
                language: Language {
                    code: &self.language_code,
                },
                components: vec![Component {
                    kind: "body",
                    parameters: params
                        .iter()
                        .map(|text| TextParameter { kind: "text", text })
                        .collect(),
                }],
            },
        }
    }

    /// Send a template message to `phone` (digits with country code).
    pub async fn send_template(
        &self,
        phone: &str,
        template: WhatsAppTemplate,
        params: &[String],
    ) -> Result<(), NotificationError> {
        let response = self
            .http
            .post(&self.messages_url)
            .bearer_auth(&self.access_token)
            .json(&self.build_message(phone, template, params))
            .send()
            .await
            .map_err(|e| NotificationError::Request(e.to_string()))?;

        if response.status().is_success() {
            debug!(?template, "WhatsApp template sent");
            Ok(())
        } else {
            Err(api_error(response).await)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> WhatsAppConfig {
        WhatsAppConfig {
            api_url: "https://graph.example.com/v19.0/".to_string(),
            access_token: Some("token".to_string()),
            phone_number_id: Some("1055".to_string()),
            ..WhatsAppConfig::default()
        }
    }

    #[test]
    fn missing_credentials_disable_whatsapp() {
        let mut cfg = config();
        cfg.access_token = None;
        assert!(WhatsAppClient::from_config(&cfg).unwrap().is_none());

        let mut cfg = config();
        cfg.phone_number_id = Some(String::new());
        assert!(WhatsAppClient::from_config(&cfg).unwrap().is_none());
    }

    #[test]
    fn messages_url_joins_phone_number_id() {
        let client = WhatsAppClient::from_config(&config()).unwrap().unwrap();
        assert_eq!(
            client.messages_url(),
            "https://graph.example.com/v19.0/1055/messages"
        );
    }

    #[test]
    fn template_message_serializes_body_parameters() {
        let client = WhatsAppClient::from_config(&config()).unwrap().unwrap();
        let params = vec!["Asha".to_string(), "Netflix".to_string(), "K-1".to_string()];
        let json = serde_json::to_value(client.build_message(
            "919876543210",
            WhatsAppTemplate::Delivered,
            &params,
        ))
        .unwrap();

        assert_eq!(json["messaging_product"], "whatsapp");
        assert_eq!(json["to"], "919876543210");
        assert_eq!(json["type"], "template");
        assert_eq!(json["template"]["name"], "ott_code_delivered");
        assert_eq!(json["template"]["language"]["code"], "en");
        let parameters = &json["template"]["components"][0]["parameters"];
        assert_eq!(parameters[2]["text"], "K-1");
        assert_eq!(parameters[0]["type"], "text");
    }

    #[test]
    fn failure_template_uses_its_own_name() {
        let client = WhatsAppClient::from_config(&config()).unwrap().unwrap();
        let json = serde_json::to_value(client.build_message("91", WhatsAppTemplate::Failed, &[]))
            .unwrap();
        assert_eq!(json["template"]["name"], "ott_claim_failed");
    }
}
