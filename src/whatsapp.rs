use reqwest::Client as HttpClient;
use serde_json::{json, Value};

use crate::{config::WhatsAppConfig, models::TemplatedMessage, notify::NotifyError};

pub struct WhatsAppClient {
    config: WhatsAppConfig,
    http_client: HttpClient,
}

impl WhatsAppClient {
    pub fn new(config: WhatsAppConfig) -> Result<Self, NotifyError> {
        let http_client = HttpClient::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|err| NotifyError::Rejected(err.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub async fn send_template(&self, message: &TemplatedMessage) -> Result<(), NotifyError> {
        if !self.config.enabled() {
            return Err(NotifyError::NotConfigured("whatsapp"));
        }

        let url = format!(
            "https://graph.facebook.com/{}/{}/messages",
            self.config.api_version, self.config.phone_number_id
        );
        let body = template_body(message);
        log::debug!("WhatsApp payload: {body}");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.token)
            .json(&body)
            .send()
            .await
            .map_err(|err| NotifyError::Rejected(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(NotifyError::Rejected(format!("{status}: {error_text}")));
        }

        log::info!("WhatsApp template {} sent", message.template_name);
        Ok(())
    }
}

pub fn template_body(message: &TemplatedMessage) -> Value {
    let parameters: Vec<Value> = message
        .params
        .iter()
        .map(|value| json!({ "type": "text", "text": value }))
        .collect();

    json!({
        "messaging_product": "whatsapp",
        "to": message.to,
        "type": "template",
        "template": {
            "name": message.template_name,
            "language": { "code": "en" },
            "components": [
                { "type": "body", "parameters": parameters }
            ]
        }
    })
}
