use reqwest::Client;
use serde_json::json;

use crate::{config::Settings, error::ApiError};

/// Outbound notification sink. The monitor is generic over this so tests
/// can swap in an in-memory fake.
pub trait Mailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), ApiError>;
}

/// Sends mail through an HTTP relay API (JSON `{from, to, subject, text}`,
/// bearer-key auth).
#[derive(Clone)]
pub struct HttpMailer {
    http: Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            http: Client::new(),
            api_url: settings.mail_api_url.clone(),
            api_key: settings.mail_api_key.clone(),
            from: settings.mail_from.clone(),
        }
    }
}

impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), ApiError> {
        if self.api_url.trim().is_empty() {
            return Err(ApiError::Upstream(
                "MAIL_API_URL is missing in .env".to_string(),
            ));
        }

        let payload = json!({
            "from": self.from,
            "to": to,
            "subject": subject,
            "text": body,
        });

        let res = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ApiError::Upstream(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!(
                "mail relay failed: {status} {text}"
            )));
        }

        Ok(())
    }
}
