// src/services/mail.rs

//! Transactional email client.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::error::Result;
use crate::models::{EmailConfig, require};
use crate::utils::http::ensure_success;

const SERVICE: &str = "mail API";

/// A mail rendered from a stored dynamic template.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateMail {
    pub to: String,
    pub from: String,
    pub template_id: String,
    pub template_data: Value,
}

impl TemplateMail {
    /// Request body of the v3 send endpoint.
    pub fn to_request_body(&self) -> Value {
        json!({
            "personalizations": [{
                "to": [{ "email": self.to }],
                "dynamic_template_data": self.template_data,
            }],
            "from": { "email": self.from },
            "template_id": self.template_id,
        })
    }
}

/// Sends transactional email.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &TemplateMail) -> Result<()>;
}

/// HTTP client for the SendGrid v3 API.
pub struct SendGridClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl SendGridClient {
    pub fn new(client: Client, config: &EmailConfig) -> Result<Self> {
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: require(&config.api_key, "email.api_key")?.to_string(),
        })
    }
}

#[async_trait]
impl Mailer for SendGridClient {
    async fn send(&self, mail: &TemplateMail) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/v3/mail/send", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&mail.to_request_body())
            .send()
            .await?;
        ensure_success(SERVICE, response).await?;

        log::info!("Sent template {} to {}", mail.template_id, mail.to);
        Ok(())
    }
}
