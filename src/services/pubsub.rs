// src/services/pubsub.rs

//! Pub/sub relay client.
//!
//! Publishes through the REST shape `POST {endpoint}/topics/{topic}:publish`
//! with a body of `{"messages": [...]}` and a reply of `{"messageIds": [...]}`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{PubSubConfig, PubSubMessage, require};
use crate::utils::http::ensure_success;

const SERVICE: &str = "pub/sub relay";

/// Publishes messages to topics.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish one message and return its broker-assigned id.
    async fn publish(&self, topic: &str, message: &PubSubMessage) -> Result<String>;
}

#[derive(Serialize)]
struct PublishRequest<'a> {
    messages: [&'a PubSubMessage; 1],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    #[serde(default)]
    message_ids: Vec<String>,
}

/// HTTP publisher.
pub struct HttpPublisher {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpPublisher {
    pub fn new(client: Client, config: &PubSubConfig) -> Result<Self> {
        let endpoint = require(&config.endpoint, "pubsub.endpoint")?;
        let token = Some(config.token.trim())
            .filter(|token| !token.is_empty())
            .map(String::from);

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn publish_url(&self, topic: &str) -> String {
        format!("{}/topics/{}:publish", self.endpoint, topic)
    }
}

#[async_trait]
impl Publisher for HttpPublisher {
    async fn publish(&self, topic: &str, message: &PubSubMessage) -> Result<String> {
        let mut request = self
            .client
            .post(self.publish_url(topic))
            .json(&PublishRequest {
                messages: [message],
            });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = ensure_success(SERVICE, request.send().await?).await?;
        let reply: PublishResponse = response.json().await?;

        let id = reply
            .message_ids
            .into_iter()
            .next()
            .ok_or_else(|| AppError::api(SERVICE, 200, "no message id returned"))?;
        log::info!("Message {} published to {}", id, topic);
        Ok(id)
    }
}
