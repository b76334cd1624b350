// src/lambda/mod.rs

//! AWS Lambda handlers.
//!
//! One binary serves every function; `ALLSECT_HANDLER` selects which
//! handler a deployment runs:
//!
//! | name                | input                         | output                  |
//! |---------------------|-------------------------------|-------------------------|
//! | `prismic-webhook`   | webhook payload or API GW event | `{statusCode, body}`  |
//! | `latest-news`       | ignored (scheduled)           | status + news summary   |
//! | `email-latest-news` | pub/sub push envelope         | status                  |
//! | `post-comment`      | comment payload               | status + comment id     |
//! | `backup-database`   | ignored (scheduled)           | status + backup summary |

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use lambda_runtime::{Error as LambdaError, LambdaEvent};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{error, info, instrument, warn};

use crate::config::load_lambda_config;
use crate::error::{AppError, Result};
use crate::models::{Config, PubSubMessage, PushEnvelope, require};
use crate::pipeline::{self, DocumentIndexer, WebhookOutcome, WebhookPayload};
use crate::services::{
    AlgoliaClient, ContentApiClient, HttpPublisher, NewsApiClient, SendGridClient,
};
use crate::storage::DocumentStore;
use crate::storage::s3::S3Store;
use crate::utils::http::create_async_client;

/// Environment variable selecting the handler.
pub const HANDLER_ENV: &str = "ALLSECT_HANDLER";

/// The functions this binary can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    PrismicWebhook,
    LatestNews,
    EmailLatestNews,
    PostComment,
    BackupDatabase,
}

impl HandlerKind {
    pub const ALL: [Self; 5] = [
        Self::PrismicWebhook,
        Self::LatestNews,
        Self::EmailLatestNews,
        Self::PostComment,
        Self::BackupDatabase,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::PrismicWebhook => "prismic-webhook",
            Self::LatestNews => "latest-news",
            Self::EmailLatestNews => "email-latest-news",
            Self::PostComment => "post-comment",
            Self::BackupDatabase => "backup-database",
        }
    }

    /// Read the handler from `ALLSECT_HANDLER`.
    pub fn from_env() -> Result<Self> {
        let name = std::env::var(HANDLER_ENV)
            .map_err(|_| AppError::config(format!("{HANDLER_ENV} is not set")))?;
        name.parse()
    }
}

impl FromStr for HandlerKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s.trim())
            .ok_or_else(|| AppError::config(format!("unknown handler '{s}'")))
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Process-wide state shared by all invocations.
pub struct FunctionState {
    pub kind: HandlerKind,
    pub config: Config,
    client: Client,
}

impl FunctionState {
    /// Resolve the handler, load configuration and build the HTTP client.
    pub async fn from_env() -> Result<Self> {
        let kind = HandlerKind::from_env()?;
        let config = load_lambda_config().await?;
        let client = create_async_client(&config.http)?;
        Ok(Self {
            kind,
            config,
            client,
        })
    }

    async fn document_store(&self) -> Result<DocumentStore<S3Store>> {
        let bucket = require(&self.config.storage.bucket, "storage.bucket")?;
        let objects = S3Store::from_env(bucket).await?;
        let prefix = self.config.storage.prefix.as_str();
        Ok(DocumentStore::new(objects, prefix))
    }

    async fn backup_store(&self) -> Result<S3Store> {
        let bucket = if self.config.backup.bucket.trim().is_empty() {
            require(&self.config.storage.bucket, "backup.bucket")?
        } else {
            self.config.backup.bucket.as_str()
        };
        S3Store::from_env(bucket).await
    }
}

/// Main Lambda handler function.
#[instrument(skip(state, event), fields(handler = %state.kind))]
pub async fn handler(
    state: &FunctionState,
    event: LambdaEvent<Value>,
) -> std::result::Result<Value, LambdaError> {
    let start = std::time::Instant::now();
    let (payload, context) = event.into_parts();
    info!("Invocation {}", context.request_id);

    let response = match state.kind {
        HandlerKind::PrismicWebhook => webhook_response(run_webhook(state, payload).await),
        kind => status_response(run_task(state, kind, payload).await),
    };

    info!("Finished in {}ms", start.elapsed().as_millis());
    Ok(response)
}

async fn run_webhook(state: &FunctionState, payload: Value) -> Result<WebhookOutcome> {
    let payload: WebhookPayload = parse_event_body(payload)?;
    let indexer = DocumentIndexer::from_config(&state.config.content)?;
    let content = ContentApiClient::new(state.client.clone(), &state.config.content);
    let search = AlgoliaClient::new(state.client.clone(), &state.config.search)?;

    pipeline::handle_webhook(&indexer, &content, &search, &state.config.search, payload).await
}

/// Run a non-webhook handler and return its result fields.
async fn run_task(state: &FunctionState, kind: HandlerKind, payload: Value) -> Result<Value> {
    let config = &state.config;

    match kind {
        HandlerKind::LatestNews => {
            let source = NewsApiClient::new(state.client.clone(), &config.news)?;
            let publisher = HttpPublisher::new(state.client.clone(), &config.pubsub)?;
            let db = state.document_store().await?;
            let summary = pipeline::run_latest_news(
                &config.news,
                &source,
                &db,
                &publisher,
                kind.name(),
                Utc::now(),
            )
            .await?;
            Ok(json!({ "summary": summary }))
        }
        HandlerKind::EmailLatestNews => {
            let envelope = parse_push_envelope(payload)?;
            let mailer = SendGridClient::new(state.client.clone(), &config.email)?;
            let mail = pipeline::send_latest_news_email(&config.email, &mailer, &envelope).await?;
            Ok(json!({ "to": mail.to }))
        }
        HandlerKind::PostComment => {
            let data = parse_event_body(payload)?;
            let db = state.document_store().await?;
            let collection = &config.storage.comments_collection;
            let id = pipeline::post_comment(&db, collection, data, Utc::now()).await?;
            Ok(json!({ "id": id }))
        }
        HandlerKind::BackupDatabase => {
            let db = state.document_store().await?;
            let sink = state.backup_store().await?;
            let summary = pipeline::backup_database(&db, &sink, &config.backup, Utc::now()).await?;
            Ok(json!({ "summary": summary }))
        }
        HandlerKind::PrismicWebhook => Err(AppError::config("webhook is not a task handler")),
    }
}

/// Decode the handler input, unwrapping an API Gateway proxy event.
pub fn parse_event_body<T: DeserializeOwned>(payload: Value) -> Result<T> {
    let body = match payload.get("body") {
        Some(Value::String(body)) => {
            let encoded = payload
                .get("isBase64Encoded")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let bytes = if encoded {
                STANDARD.decode(body.trim())?
            } else {
                body.as_bytes().to_vec()
            };
            serde_json::from_slice(&bytes)
        }
        _ => serde_json::from_value(payload),
    };
    body.map_err(|e| AppError::validation(format!("invalid request body: {e}")))
}

/// Accept a push envelope, or a bare message as delivered by direct invocation.
pub fn parse_push_envelope(payload: Value) -> Result<PushEnvelope> {
    if payload.get("message").is_some() {
        return parse_event_body(payload);
    }
    let message: PubSubMessage = parse_event_body(payload)?;
    Ok(PushEnvelope {
        message,
        subscription: None,
    })
}

/// HTTP status for a failed invocation.
pub fn status_code(err: &AppError) -> u16 {
    if err.is_client_error() { 400 } else { 500 }
}

/// API Gateway style response of the webhook.
pub fn webhook_response(result: Result<WebhookOutcome>) -> Value {
    match result {
        Ok(WebhookOutcome::Rejected) => {
            warn!("Webhook rejected");
            json!({
                "statusCode": 400,
                "body": json!({ "error": "invalid webhook secret" }).to_string(),
            })
        }
        Ok(outcome) => match serde_json::to_string(&outcome) {
            Ok(body) => json!({ "statusCode": 200, "body": body }),
            Err(e) => webhook_response(Err(e.into())),
        },
        Err(e) => {
            error!("Webhook failed: {}", e);
            json!({
                "statusCode": status_code(&e),
                "body": json!({ "error": e.to_string() }).to_string(),
            })
        }
    }
}

/// Status object returned by the scheduled and message-driven handlers.
pub fn status_response(result: Result<Value>) -> Value {
    match result {
        Ok(mut fields) => {
            if let Value::Object(map) = &mut fields {
                map.insert("status".to_string(), json!("success"));
            }
            info!("Handler succeeded");
            fields
        }
        Err(e) => {
            error!("Handler failed: {}", e);
            json!({
                "status": "error",
                "message": e.to_string(),
            })
        }
    }
}
