// src/pipeline/email.rs

//! Email the digest carried by a pub/sub push delivery.

use serde_json::Value;

use crate::error::Result;
use crate::models::{EmailConfig, PushEnvelope, require};
use crate::services::{Mailer, TemplateMail};

/// Build the notification mail for a delivered message.
pub fn build_news_mail(config: &EmailConfig, envelope: &PushEnvelope) -> Result<TemplateMail> {
    let template_data: Value = envelope.message.decode_json()?;

    Ok(TemplateMail {
        to: require(&config.to, "email.to")?.to_string(),
        from: require(&config.from, "email.from")?.to_string(),
        template_id: require(&config.template_id, "email.template_id")?.to_string(),
        template_data,
    })
}

/// Decode the delivery and send the templated mail.
pub async fn send_latest_news_email(
    config: &EmailConfig,
    mailer: &dyn Mailer,
    envelope: &PushEnvelope,
) -> Result<TemplateMail> {
    log::info!(
        "Emailing news message {} from {}",
        envelope.message.message_id.as_deref().unwrap_or("-"),
        envelope.subscription.as_deref().unwrap_or("direct call")
    );

    let mail = build_news_mail(config, envelope)?;
    mailer.send(&mail).await?;
    Ok(mail)
}
