//! Pub/sub messages, both for publishing and for push deliveries.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A message on the wire: base64 payload plus string attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PubSubMessage {
    /// Base64 encoded payload
    #[serde(default)]
    pub data: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    /// Assigned by the broker; absent on outgoing messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl PubSubMessage {
    /// Encode `value` as a JSON payload.
    pub fn json<T: Serialize>(value: &T, attributes: BTreeMap<String, String>) -> Result<Self> {
        let bytes = serde_json::to_vec(value)?;
        Ok(Self {
            data: STANDARD.encode(bytes),
            attributes,
            message_id: None,
        })
    }

    /// Raw payload bytes.
    pub fn payload(&self) -> Result<Vec<u8>> {
        Ok(STANDARD.decode(self.data.trim())?)
    }

    /// Decode the payload as JSON.
    pub fn decode_json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.payload()?)?)
    }
}

/// Envelope of a push subscription delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct PushEnvelope {
    pub message: PubSubMessage,
    #[serde(default)]
    pub subscription: Option<String>,
}
