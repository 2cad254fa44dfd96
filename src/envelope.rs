//! Uniform wrapper around every message that crosses the broker.
//!
//! The envelope carries the owner (rider or driver) a message concerns and
//! the domain payload as raw JSON. Routing metadata lives on the broker
//! delivery, never in here.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Errors from encoding or decoding envelopes.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Malformed envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("Malformed payload for owner '{owner_id}': {source}")]
    Payload {
        owner_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Broker message wrapper: `{"ownerId": "...", "data": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Entity the message is addressed to.
    pub owner_id: String,
    /// Serialized domain payload, kept opaque until a handler decodes it.
    pub data: Box<RawValue>,
}

impl Envelope {
    /// Wrap a domain payload for `owner_id`.
    pub fn encode<T: Serialize>(
        owner_id: impl Into<String>,
        payload: &T,
    ) -> Result<Self, CodecError> {
        let data = serde_json::value::to_raw_value(payload).map_err(CodecError::Encode)?;
        Ok(Self {
            owner_id: owner_id.into(),
            data,
        })
    }

    /// Decode the inner payload.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
        serde_json::from_str(self.data.get()).map_err(|source| CodecError::Payload {
            owner_id: self.owner_id.clone(),
            source,
        })
    }

    /// Parse the outer envelope from a delivery body.
    pub fn from_slice(body: &[u8]) -> Result<Self, CodecError> {
        serde_json::from_slice(body).map_err(CodecError::Envelope)
    }

    /// Serialize the envelope for publishing.
    pub fn to_vec(&self) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(self).map_err(CodecError::Encode)
    }
}

impl PartialEq for Envelope {
    fn eq(&self, other: &Self) -> bool {
        self.owner_id == other.owner_id && self.data.get() == other.data.get()
    }
}
