//! Recognition: raw bytes to structured [`Document`].

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::models::{Document, RawPayload};

/// Parses a raw payload into a document.
pub trait Recognizer {
    fn recognize(&self, payload: &RawPayload) -> anyhow::Result<Document>;
}

/// Recognizes JSON documents of the shape
/// `{"format": "4.0", "created": "<RFC 3339>", "content": "<text>"}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRecognizer;

#[derive(Deserialize)]
struct WireDocument {
    format: String,
    created: DateTime<Utc>,
    content: String,
}

impl Recognizer for JsonRecognizer {
    fn recognize(&self, payload: &RawPayload) -> anyhow::Result<Document> {
        let wire: WireDocument = serde_json::from_slice(&payload.content)
            .with_context(|| format!("Can't recognize {}", payload.name))?;

        Ok(Document {
            format: wire.format,
            created: wire.created,
            content: wire.content.into_bytes(),
        })
    }
}
