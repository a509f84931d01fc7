//! Values flowing through the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One document as handed over by the caller, before recognition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload {
    /// Used for log correlation only.
    pub name: String,
    pub content: Vec<u8>,
}

impl RawPayload {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// A recognized document.
///
/// Stages never mutate a document in place; [`Document::with_content`]
/// consumes the old value and hands back its replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub format: String,
    pub created: DateTime<Utc>,
    pub content: Vec<u8>,
}

impl Document {
    pub fn new(format: impl Into<String>, created: DateTime<Utc>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            format: format.into(),
            created,
            content: content.into(),
        }
    }

    /// Same document with its content replaced.
    pub fn with_content(self, content: Vec<u8>) -> Self {
        Self { content, ..self }
    }
}

/// Final verdict for one input payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<'a> {
    Sent {
        payload: &'a RawPayload,
    },
    Failed {
        payload: &'a RawPayload,
        message: String,
    },
}

impl<'a> Outcome<'a> {
    pub fn payload(&self) -> &'a RawPayload {
        match self {
            Outcome::Sent { payload } | Outcome::Failed { payload, .. } => *payload,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Sent { .. })
    }

    /// The failure message, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Sent { .. } => None,
            Outcome::Failed { message, .. } => Some(message.as_str()),
        }
    }
}

/// Outcomes of one batch plus summary counts.
#[derive(Debug)]
pub struct BatchReport<'a> {
    pub batch_id: String,
    pub received_count: usize,
    pub sent_count: usize,
    pub failed_count: usize,
    pub outcomes: Vec<Outcome<'a>>,
}
