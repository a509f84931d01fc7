//! Document dispatch.
//!
//! The [`Sender`] trait is the last pipeline stage. Delivery failures are
//! reported as an explicit [`SendError`], never as a panic.

pub mod outbox;

pub use outbox::*;

use thiserror::Error;

use crate::document::Document;

/// Delivery failure reported by a [`Sender`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("Outbox full: capacity {capacity}")]
    OutboxFull { capacity: usize },

    #[error("{0}")]
    Transport(String),
}

/// Delivers a signed document.
pub trait Sender {
    fn send(&self, document: Document) -> Result<(), SendError>;
}
