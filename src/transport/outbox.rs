//! In-memory outbox sender.
//!
//! Keeps every delivered document in order. Useful as the default sink
//! when the caller drains delivered documents itself, and in tests.

use parking_lot::Mutex;

use super::{SendError, Sender};
use crate::document::Document;

/// Sender that records documents in memory.
#[derive(Debug, Default)]
pub struct OutboxSender {
    delivered: Mutex<Vec<Document>>,
    capacity: Option<usize>,
}

impl OutboxSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// An outbox that refuses documents once `capacity` are queued.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            delivered: Mutex::new(Vec::with_capacity(capacity)),
            capacity: Some(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.delivered.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.delivered.lock().is_empty()
    }

    /// Take every delivered document, leaving the outbox empty.
    pub fn drain(&self) -> Vec<Document> {
        std::mem::take(&mut *self.delivered.lock())
    }
}

impl Sender for OutboxSender {
    fn send(&self, document: Document) -> Result<(), SendError> {
        let mut delivered = self.delivered.lock();
        if let Some(capacity) = self.capacity {
            if delivered.len() >= capacity {
                return Err(SendError::OutboxFull { capacity });
            }
        }
        delivered.push(document);
        Ok(())
    }
}
