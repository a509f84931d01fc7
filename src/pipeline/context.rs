//! Pipeline context management.
//!
//! Provides batch and document context for logging.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::logging::structured::LogContext;

/// Context for one `send_files` call.
#[derive(Debug, Clone)]
pub struct BatchContext {
    pub batch_id: String,
    pub started_at: DateTime<Utc>,
}

impl BatchContext {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        let batch_id = format!("batch-{}", &Uuid::new_v4().simple().to_string()[..8]);

        Self {
            batch_id,
            started_at,
        }
    }

    pub fn log_context(&self) -> LogContext {
        LogContext::new(&self.batch_id)
    }

    /// Logging context for one document of this batch.
    pub fn document_context(&self, name: &str) -> LogContext {
        self.log_context().with_document(name)
    }
}
