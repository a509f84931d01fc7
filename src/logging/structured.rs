//! Structured logging utilities.
//!
//! Provides context-aware logging with batch_id and the document name
//! included in every log message.

use std::fmt;

/// Initialize the process-wide logger.
///
/// Safe to call repeatedly; only the first call installs the logger.
pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
}

/// Logging context for a batch of documents.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub batch_id: String,
    pub document: Option<String>,
}

impl LogContext {
    pub fn new(batch_id: &str) -> Self {
        Self {
            batch_id: batch_id.to_string(),
            document: None,
        }
    }

    pub fn with_document(&self, name: &str) -> Self {
        Self {
            batch_id: self.batch_id.clone(),
            document: Some(name.to_string()),
        }
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.document {
            Some(name) => write!(f, "[batch={}] [doc={}]", self.batch_id, name),
            None => write!(f, "[batch={}]", self.batch_id),
        }
    }
}

/// Log an info message with context.
#[macro_export]
macro_rules! log_info {
    ($ctx:expr, $event:expr, $($key:ident = $value:expr),+ $(,)?) => {
        log::info!(
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),+), $($value),+)
        );
    };
}

/// Log a warning message with context.
#[macro_export]
macro_rules! log_warn {
    ($ctx:expr, $event:expr, $($key:ident = $value:expr),+ $(,)?) => {
        log::warn!(
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),+), $($value),+)
        );
    };
}

/// Log a debug message with context.
#[macro_export]
macro_rules! log_debug {
    ($ctx:expr, $event:expr, $($key:ident = $value:expr),+ $(,)?) => {
        log::debug!(
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),+), $($value),+)
        );
    };
}
