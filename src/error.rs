//! Pipeline error taxonomy.
//!
//! Every failure a document can hit on its way through the pipeline is one
//! of these variants. The rendered message is what ends up in the
//! document's [`Outcome`](crate::document::Outcome).

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

/// Result of a single pipeline stage.
pub type StageResult<T> = Result<T, PipelineError>;

/// A terminal failure for one document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("{0}")]
    Recognition(String),

    #[error("Invalid format version: {format}")]
    FormatVersion { format: String },

    #[error("Too old document, date of creation: {}", .created.to_rfc3339_opts(SecondsFormat::Secs, true))]
    Freshness { created: DateTime<Utc> },

    #[error("{0}")]
    Signing(String),

    #[error("{0}")]
    Send(String),

    /// An error re-labelled with a stage prefix.
    #[error("{context}: {source}")]
    Refined {
        context: String,
        source: Box<PipelineError>,
    },
}

/// Root category of a [`PipelineError`], ignoring any prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Recognition,
    FormatVersion,
    Freshness,
    Signing,
    Send,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Recognition => "recognition",
            ErrorKind::FormatVersion => "format_version",
            ErrorKind::Freshness => "freshness",
            ErrorKind::Signing => "signing",
            ErrorKind::Send => "send",
        }
    }
}

impl PipelineError {
    /// Build a recognition error from a collaborator fault.
    pub fn recognition(fault: anyhow::Error) -> Self {
        PipelineError::Recognition(format!("{:#}", fault))
    }

    /// Build a signing error from a collaborator fault.
    pub fn signing(fault: anyhow::Error) -> Self {
        PipelineError::Signing(format!("{:#}", fault))
    }

    /// Build a send error from a collaborator fault.
    pub fn send(fault: anyhow::Error) -> Self {
        PipelineError::Send(format!("{:#}", fault))
    }

    /// Wrap this error with a stage prefix.
    pub fn refine(self, context: &str) -> Self {
        PipelineError::Refined {
            context: context.to_string(),
            source: Box::new(self),
        }
    }

    /// The underlying category, looking through every `Refined` layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Recognition(_) => ErrorKind::Recognition,
            PipelineError::FormatVersion { .. } => ErrorKind::FormatVersion,
            PipelineError::Freshness { .. } => ErrorKind::Freshness,
            PipelineError::Signing(_) => ErrorKind::Signing,
            PipelineError::Send(_) => ErrorKind::Send,
            PipelineError::Refined { source, .. } => source.kind(),
        }
    }
}
