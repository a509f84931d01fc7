//! Format version check.

use crate::config::FormatPolicy;
use crate::document::Document;
use crate::error::{PipelineError, StageResult};

/// Pass the document through if its format version is accepted.
pub fn check_format_version(doc: Document, policy: &FormatPolicy) -> StageResult<Document> {
    if policy.accepts(&doc.format) {
        Ok(doc)
    } else {
        Err(PipelineError::FormatVersion { format: doc.format })
    }
}
