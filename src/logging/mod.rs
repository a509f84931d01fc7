//! Structured logging with batch and document context.
//!
//! Every pipeline log line carries the batch id and, where one applies,
//! the document name so a single document can be followed through the
//! stages with a grep.

pub mod structured;

pub use structured::*;
