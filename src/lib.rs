//! DocDispatch Core - railway-oriented document dispatch pipeline
//!
//! This crate validates, signs and dispatches batches of documents. Every
//! document gets its own chain of stages; the first failing stage decides
//! that document's outcome and nothing else in the batch is affected.
//!
//! 1. **Isolation** - one outcome per document, the batch call never fails
//! 2. **Logging** - every stage transition logged with batch/document context
//! 3. **Substitution** - recognition, signing, dispatch and time are traits
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `pipeline` - Batch orchestrator and railway combinators
//! - `validation` - Format version and freshness stages
//! - `document` - Payload/document/outcome model and recognition
//! - `security` - Credentials and Ed25519 signing
//! - `transport` - Dispatch of signed documents
//! - `clock` - Injected time source
//! - `config` - Accepted formats and age window
//! - `error` - Pipeline error taxonomy
//! - `logging` - Structured logging with batch context

pub mod clock;
pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod security;
pub mod transport;
pub mod validation;

#[cfg(feature = "python")]
mod python;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::PipelineConfig;
pub use document::{BatchReport, Document, Outcome, RawPayload};
pub use error::{ErrorKind, PipelineError, StageResult};
pub use logging::init_logger;
pub use pipeline::{FileSender, StandardFileSender};
pub use security::Credential;
