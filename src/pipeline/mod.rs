//! Pipeline orchestration module.
//!
//! Runs every document of a batch through:
//! - Recognition
//! - Format version validation
//! - Freshness validation
//! - Signing
//! - Dispatch
//!
//! Stages are chained with the [`railway`] combinators, so the first failing
//! stage decides the document's outcome and later stages never run.

pub mod context;
pub mod file_sender;
pub mod railway;

pub use context::*;
pub use file_sender::*;
pub use railway::*;
