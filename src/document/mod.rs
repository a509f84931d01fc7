//! Document model and recognition.
//!
//! - `models` - raw payloads, structured documents and per-document outcomes
//! - `recognizer` - turning raw bytes into a structured document

pub mod models;
pub mod recognizer;

pub use models::*;
pub use recognizer::*;
