//! Security module.
//!
//! Signing credentials and the cryptographer that turns document content
//! into signed content.

pub mod signing;

pub use signing::*;
