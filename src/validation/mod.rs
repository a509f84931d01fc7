//! Document validation stages.
//!
//! Both stages are pure: they take a document by value and either hand it
//! back unchanged or fail with a message.
//! - Format version check against the configured accepted set
//! - Freshness check against an injected "now"

pub mod format_version;
pub mod freshness;

pub use format_version::*;
pub use freshness::*;
