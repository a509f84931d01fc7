//! Pipeline configuration.
//!
//! The accepted format versions and the freshness window are policy, not
//! code: both live here with defaults matching the historical literals and
//! can be overridden from the environment.

use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Format versions accepted when no override is configured.
pub const DEFAULT_ACCEPTED_FORMATS: [&str; 2] = ["4.0", "3.1"];

/// Maximum document age in calendar months when no override is configured.
pub const DEFAULT_MAX_AGE_MONTHS: u32 = 1;

pub const ENV_ACCEPTED_FORMATS: &str = "DOCDISPATCH_ACCEPTED_FORMATS";
pub const ENV_MAX_AGE_MONTHS: &str = "DOCDISPATCH_MAX_AGE_MONTHS";
pub const ENV_AGE_BOUNDARY: &str = "DOCDISPATCH_AGE_BOUNDARY";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must list at least one format version")]
    EmptyFormats { var: &'static str },

    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidMonths { var: &'static str, value: String },

    #[error("{var} must be \"inclusive\" or \"exclusive\", got {value:?}")]
    InvalidBoundary { var: &'static str, value: String },
}

/// Which format versions the format-version stage lets through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatPolicy {
    pub accepted: Vec<String>,
}

impl Default for FormatPolicy {
    fn default() -> Self {
        Self {
            accepted: DEFAULT_ACCEPTED_FORMATS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl FormatPolicy {
    pub fn accepts(&self, format: &str) -> bool {
        self.accepted.iter().any(|f| f == format)
    }
}

/// How a creation time exactly on the age threshold is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    /// Created at the threshold counts as fresh.
    #[default]
    Inclusive,
    /// Only documents created strictly after the threshold are fresh.
    Exclusive,
}

impl Boundary {
    pub fn as_str(&self) -> &'static str {
        match self {
            Boundary::Inclusive => "inclusive",
            Boundary::Exclusive => "exclusive",
        }
    }
}

/// Age window for the freshness stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreshnessPolicy {
    pub max_age_months: u32,
    #[serde(default)]
    pub boundary: Boundary,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            max_age_months: DEFAULT_MAX_AGE_MONTHS,
            boundary: Boundary::default(),
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub formats: FormatPolicy,
    #[serde(default)]
    pub freshness: FreshnessPolicy,
}

impl PipelineConfig {
    /// Build a configuration from the process environment.
    ///
    /// Unset variables fall back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_ACCEPTED_FORMATS) {
            let accepted: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if accepted.is_empty() {
                return Err(ConfigError::EmptyFormats {
                    var: ENV_ACCEPTED_FORMATS,
                });
            }
            config.formats = FormatPolicy { accepted };
        }

        if let Some(raw) = lookup(ENV_MAX_AGE_MONTHS) {
            config.freshness.max_age_months =
                raw.trim().parse::<u32>().map_err(|_| ConfigError::InvalidMonths {
                    var: ENV_MAX_AGE_MONTHS,
                    value: raw.clone(),
                })?;
        }

        if let Some(raw) = lookup(ENV_AGE_BOUNDARY) {
            config.freshness.boundary = match raw.trim().to_lowercase().as_str() {
                "inclusive" => Boundary::Inclusive,
                "exclusive" => Boundary::Exclusive,
                _ => {
                    return Err(ConfigError::InvalidBoundary {
                        var: ENV_AGE_BOUNDARY,
                        value: raw,
                    })
                }
            };
        }

        log::debug!(
            "CONFIG_RESOLVED formats={:?} max_age_months={} boundary={}",
            config.formats.accepted,
            config.freshness.max_age_months,
            config.freshness.boundary.as_str()
        );

        Ok(config)
    }
}
