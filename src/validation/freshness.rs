//! Document age check.
//!
//! The age window is measured in calendar months, so the threshold for
//! 31 March with a one month window is 28 (or 29) February at the same
//! time of day.

use chrono::{DateTime, Months, Utc};

use crate::config::{Boundary, FreshnessPolicy};
use crate::document::Document;
use crate::error::{PipelineError, StageResult};

/// Oldest creation time still considered fresh at `now`.
///
/// `None` when the window reaches past the earliest representable date,
/// in which case nothing is too old.
pub fn age_threshold(now: DateTime<Utc>, policy: &FreshnessPolicy) -> Option<DateTime<Utc>> {
    now.checked_sub_months(Months::new(policy.max_age_months))
}

/// Pass the document through if it was created within the age window.
pub fn check_timestamp(
    doc: Document,
    now: DateTime<Utc>,
    policy: &FreshnessPolicy,
) -> StageResult<Document> {
    let fresh = match age_threshold(now, policy) {
        None => true,
        Some(threshold) => match policy.boundary {
            Boundary::Inclusive => doc.created >= threshold,
            Boundary::Exclusive => doc.created > threshold,
        },
    };

    if fresh {
        Ok(doc)
    } else {
        Err(PipelineError::Freshness {
            created: doc.created,
        })
    }
}
