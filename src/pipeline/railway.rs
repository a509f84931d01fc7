//! Railway-oriented chaining.
//!
//! A [`StageResult`] is either on the success track or the failure track.
//! `map_then` moves a value along the success track; once a stage fails
//! every later stage is skipped and the error rides through to the end.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use anyhow::anyhow;

use crate::error::{PipelineError, StageResult};

/// Combinators for chaining pipeline stages.
pub trait Railway<T>: Sized {
    /// Run `stage` on the value; an error is returned as is and `stage`
    /// is never called.
    fn map_then<U, F>(self, stage: F) -> StageResult<U>
    where
        F: FnOnce(T) -> StageResult<U>;

    /// Prefix the error with `context`. No-op on success.
    fn refine_error(self, context: &str) -> StageResult<T>;
}

impl<T> Railway<T> for StageResult<T> {
    fn map_then<U, F>(self, stage: F) -> StageResult<U>
    where
        F: FnOnce(T) -> StageResult<U>,
    {
        match self {
            Ok(value) => stage(value),
            Err(err) => Err(err),
        }
    }

    fn refine_error(self, context: &str) -> StageResult<T> {
        self.map_err(|err| err.refine(context))
    }
}

/// Run a collaborator call and put its result on the railway.
///
/// An `Err` from `operation` goes through `on_fault`. A panic is caught and
/// converted the same way, so no fault escapes past this point.
pub fn of<T, F, E>(operation: F, on_fault: E) -> StageResult<T>
where
    F: FnOnce() -> anyhow::Result<T>,
    E: FnOnce(anyhow::Error) -> PipelineError,
{
    match panic::catch_unwind(AssertUnwindSafe(operation)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(fault)) => Err(on_fault(fault)),
        Err(payload) => Err(on_fault(anyhow!("panicked: {}", panic_message(&*payload)))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn start() -> impl Strategy<Value = StageResult<i64>> {
        prop_oneof![
            any::<i32>().prop_map(|x| -> StageResult<i64> { Ok(i64::from(x)) }),
            "[a-z]{1,8}".prop_map(|s| -> StageResult<i64> { Err(PipelineError::Recognition(s)) }),
        ]
    }

    /// A stage that fails on multiples of `modulus` and adds `step` otherwise.
    fn stage(modulus: i64, step: i64, label: &'static str) -> impl Fn(i64) -> StageResult<i64> {
        move |x| {
            if x % modulus == 0 {
                Err(PipelineError::Signing(format!("{} rejected {}", label, x)))
            } else {
                Ok(x + step)
            }
        }
    }

    proptest! {
        /// (a then f) then g == a then (f then g)
        #[test]
        fn map_then_is_associative(
            a in start(),
            m1 in 2i64..7,
            s1 in -5i64..5,
            m2 in 2i64..7,
            s2 in -5i64..5,
        ) {
            let f = stage(m1, s1, "f");
            let g = stage(m2, s2, "g");

            let left = a.clone().map_then(&f).map_then(&g);
            let right = a.map_then(|x| f(x).map_then(&g));
            prop_assert_eq!(left, right);
        }

        /// Refining never changes which track the result is on.
        #[test]
        fn refine_error_preserves_track(a in start(), prefix in "[A-Za-z ]{1,12}") {
            let was_ok = a.is_ok();
            let refined = a.refine_error(&prefix);
            prop_assert_eq!(refined.is_ok(), was_ok);
            if let Err(err) = refined {
                let expected_prefix = format!("{}: ", prefix);
                prop_assert!(err.to_string().starts_with(&expected_prefix));
            }
        }
    }
}
