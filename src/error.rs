//! Defines error handling constructs for wireup.
//!
//! Registration never fails, so the only errors surfaced by the container come from
//! [`Context::inject`](crate::Context::inject) and [`Context::inject_dyn`](crate::Context::inject_dyn).
//! Every error is returned before the target is invoked, so a failed injection never has side effects
//! on the target.

use std::{error, fmt};

use itertools::Itertools;

/// Error that can occur when injecting dependencies into a target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InjectError {
    /// The target was absent.
    NilTarget,
    /// The target is neither callable nor bindable.
    NotInjectable {
        /// Type name of the rejected target.
        type_name: &'static str,
    },
    /// More than one registered dependency satisfies an abstract parameter.
    Ambiguous {
        /// Type name of the parameter being resolved.
        required: &'static str,
        /// Type names of every registered dependency providing `required`, sorted.
        candidates: Vec<&'static str>,
    },
}

impl InjectError {
    /// Returns `true` if the error is [`InjectError::Ambiguous`].
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, InjectError::Ambiguous { .. })
    }
}

impl fmt::Display for InjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InjectError::NilTarget => write!(f, "cannot inject into nil value"),
            InjectError::NotInjectable { type_name } => write!(
                f,
                "{type_name} is not a function and does not have a bind operation"
            ),
            InjectError::Ambiguous {
                required,
                candidates,
            } => write!(
                f,
                "more than one dependency implements {required}, bound types with possible match: [{}]",
                candidates.iter().join(", ")
            ),
        }
    }
}

impl error::Error for InjectError {}
