//! Rate limiting of commanded values.
//!
//! A device cannot jump between set points. Each commanded value may move at most
//! `max_rate * update_interval` away from the previously commanded value.

use crate::error::{ControlError, ControlResult};
use serde::{Deserialize, Serialize};

/// Bound `target` to `[previous - max_change, previous + max_change]`.
///
/// A negative or NaN `max_change` leaves `target` untouched.
///
/// The difference is taken as-is, without wrapping. For angles a command crossing `+-pi`
/// moves the long way round.
pub fn limit_change(previous: f64, target: f64, max_change: f64) -> f64 {
    if max_change.is_nan() || max_change < 0.0 {
        return target;
    }
    let delta = target - previous;
    if delta > max_change {
        previous + max_change
    } else if delta < -max_change {
        previous - max_change
    } else {
        target
    }
}

/// Maximum rate of change of a commanded value, in units per second.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct RateLimit {
    max_rate: f64,
}

impl RateLimit {
    /// Create a new rate limit.
    ///
    /// # Errors
    ///
    /// Returns error if `max_rate` is negative or not finite. A zero rate holds the
    /// previous command.
    pub fn new(max_rate: f64) -> ControlResult<Self> {
        if !max_rate.is_finite() || max_rate < 0.0 {
            return Err(ControlError::InvalidArg {
                what: "max rate of change must be finite and non-negative",
            });
        }
        Ok(Self { max_rate })
    }

    pub fn max_rate(&self) -> f64 {
        self.max_rate
    }

    /// Apply the limit over one update interval of `dt` seconds.
    pub fn apply(&self, previous: f64, target: f64, dt: f64) -> f64 {
        limit_change(previous, target, self.max_rate * dt)
    }
}

impl TryFrom<f64> for RateLimit {
    type Error = ControlError;

    fn try_from(value: f64) -> ControlResult<Self> {
        Self::new(value)
    }
}

impl From<RateLimit> for f64 {
    fn from(limit: RateLimit) -> Self {
        limit.max_rate
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn change_never_exceeds_budget(
            previous in -10.0f64..10.0,
            target in -10.0f64..10.0,
            budget in 0.0f64..5.0,
        ) {
            let out = limit_change(previous, target, budget);
            prop_assert!((out - previous).abs() <= budget + 1e-12);
            // Moves toward target, never past it.
            prop_assert!((out - target).abs() <= (previous - target).abs() + 1e-12);
        }
    }
}
