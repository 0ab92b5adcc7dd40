//! Scalar helpers shared by the aerodynamic, control and power crates.

use std::f64::consts::{PI, TAU};

use crate::CoreError;

/// Floating point type of every physical quantity in sailflow.
pub type Real = f64;

/// Absolute and relative tolerance for comparing forces, angles and table values.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

/// `true` when `a` and `b` agree within either the absolute or the relative tolerance.
pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    diff <= tol.abs || diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Like [`ensure_finite`], but also rejects zero and negative values.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if ensure_finite(v, what)? > 0.0 {
        Ok(v)
    } else {
        Err(CoreError::InvalidArg { what })
    }
}

/// Wrap an angle in radians to `[-pi, pi]`. Angles already in range come back unchanged.
///
/// Non-finite input gives NaN.
pub fn wrap_to_pi(angle: Real) -> Real {
    if !angle.is_finite() {
        return Real::NAN;
    }
    if (-PI..=PI).contains(&angle) {
        return angle;
    }
    (angle + PI).rem_euclid(TAU) - PI
}
