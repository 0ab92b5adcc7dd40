//! Empirical lift and drag coefficients for rotor sails.
//!
//! Polynomials from Tillig et al. (2020), "Design, operation and analysis of wind-assisted cargo
//! ships", Ocean Engineering. Coefficients are normalised by the projected rotor area D x H.
//!
//! The polynomials are valid for spin ratios in `[0, 5]`. This module does not clamp: evaluating
//! outside the range is extrapolation, and limiting the input is the caller's job
//! (see [`crate::forces::ForceResolver`]).

use rayon::prelude::*;

/// Lift and drag coefficients as functions of the spin ratio.
///
/// The batch methods evaluate each element with the scalar method, so every element of a batch is
/// bit-identical to the corresponding scalar call regardless of how the work is split.
pub trait CoefficientModel: Send + Sync {
    fn lift_coefficient(&self, spin_ratio: f64) -> f64;

    fn drag_coefficient(&self, spin_ratio: f64) -> f64;

    fn lift_coefficients(&self, spin_ratios: &[f64]) -> Vec<f64> {
        spin_ratios
            .par_iter()
            .map(|&s| self.lift_coefficient(s))
            .collect()
    }

    fn drag_coefficients(&self, spin_ratios: &[f64]) -> Vec<f64> {
        spin_ratios
            .par_iter()
            .map(|&s| self.drag_coefficient(s))
            .collect()
    }
}

/// The Tillig rotor sail polynomials.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TilligModel;

impl TilligModel {
    /// `a_1..a_5` in `cl = sum a_i * s^i`.
    pub const LIFT_COEFFICIENTS: [f64; 5] = [-0.1039, 3.1309, -0.9817, 0.1145, -0.0046];

    /// `b_0..b_5` in `cd = sum b_i * s^i`.
    pub const DRAG_COEFFICIENTS: [f64; 6] = [0.6375, -1.641, 1.7243, -0.4424, 0.0464, -0.0017];
}

impl CoefficientModel for TilligModel {
    fn lift_coefficient(&self, spin_ratio: f64) -> f64 {
        Self::LIFT_COEFFICIENTS
            .iter()
            .enumerate()
            .fold(0.0, |cl, (i, a)| cl + a * spin_ratio.powi(i as i32 + 1))
    }

    fn drag_coefficient(&self, spin_ratio: f64) -> f64 {
        Self::DRAG_COEFFICIENTS
            .iter()
            .enumerate()
            .fold(0.0, |cd, (i, b)| cd + b * spin_ratio.powi(i as i32))
    }
}
