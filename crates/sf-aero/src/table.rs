//! Tabulated lift coefficients for rotating cylinders.

use serde::{Deserialize, Serialize};
use sf_core::{is_strictly_increasing, linear_interpolation};

use crate::error::{AeroError, AeroResult};

/// Ordered `(spin_ratio, lift_coefficient)` pairs.
///
/// Invariants: non-empty, equal lengths, spin ratios strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CoefficientTableDef", into = "CoefficientTableDef")]
pub struct CoefficientTable {
    spin_ratio_data: Vec<f64>,
    cl_data: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CoefficientTableDef {
    spin_ratio_data: Vec<f64>,
    cl_data: Vec<f64>,
}

impl CoefficientTable {
    pub fn new(spin_ratio_data: Vec<f64>, cl_data: Vec<f64>) -> AeroResult<Self> {
        if spin_ratio_data.is_empty() {
            return Err(AeroError::InvalidTable {
                what: "table must have at least one entry",
            });
        }
        if spin_ratio_data.len() != cl_data.len() {
            return Err(AeroError::InvalidTable {
                what: "spin_ratio_data and cl_data must have equal length",
            });
        }
        if !is_strictly_increasing(&spin_ratio_data) {
            return Err(AeroError::InvalidTable {
                what: "spin_ratio_data must be strictly increasing",
            });
        }
        if spin_ratio_data.iter().chain(&cl_data).any(|v| !v.is_finite()) {
            return Err(AeroError::InvalidTable {
                what: "table values must be finite",
            });
        }
        Ok(Self {
            spin_ratio_data,
            cl_data,
        })
    }

    /// Lift data tuned against 3D CFD of a 5 m x 35 m rotor.
    pub fn default_rotor_sail() -> Self {
        Self {
            spin_ratio_data: vec![0.0, 0.5, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 8.0],
            cl_data: vec![0.0, 1.22, 2.56, 5.93, 8.87, 9.56, 10.22, 12.0, 13.0],
        }
    }

    pub fn spin_ratio_data(&self) -> &[f64] {
        &self.spin_ratio_data
    }

    pub fn cl_data(&self) -> &[f64] {
        &self.cl_data
    }

    pub fn len(&self) -> usize {
        self.spin_ratio_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spin_ratio_data.is_empty()
    }

    /// Interpolated lift coefficient; the sign of the spin ratio mirrors the lift.
    pub fn lift_coefficient(&self, spin_ratio: f64) -> f64 {
        let magnitude = linear_interpolation(
            spin_ratio.abs(),
            &self.spin_ratio_data,
            &self.cl_data,
        );
        if spin_ratio < 0.0 { -magnitude } else { magnitude }
    }
}

impl TryFrom<CoefficientTableDef> for CoefficientTable {
    type Error = AeroError;

    fn try_from(def: CoefficientTableDef) -> Result<Self, Self::Error> {
        Self::new(def.spin_ratio_data, def.cl_data)
    }
}

impl From<CoefficientTable> for CoefficientTableDef {
    fn from(table: CoefficientTable) -> Self {
        Self {
            spin_ratio_data: table.spin_ratio_data,
            cl_data: table.cl_data,
        }
    }
}
