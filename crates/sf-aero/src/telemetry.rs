//! Logged rotor telemetry conventions.
//!
//! Input columns: `AWS_ACT` (apparent wind speed, m/s), `AWA_ACT` (apparent wind angle, degrees)
//! and one `RS<label>_RPM` column per rotor. Outputs are `RS<label>_FWD_FORCE` and `RS<label>_LAT_FORCE` in
//! kilonewtons. Reading and writing the files is left to the caller.

use sf_core::CoreError;
use sf_core::units::{newton, to_kilonewtons};

use crate::coefficients::CoefficientModel;
use crate::error::{AeroError, AeroResult};
use crate::forces::{ForceResolver, WindSample};

pub const APPARENT_WIND_SPEED_COLUMN: &str = "AWS_ACT";
pub const APPARENT_WIND_ANGLE_COLUMN: &str = "AWA_ACT";

/// Rows whose largest |RPM| across all rotors is at or below this are idle.
pub const IDLE_RPM_THRESHOLD: f64 = 30.0;

/// A rotor RPM column, `RS<label>_RPM`.
///
/// The label is any non-empty text between the prefix and the suffix (`1`, `A`, `PORT`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotorColumn {
    pub label: String,
    pub name: String,
}

impl RotorColumn {
    pub fn parse(name: &str) -> Option<Self> {
        let label = name.strip_prefix("RS")?.strip_suffix("_RPM")?;
        if label.is_empty() {
            return None;
        }
        Some(Self {
            label: label.to_string(),
            name: name.to_string(),
        })
    }

    pub fn forward_force_column(&self) -> String {
        format!("RS{}_FWD_FORCE", self.label)
    }

    pub fn lateral_force_column(&self) -> String {
        format!("RS{}_LAT_FORCE", self.label)
    }
}

/// Rotor columns among `columns`, in their original order.
pub fn rotor_columns<'a>(columns: impl IntoIterator<Item = &'a str>) -> Vec<RotorColumn> {
    columns.into_iter().filter_map(RotorColumn::parse).collect()
}

/// `true` for rows where at least one rotor turns faster than [`IDLE_RPM_THRESHOLD`].
pub fn active_rows(rpm_columns: &[&[f64]]) -> Vec<bool> {
    let nr_rows = rpm_columns.iter().map(|c| c.len()).max().unwrap_or(0);
    (0..nr_rows)
        .map(|row| {
            rpm_columns
                .iter()
                .filter_map(|c| c.get(row))
                .fold(0.0_f64, |acc, rpm| acc.max(rpm.abs()))
                > IDLE_RPM_THRESHOLD
        })
        .collect()
}

/// In-memory columns of one telemetry log.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryFrame {
    apparent_wind_speed: Vec<f64>,
    apparent_wind_angle_deg: Vec<f64>,
    rotors: Vec<(RotorColumn, Vec<f64>)>,
}

impl TelemetryFrame {
    pub fn new(
        apparent_wind_speed: Vec<f64>,
        apparent_wind_angle_deg: Vec<f64>,
        rotor_rpm: Vec<(String, Vec<f64>)>,
    ) -> AeroResult<Self> {
        let nr_rows = apparent_wind_speed.len();
        if apparent_wind_angle_deg.len() != nr_rows {
            return Err(CoreError::LengthMismatch {
                what: APPARENT_WIND_ANGLE_COLUMN,
                expected: nr_rows,
                found: apparent_wind_angle_deg.len(),
            }
            .into());
        }

        let mut rotors = Vec::with_capacity(rotor_rpm.len());
        for (name, rpm) in rotor_rpm {
            let column = RotorColumn::parse(&name).ok_or(AeroError::InvalidColumn { name })?;
            if rpm.len() != nr_rows {
                return Err(CoreError::LengthMismatch {
                    what: "rotor rpm column",
                    expected: nr_rows,
                    found: rpm.len(),
                }
                .into());
            }
            rotors.push((column, rpm));
        }

        Ok(Self {
            apparent_wind_speed,
            apparent_wind_angle_deg,
            rotors,
        })
    }

    pub fn nr_rows(&self) -> usize {
        self.apparent_wind_speed.len()
    }

    pub fn rotors(&self) -> impl Iterator<Item = &RotorColumn> {
        self.rotors.iter().map(|(c, _)| c)
    }

    /// Mask of non-idle rows.
    pub fn active_rows(&self) -> Vec<bool> {
        let columns: Vec<&[f64]> = self.rotors.iter().map(|(_, rpm)| rpm.as_slice()).collect();
        active_rows(&columns)
    }

    /// Samples for one rotor, angles converted to radians.
    pub fn samples(&self, rotor: usize) -> Vec<WindSample> {
        let Some((_, rpm)) = self.rotors.get(rotor) else {
            return Vec::new();
        };
        self.apparent_wind_speed
            .iter()
            .zip(&self.apparent_wind_angle_deg)
            .zip(rpm)
            .map(|((&v, &awa_deg), &rpm)| WindSample {
                wind_speed: v,
                apparent_wind_angle: awa_deg.to_radians(),
                rpm,
            })
            .collect()
    }
}

/// One output column in kilonewtons.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceColumn {
    pub name: String,
    pub values_kn: Vec<f64>,
}

/// Forward and lateral force columns for every rotor in the frame, rotor by rotor.
pub fn estimate_force_columns<M: CoefficientModel>(
    frame: &TelemetryFrame,
    resolver: &ForceResolver<M>,
) -> Vec<ForceColumn> {
    let mut out = Vec::with_capacity(2 * frame.rotors.len());

    for (i, (column, _)) in frame.rotors.iter().enumerate() {
        let estimates = resolver.estimate_batch(&frame.samples(i));

        out.push(ForceColumn {
            name: column.forward_force_column(),
            values_kn: estimates
                .iter()
                .map(|e| to_kilonewtons(newton(e.forward)))
                .collect(),
        });
        out.push(ForceColumn {
            name: column.lateral_force_column(),
            values_kn: estimates
                .iter()
                .map(|e| to_kilonewtons(newton(e.lateral)))
                .collect(),
        });
    }

    out
}
