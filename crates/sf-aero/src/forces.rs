//! Ship-frame forces from the empirical coefficient model.
//!
//! Direct-estimate convention: the apparent wind angle is 0 for wind from dead ahead and grows
//! clockwise seen from above. Forward is +x (bow), lateral is +y (starboard).

use std::f64::consts::PI;

use rayon::prelude::*;
use sf_core::units::{Density, Length};
use tracing::{debug, info};

use crate::coefficients::{CoefficientModel, TilligModel};

/// Below this wind speed (m/s) forces are exactly zero.
pub const MIN_WIND_SPEED: f64 = 1.0;

/// Upper end of the polynomial's valid spin-ratio range.
pub const MAX_SPIN_RATIO: f64 = 5.0;

/// One measurement row for a single rotor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindSample {
    /// Wind speed in m/s.
    pub wind_speed: f64,
    /// Apparent wind angle in radians, ship convention.
    pub apparent_wind_angle: f64,
    /// Signed rotational speed in revolutions per minute; the sign encodes spin direction.
    pub rpm: f64,
}

/// Expected, recoverable conditions. Informational only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DomainWarning {
    /// Wind speed below [`MIN_WIND_SPEED`]; forces were set to zero.
    CalmWind { wind_speed: f64 },
    /// Raw spin ratio above [`MAX_SPIN_RATIO`]; the clamped value was used.
    SpinRatioClamped { raw_spin_ratio: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceEstimate {
    /// Force along +x (N). Positive is thrust.
    pub forward: f64,
    /// Force along +y (N). Positive is to starboard.
    pub lateral: f64,
    /// Lift magnitude with sign (N).
    pub lift: f64,
    /// Drag (N).
    pub drag: f64,
    /// Spin ratio after clamping.
    pub spin_ratio: f64,
    pub warning: Option<DomainWarning>,
}

impl ForceEstimate {
    fn calm(wind_speed: f64) -> Self {
        Self {
            forward: 0.0,
            lateral: 0.0,
            lift: 0.0,
            drag: 0.0,
            spin_ratio: 0.0,
            warning: Some(DomainWarning::CalmWind { wind_speed }),
        }
    }
}

/// Resolves rotor rotation and wind into forward/lateral forces.
#[derive(Debug, Clone)]
pub struct ForceResolver<M = TilligModel> {
    /// Rotor diameter (m).
    pub diameter: f64,
    /// Reference length, the rotor height (m).
    pub height: f64,
    /// Air density (kg/m^3).
    pub density: f64,
    model: M,
}

impl ForceResolver<TilligModel> {
    pub fn new(diameter: f64, height: f64, density: f64) -> Self {
        Self::with_model(diameter, height, density, TilligModel)
    }

    pub fn from_dimensions(diameter: Length, height: Length, density: Density) -> Self {
        use uom::si::length::meter;
        use uom::si::mass_density::kilogram_per_cubic_meter;

        Self::new(
            diameter.get::<meter>(),
            height.get::<meter>(),
            density.get::<kilogram_per_cubic_meter>(),
        )
    }
}

impl<M: CoefficientModel> ForceResolver<M> {
    pub fn with_model(diameter: f64, height: f64, density: f64, model: M) -> Self {
        Self {
            diameter,
            height,
            density,
            model,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Spin ratio clamped to `[0, MAX_SPIN_RATIO]`, plus the raw value.
    pub fn spin_ratio(&self, rpm: f64, wind_speed: f64) -> (f64, f64) {
        let raw = PI * rpm.abs() * self.diameter / (60.0 * wind_speed);
        (raw.clamp(0.0, MAX_SPIN_RATIO), raw)
    }

    pub fn estimate(&self, sample: WindSample) -> ForceEstimate {
        let WindSample {
            wind_speed,
            apparent_wind_angle: awa,
            rpm,
        } = sample;

        if !(wind_speed >= MIN_WIND_SPEED) {
            debug!(wind_speed, "wind below threshold, forces set to zero");
            return ForceEstimate::calm(wind_speed);
        }

        let (spin_ratio, raw_spin_ratio) = self.spin_ratio(rpm, wind_speed);
        let warning = if raw_spin_ratio > MAX_SPIN_RATIO {
            debug!(raw_spin_ratio, "spin ratio clamped to valid range");
            Some(DomainWarning::SpinRatioClamped { raw_spin_ratio })
        } else {
            None
        };

        let cl = spin_sign(rpm) * self.model.lift_coefficient(spin_ratio);
        let cd = self.model.drag_coefficient(spin_ratio);

        let q = 0.5 * self.density * wind_speed * wind_speed;
        let lift = cl * q * self.diameter * self.height;
        let drag = cd * q * self.diameter * self.height;

        let (sin_awa, cos_awa) = awa.sin_cos();

        ForceEstimate {
            forward: drag * cos_awa - lift * sin_awa,
            lateral: lift * cos_awa + drag * sin_awa,
            lift,
            drag,
            spin_ratio,
            warning,
        }
    }

    /// Element-wise [`Self::estimate`]; results are in input order and identical to scalar calls.
    pub fn estimate_batch(&self, samples: &[WindSample]) -> Vec<ForceEstimate> {
        let estimates: Vec<ForceEstimate> = samples.par_iter().map(|&s| self.estimate(s)).collect();

        let calm = estimates
            .iter()
            .filter(|e| matches!(e.warning, Some(DomainWarning::CalmWind { .. })))
            .count();
        let clamped = estimates
            .iter()
            .filter(|e| matches!(e.warning, Some(DomainWarning::SpinRatioClamped { .. })))
            .count();
        if calm > 0 || clamped > 0 {
            info!(
                rows = estimates.len(),
                calm,
                clamped,
                "domain limits applied during force estimation"
            );
        }

        estimates
    }
}

fn spin_sign(rpm: f64) -> f64 {
    if rpm > 0.0 {
        1.0
    } else if rpm < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_core::{Tolerances, nearly_equal};
    use std::f64::consts::FRAC_PI_2;

    fn rpm_for_spin_ratio(spin_ratio: f64, diameter: f64, wind_speed: f64) -> f64 {
        spin_ratio * 60.0 * wind_speed / (PI * diameter)
    }

    #[test]
    fn calm_wind_gives_exact_zero() {
        let resolver = ForceResolver::new(5.0, 35.0, 1.225);
        for rpm in [-300.0, 0.0, 150.0] {
            let est = resolver.estimate(WindSample {
                wind_speed: 0.99,
                apparent_wind_angle: 1.0,
                rpm,
            });
            assert_eq!((est.forward, est.lateral), (0.0, 0.0));
            assert!(matches!(est.warning, Some(DomainWarning::CalmWind { .. })));
        }
    }

    #[test]
    fn spin_ratio_is_clamped_to_five() {
        let resolver = ForceResolver::new(5.0, 35.0, 1.225);
        let est = resolver.estimate(WindSample {
            wind_speed: 2.0,
            apparent_wind_angle: 0.0,
            rpm: 1000.0,
        });
        assert_eq!(est.spin_ratio, MAX_SPIN_RATIO);

        let q = 0.5 * 1.225 * 2.0 * 2.0;
        let expected_lift = TilligModel.lift_coefficient(5.0) * q * 5.0 * 35.0;
        let expected_drag = TilligModel.drag_coefficient(5.0) * q * 5.0 * 35.0;
        assert_eq!(est.lift, expected_lift);
        assert_eq!(est.drag, expected_drag);
        assert!(matches!(
            est.warning,
            Some(DomainWarning::SpinRatioClamped { .. })
        ));
    }

    #[test]
    fn head_wind_example() {
        let (d, h, rho, v) = (5.0, 35.0, 1.225, 8.0);
        let resolver = ForceResolver::new(d, h, rho);
        let rpm = rpm_for_spin_ratio(3.0, d, v);
        let est = resolver.estimate(WindSample {
            wind_speed: v,
            apparent_wind_angle: 0.0,
            rpm,
        });

        let tol = Tolerances {
            abs: 1e-9,
            rel: 1e-9,
        };
        let q = 0.5 * rho * v * v;
        assert!(nearly_equal(q, 39.2, tol));
        assert!(nearly_equal(est.spin_ratio, 3.0, tol));

        let lift = TilligModel.lift_coefficient(3.0) * q * d * h;
        let drag = TilligModel.drag_coefficient(3.0) * q * d * h;

        // awa = 0: forward is pure drag, lateral pure lift.
        assert!(nearly_equal(est.forward, drag, tol));
        assert!(nearly_equal(est.lateral, lift, tol));
    }

    #[test]
    fn beam_wind_is_not_transposed() {
        let (d, h, rho, v) = (5.0, 35.0, 1.225, 8.0);
        let resolver = ForceResolver::new(d, h, rho);
        let rpm = rpm_for_spin_ratio(3.0, d, v);
        let est = resolver.estimate(WindSample {
            wind_speed: v,
            apparent_wind_angle: FRAC_PI_2,
            rpm,
        });

        let tol = Tolerances {
            abs: 1e-6,
            rel: 1e-9,
        };
        // awa = 90 deg: forward = -lift, lateral = drag.
        assert!(nearly_equal(est.forward, -est.lift, tol));
        assert!(nearly_equal(est.lateral, est.drag, tol));
    }

    #[test]
    fn negative_rpm_mirrors_lift_only() {
        let resolver = ForceResolver::new(5.0, 35.0, 1.225);
        let sample = WindSample {
            wind_speed: 10.0,
            apparent_wind_angle: 0.7,
            rpm: 120.0,
        };
        let pos = resolver.estimate(sample);
        let neg = resolver.estimate(WindSample {
            rpm: -120.0,
            ..sample
        });
        assert_eq!(pos.lift, -neg.lift);
        assert_eq!(pos.drag, neg.drag);
    }

    #[test]
    fn zero_rpm_has_no_lift() {
        let resolver = ForceResolver::new(5.0, 35.0, 1.225);
        let est = resolver.estimate(WindSample {
            wind_speed: 10.0,
            apparent_wind_angle: 0.3,
            rpm: 0.0,
        });
        assert_eq!(est.lift, 0.0);
        assert!(est.drag > 0.0);
    }

    #[test]
    fn uom_constructor_matches_raw() {
        use sf_core::units::{kg_per_m3, m};
        let a = ForceResolver::from_dimensions(m(5.0), m(35.0), kg_per_m3(1.225));
        assert_eq!(a.diameter, 5.0);
        assert_eq!(a.height, 35.0);
        assert_eq!(a.density, 1.225);
    }
}
