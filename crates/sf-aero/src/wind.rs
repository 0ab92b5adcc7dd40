//! Wind-angle conventions.
//!
//! Two conventions are in use and they are not interchangeable:
//!
//! - **Direct estimate / control law**: the apparent wind angle `awa` is the direction the wind
//!   comes *from*, 0 = dead ahead, increasing clockwise seen from above.
//! - **Engine**: the freestream handed to the lifting-line engine is a global velocity vector that
//!   points where the wind blows *towards*, at `theta = (pi + awa) mod 2*pi` from +x.

use std::f64::consts::{PI, TAU};

use sf_core::{SpatialVector, wrap_to_pi};

/// Engine wind-blows-toward angle in `[0, 2*pi)`.
pub fn engine_wind_direction(apparent_wind_angle: f64) -> f64 {
    (PI + apparent_wind_angle).rem_euclid(TAU)
}

/// Freestream velocity vector for the engine: `(V cos theta, V sin theta, 0)`.
pub fn engine_freestream(wind_speed: f64, apparent_wind_angle: f64) -> SpatialVector {
    let (sin_t, cos_t) = engine_wind_direction(apparent_wind_angle).sin_cos();
    SpatialVector::new(wind_speed * cos_t, wind_speed * sin_t, 0.0)
}

/// The same freestream repeated for every engine query point.
pub fn uniform_freestream(
    wind_speed: f64,
    apparent_wind_angle: f64,
    nr_points: usize,
) -> Vec<SpatialVector> {
    vec![engine_freestream(wind_speed, apparent_wind_angle); nr_points]
}

/// Apparent wind seen from a moving ship, in the direct-estimate convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApparentWind {
    /// m/s
    pub speed: f64,
    /// Radians, 0 = from dead ahead.
    pub angle: f64,
}

/// Combine the true wind with the ship's own speed through the water.
///
/// `true_wind_direction` is where the true wind comes from relative to the bow, same convention
/// as the apparent wind angle. The ship's motion adds a head wind of `ship_speed`.
pub fn apparent_wind(true_wind_speed: f64, true_wind_direction: f64, ship_speed: f64) -> ApparentWind {
    let (sin_d, cos_d) = true_wind_direction.sin_cos();
    let u = ship_speed + true_wind_speed * cos_d;
    let v = -true_wind_speed * sin_d;
    ApparentWind {
        speed: u.hypot(v),
        angle: (-v).atan2(u),
    }
}

/// Apparent wind angle as fed to a control set-point table, wrapped to `[-pi, pi]`.
pub fn control_law_wind_direction(apparent_wind_angle: f64) -> f64 {
    wrap_to_pi(apparent_wind_angle)
}
