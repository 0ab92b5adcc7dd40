// sf-core/src/units.rs

use uom::si::f64::{
    Angle as UomAngle, AngularVelocity as UomAngularVelocity, Area as UomArea,
    Force as UomForce, Length as UomLength, MassDensity as UomMassDensity, Power as UomPower,
    Time as UomTime, Velocity as UomVelocity,
};

// Public canonical unit types (SI, f64)
pub type Angle = UomAngle;
pub type AngularVelocity = UomAngularVelocity;
pub type Area = UomArea;
pub type Density = UomMassDensity;
pub type Force = UomForce;
pub type Length = UomLength;
pub type Power = UomPower;
pub type Time = UomTime;
pub type Velocity = UomVelocity;

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn kg_per_m3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn deg(v: f64) -> Angle {
    use uom::si::angle::degree;
    Angle::new::<degree>(v)
}

#[inline]
pub fn rpm(v: f64) -> AngularVelocity {
    use uom::si::angular_velocity::revolution_per_minute;
    AngularVelocity::new::<revolution_per_minute>(v)
}

#[inline]
pub fn rps(v: f64) -> AngularVelocity {
    use uom::si::angular_velocity::revolution_per_second;
    AngularVelocity::new::<revolution_per_second>(v)
}

#[inline]
pub fn m2(v: f64) -> Area {
    use uom::si::area::square_meter;
    Area::new::<square_meter>(v)
}

#[inline]
pub fn kw(v: f64) -> Power {
    use uom::si::power::kilowatt;
    Power::new::<kilowatt>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn newton(v: f64) -> Force {
    use uom::si::force::newton;
    Force::new::<newton>(v)
}

/// Force expressed in kilonewtons, the unit of the telemetry force columns.
#[inline]
pub fn to_kilonewtons(f: Force) -> f64 {
    use uom::si::force::kilonewton;
    f.get::<kilonewton>()
}

/// Rotational speed expressed in revolutions per minute.
#[inline]
pub fn to_rpm(w: AngularVelocity) -> f64 {
    use uom::si::angular_velocity::revolution_per_minute;
    w.get::<revolution_per_minute>()
}

#[inline]
pub fn to_rps(w: AngularVelocity) -> f64 {
    use uom::si::angular_velocity::revolution_per_second;
    w.get::<revolution_per_second>()
}

#[inline]
pub fn to_watts(p: Power) -> f64 {
    use uom::si::power::watt;
    p.get::<watt>()
}

pub mod constants {
    use super::*;

    /// Sea-level standard air density, kg/m^3.
    pub const AIR_DENSITY_KG_M3: f64 = 1.225;

    #[inline]
    pub fn air_density() -> Density {
        kg_per_m3(AIR_DENSITY_KG_M3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _l = m(5.0);
        let _v = mps(8.0);
        let _rho = constants::air_density();
        let _a = deg(30.0);
        let _p = kw(175.0);
        let _dt = s(0.1);
    }

    #[test]
    fn force_in_kilonewtons() {
        assert!((to_kilonewtons(newton(1500.0)) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn rotor_rating_units() {
        assert!((to_rps(rpm(180.0)) - 3.0).abs() < 1e-12);
        assert!((to_rps(rps(4.25)) - 4.25).abs() < 1e-12);
        assert!((to_watts(kw(175.0)) - 175_000.0).abs() < 1e-9);
        let _a = m2(175.0);
    }

    #[test]
    fn rpm_round_trip() {
        assert!((to_rpm(rpm(180.0)) - 180.0).abs() < 1e-9);
    }
}
