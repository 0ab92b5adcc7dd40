use std::f64::consts::PI;

use sf_aero::telemetry::{estimate_force_columns, rotor_columns};
use sf_aero::{CoefficientModel, ForceResolver, TelemetryFrame, TilligModel, WindSample};
use sf_core::{Tolerances, nearly_equal};

fn rpm_for_spin_ratio(spin_ratio: f64, diameter: f64, wind_speed: f64) -> f64 {
    spin_ratio * 60.0 * wind_speed / (PI * diameter)
}

#[test]
fn head_wind_example() {
    let resolver = ForceResolver::new(5.0, 35.0, 1.225);
    let rpm = rpm_for_spin_ratio(3.0, 5.0, 8.0);
    let est = resolver.estimate(WindSample {
        wind_speed: 8.0,
        apparent_wind_angle: 0.0,
        rpm,
    });

    let q = 39.2;
    let area = 5.0 * 35.0;
    let tol = Tolerances { abs: 1e-9, rel: 1e-9 };
    assert!(nearly_equal(est.spin_ratio, 3.0, tol));
    // Wind from ahead: drag is all forward, lift all lateral.
    assert!(nearly_equal(est.forward, TilligModel.drag_coefficient(3.0) * q * area, tol));
    assert!(nearly_equal(est.lateral, TilligModel.lift_coefficient(3.0) * q * area, tol));
}

#[test]
fn frame_columns_match_scalar_estimates() {
    let columns = ["time", "AWS_ACT", "AWA_ACT", "RS1_RPM", "RS2_RPM"];
    let rotors = rotor_columns(columns);
    assert_eq!(rotors.len(), 2);

    let frame = TelemetryFrame::new(
        vec![8.0, 12.0, 0.5, 10.0],
        vec![90.0, -60.0, 45.0, 150.0],
        vec![
            ("RS1_RPM".to_string(), vec![150.0, -180.0, 100.0, 10.0]),
            ("RS2_RPM".to_string(), vec![150.0, -180.0, 100.0, -20.0]),
        ],
    )
    .unwrap();
    assert_eq!(frame.nr_rows(), 4);
    assert_eq!(frame.active_rows(), vec![true, true, true, false]);

    let resolver = ForceResolver::new(5.0, 35.0, 1.225);
    let out = estimate_force_columns(&frame, &resolver);
    let names: Vec<&str> = out.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        ["RS1_FWD_FORCE", "RS1_LAT_FORCE", "RS2_FWD_FORCE", "RS2_LAT_FORCE"]
    );

    let tol = Tolerances::default();
    for (row, sample) in frame.samples(0).into_iter().enumerate() {
        let est = resolver.estimate(sample);
        assert!(nearly_equal(out[0].values_kn[row], est.forward / 1000.0, tol));
        assert!(nearly_equal(out[1].values_kn[row], est.lateral / 1000.0, tol));
    }
    // Calm row gives exact zeros.
    assert_eq!(out[0].values_kn[2], 0.0);
    assert_eq!(out[3].values_kn[2], 0.0);
}

#[test]
fn unknown_rotor_column_rejected() {
    let err =
        TelemetryFrame::new(vec![8.0], vec![0.0], vec![("ROTOR1_RPM".to_string(), vec![100.0])])
            .unwrap_err();
    assert!(err.to_string().contains("ROTOR1_RPM"), "{err}");
}

#[test]
fn lettered_rotor_columns_estimated() {
    let frame =
        TelemetryFrame::new(vec![8.0], vec![0.0], vec![("RSA_RPM".to_string(), vec![100.0])])
            .unwrap();
    let out = estimate_force_columns(&frame, &ForceResolver::new(5.0, 35.0, 1.225));
    let names: Vec<&str> = out.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["RSA_FWD_FORCE", "RSA_LAT_FORCE"]);
}
