mod common;

use std::f64::consts::{FRAC_PI_2, PI};

use common::{Call, MockFactory};
use sf_core::{SpatialVector, Tolerances, nearly_equal};
use sf_project::{ConfigurationDocument, SailType, SimpleSailSetup};
use sf_sim::{Scenario, ScenarioRunner, SimError, SimOptions, WindCondition};

fn rotor_document(time_steps_between_updates: usize) -> ConfigurationDocument {
    let rotor = SimpleSailSetup::new(SpatialVector::ZERO, 5.0, 35.0, SailType::RotorSail);
    let mut document = ConfigurationDocument::from_sail_setups(&[rotor]).unwrap();
    document.controller.time_steps_between_updates = time_steps_between_updates;
    document
}

fn beam_wind() -> Scenario {
    Scenario::new(WindCondition::new(10.0, FRAC_PI_2))
}

#[test]
fn steps_are_sequential_and_commands_sampled() {
    let factory = MockFactory {
        thrust_per_state: 1000.0,
        ..MockFactory::default()
    };
    let mut runner = ScenarioRunner::build(&rotor_document(3), &factory).unwrap();
    let opts = SimOptions {
        dt: 0.5,
        n_steps: 7,
        record_every: 2,
    };
    let record = runner.run(&beam_wind(), &opts).unwrap();

    let calls = &runner.engine().calls;
    let step_times: Vec<f64> = calls
        .iter()
        .filter_map(|c| match c {
            Call::Step { time, .. } => Some(*time),
            _ => None,
        })
        .collect();
    assert_eq!(step_times, vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0]);

    // Updates on steps 0, 3 and 6, each pushed before the step it applies to.
    let pushes: Vec<usize> = calls
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, Call::SetInternalState(_)))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(pushes.len(), 3);
    for i in pushes {
        assert!(matches!(calls[i + 1], Call::Step { .. }));
    }

    assert_eq!(record.t, vec![0.5, 1.5, 2.5, 3.0]);
    assert_eq!(record.len(), record.snapshots.len());
}

#[test]
fn rotor_gets_converted_spin_and_engine_freestream() {
    let factory = MockFactory {
        thrust_per_state: 1000.0,
        ..MockFactory::default()
    };
    let mut runner = ScenarioRunner::build(&rotor_document(1), &factory).unwrap();
    let record = runner
        .run(&beam_wind(), &SimOptions { dt: 0.1, n_steps: 3, record_every: 1 })
        .unwrap();

    // Beam wind commands a spin ratio of -3, i.e. 3 * 10 / (pi * 5) rotations per second.
    let rps = 30.0 / (PI * 5.0);
    let tol = Tolerances::default();
    let last = record.snapshots.last().unwrap();
    assert!(nearly_equal(last.controls[0].section_model_internal_state, rps, tol));
    assert!(nearly_equal(last.thrust(), 1000.0 * rps, tol));
    assert!(last.input_power > 0.0);

    // Wind from starboard blows towards -y in the engine frame.
    for call in &runner.engine().calls {
        if let Call::Step { freestream, .. } = call {
            assert_eq!(freestream.len(), 1);
            assert!(nearly_equal(freestream[0].x, 0.0, tol));
            assert!(nearly_equal(freestream[0].y, -10.0, tol));
        }
    }
}

#[test]
fn runs_restart_the_controller() {
    let factory = MockFactory {
        thrust_per_state: 1000.0,
        ..MockFactory::default()
    };
    let mut runner = ScenarioRunner::build(&rotor_document(4), &factory).unwrap();
    let opts = SimOptions { dt: 0.2, n_steps: 9, record_every: 3 };
    let first = runner.run(&beam_wind(), &opts).unwrap();
    let second = runner.run(&beam_wind(), &opts).unwrap();
    assert_eq!(first, second);
}

#[test]
fn engine_failure_passes_through() {
    let factory = MockFactory {
        fail_at: Some(1.0),
        ..MockFactory::default()
    };
    let mut runner = ScenarioRunner::build(&rotor_document(1), &factory).unwrap();
    let err = runner
        .run(&beam_wind(), &SimOptions { dt: 0.5, n_steps: 10, record_every: 1 })
        .unwrap_err();
    assert!(matches!(err, SimError::Engine(_)));
    assert_eq!(err.to_string(), "wake solver diverged");
    // Steps at 0.0 and 0.5 went through before the failure.
    assert_eq!(
        runner
            .engine()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Step { .. }))
            .count(),
        2
    );
}

#[test]
fn query_points_must_match_strips() {
    let factory = MockFactory {
        drop_query_point: true,
        ..MockFactory::default()
    };
    let err = ScenarioRunner::build(&rotor_document(1), &factory)
        .err()
        .expect("build should fail");
    assert!(matches!(
        err,
        SimError::EngineShape {
            what: "freestream query points",
            expected: 1,
            found: 0
        }
    ));
}

#[test]
fn invalid_document_never_reaches_the_engine() {
    let mut document = rotor_document(1);
    document.controller.set_points.clear();
    let err = ScenarioRunner::build(&document, &MockFactory::default())
        .err()
        .expect("build should fail");
    assert!(matches!(err, SimError::Project(_)), "{err}");
}

#[test]
fn invalid_scenario_rejected() {
    let mut runner = ScenarioRunner::build(&rotor_document(1), &MockFactory::default()).unwrap();
    let calm_nan = Scenario::new(WindCondition::new(f64::NAN, 0.0));
    assert!(matches!(
        runner.run(&calm_nan, &SimOptions::default()),
        Err(SimError::InvalidArg { .. })
    ));
    assert!(runner.engine().calls.is_empty());
}
