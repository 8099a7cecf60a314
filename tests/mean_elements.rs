mod common;

use approx::assert_abs_diff_eq;
use rust_orbprop::astro::{KeplerianElements, Orbit, SpacecraftState};
use rust_orbprop::gravity::ZonalField;
use rust_orbprop::propagation::brouwer_lyddane::{self, compute_mean_orbit};
use rust_orbprop::propagation::{
    BrouwerLyddanePropagator, EcksteinHechlerPropagator, ErrorKind, MeanSolverSettings,
    PropagationError, PropagationType, Propagator,
};

use common::MU;

fn state(elements: KeplerianElements) -> SpacecraftState {
    SpacecraftState::new(Orbit::from_keplerian(elements, 0.0, MU).unwrap())
}

fn elements(a: f64, e: f64, i_deg: f64) -> KeplerianElements {
    KeplerianElements {
        a,
        e,
        i: i_deg.to_radians(),
        raan: 1.3,
        arg_perigee: 2.1,
        mean_anomaly: 0.7,
    }
}

fn angle_difference(x: f64, y: f64) -> f64 {
    (x - y).sin().abs()
}

#[test]
fn test_mean_round_trip() {
    let field = ZonalField::earth();
    let mean = elements(7.2e6, 0.02, 51.6);

    let propagator =
        BrouwerLyddanePropagator::new(state(mean), &field, PropagationType::Mean).unwrap();
    let osculating = propagator.initial_state().orbit();
    assert!((osculating.semimajor_axis() - mean.a).abs() > 100.0);

    let recovered = compute_mean_orbit(osculating, &field, &MeanSolverSettings::default())
        .unwrap()
        .to_keplerian();
    assert_abs_diff_eq!(recovered.a, mean.a, epsilon = 1e-3);
    assert_abs_diff_eq!(recovered.e, mean.e, epsilon = 1e-9);
    assert_abs_diff_eq!(recovered.i, mean.i, epsilon = 1e-9);
    assert!(angle_difference(recovered.raan, mean.raan) < 1e-9);
    let lambda = |k: &KeplerianElements| k.raan + k.arg_perigee + k.mean_anomaly;
    assert!(angle_difference(lambda(&recovered), lambda(&mean)) < 1e-9);
}

#[test]
fn test_mean_and_osculating_initialization_agree() {
    let field = ZonalField::earth();
    let from_mean = BrouwerLyddanePropagator::new(
        state(elements(7.2e6, 0.02, 51.6)),
        &field,
        PropagationType::Mean,
    )
    .unwrap();
    let from_osculating = BrouwerLyddanePropagator::new(
        from_mean.initial_state().clone(),
        &field,
        PropagationType::Osculating,
    )
    .unwrap();

    for &t in &[0.0, 3000.0, 20000.0] {
        let a = from_mean.propagate(t).unwrap().position();
        let b = from_osculating.propagate(t).unwrap().position();
        assert!((a - b).norm() < 1e-2, "at {}: {}", t, (a - b).norm());
    }
}

#[test]
fn test_too_eccentric() {
    let field = ZonalField::earth();
    let err = BrouwerLyddanePropagator::new(
        state(elements(2.0e8, 0.96, 30.0)),
        &field,
        PropagationType::Osculating,
    )
    .err()
    .unwrap();
    assert!(matches!(
        err,
        PropagationError::TooLargeEccentricity { limit, .. }
            if limit == brouwer_lyddane::MAX_ECCENTRICITY
    ));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    // Fine for Brouwer-Lyddane, too much for Eckstein-Hechler
    let moderate = state(elements(1.0e7, 0.2, 30.0));
    assert!(
        BrouwerLyddanePropagator::new(moderate.clone(), &field, PropagationType::Osculating)
            .is_ok()
    );
    let err = EcksteinHechlerPropagator::new(moderate, &field, PropagationType::Osculating)
        .err()
        .unwrap();
    assert!(matches!(err, PropagationError::TooLargeEccentricity { .. }));
}

#[test]
fn test_critical_inclination() {
    let field = ZonalField::earth();
    let critical = (1.0f64 / 5.0).sqrt().acos().to_degrees();
    let err = BrouwerLyddanePropagator::new(
        state(elements(2.66e7, 0.1, critical)),
        &field,
        PropagationType::Mean,
    )
    .err()
    .unwrap();
    assert!(matches!(
        err,
        PropagationError::AlmostCriticallyInclined { .. }
    ));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_perigee_inside_brillouin_sphere() {
    let field = ZonalField::earth();
    let err = BrouwerLyddanePropagator::new(
        state(elements(6.6e6, 0.05, 40.0)),
        &field,
        PropagationType::Mean,
    )
    .err()
    .unwrap();
    assert!(matches!(err, PropagationError::InsideBrillouinSphere { .. }));
}

#[test]
fn test_not_converged() {
    let field = ZonalField::earth();
    let settings = MeanSolverSettings {
        epsilon: 1e-13,
        max_iterations: 1,
    };
    let err = BrouwerLyddanePropagator::with_settings(
        state(elements(7.2e6, 0.02, 51.6)),
        &field,
        PropagationType::Osculating,
        0.0,
        settings,
    )
    .err()
    .unwrap();
    assert!(matches!(
        err,
        PropagationError::MeanElementsNotConverged { iterations: 1, .. }
    ));
    assert_eq!(err.kind(), ErrorKind::NonConvergence);
}
