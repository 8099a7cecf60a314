//! Inversion of a mean-to-osculating transform by fixed-point iteration.

use log::{debug, trace};

use super::PropagationError;
use crate::astro::EquinoctialElements;
use crate::math::normalize_angle;

/// Below this, sin²i counts as equatorial.
const EQUATORIAL_SIN2_I: f64 = 1e-10;
/// Critical inclination is where sin²i = 4/5.
const CRITICAL_SIN2_I: f64 = 0.8;
const CRITICAL_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanSolverSettings {
    /// Convergence threshold on the scaled residual
    pub epsilon: f64,
    pub max_iterations: usize,
}

impl Default for MeanSolverSettings {
    fn default() -> Self {
        MeanSolverSettings {
            epsilon: 1e-13,
            max_iterations: 100,
        }
    }
}

/// Where a zonal theory is valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZonalDomain {
    pub brillouin_radius: f64,
    pub max_eccentricity: f64,
}

impl ZonalDomain {
    pub fn check(&self, elements: &EquinoctialElements) -> Result<(), PropagationError> {
        let e = elements.eccentricity();
        if e > self.max_eccentricity {
            return Err(PropagationError::TooLargeEccentricity {
                eccentricity: e,
                limit: self.max_eccentricity,
            });
        }

        let perigee_radius = elements.a * (1.0 - e);
        if perigee_radius < self.brillouin_radius {
            return Err(PropagationError::InsideBrillouinSphere {
                perigee_radius,
                brillouin_radius: self.brillouin_radius,
            });
        }

        let inclination = elements.inclination();
        let sin2_i = inclination.sin().powi(2);
        if sin2_i < EQUATORIAL_SIN2_I {
            return Err(PropagationError::AlmostEquatorial { inclination });
        }
        if (sin2_i - CRITICAL_SIN2_I).abs() < CRITICAL_TOLERANCE {
            return Err(PropagationError::AlmostCriticallyInclined { inclination });
        }

        Ok(())
    }
}

/// `target - actual`, with the mean longitude difference wrapped to (-π, π].
fn residual(target: &EquinoctialElements, actual: &EquinoctialElements) -> EquinoctialElements {
    EquinoctialElements {
        a: target.a - actual.a,
        ex: target.ex - actual.ex,
        ey: target.ey - actual.ey,
        hx: target.hx - actual.hx,
        hy: target.hy - actual.hy,
        lambda_m: normalize_angle(target.lambda_m - actual.lambda_m, 0.0),
    }
}

fn scaled_norm(delta: &EquinoctialElements, a: f64) -> f64 {
    let terms = [
        delta.a.abs() / (1.0 + a.abs()),
        delta.ex.abs(),
        delta.ey.abs(),
        delta.hx.abs(),
        delta.hy.abs(),
        delta.lambda_m.abs() / std::f64::consts::PI,
    ];
    terms.iter().cloned().fold(0.0, f64::max)
}

/// Finds the mean elements whose image under `forward` is `osculating`.
///
/// Starts from the osculating elements themselves and repeatedly adds the
/// osculating residual to the mean guess. The domain is checked on the input
/// and on every intermediate mean orbit.
pub fn solve_mean_elements(
    osculating: &EquinoctialElements,
    domain: &ZonalDomain,
    settings: &MeanSolverSettings,
    forward: impl Fn(&EquinoctialElements) -> EquinoctialElements,
) -> Result<EquinoctialElements, PropagationError> {
    domain.check(osculating)?;

    let mut mean = *osculating;
    let mut norm = f64::INFINITY;
    for iteration in 1..=settings.max_iterations {
        let delta = residual(osculating, &forward(&mean));
        mean = EquinoctialElements {
            a: mean.a + delta.a,
            ex: mean.ex + delta.ex,
            ey: mean.ey + delta.ey,
            hx: mean.hx + delta.hx,
            hy: mean.hy + delta.hy,
            lambda_m: mean.lambda_m + delta.lambda_m,
        };
        domain.check(&mean)?;

        norm = scaled_norm(&delta, mean.a);
        trace!("mean elements iteration {}: residual {:e}", iteration, norm);
        if norm < settings.epsilon {
            debug!(
                "mean elements converged after {} iterations (residual {:e})",
                iteration, norm
            );
            return Ok(mean);
        }
    }

    Err(PropagationError::MeanElementsNotConverged {
        iterations: settings.max_iterations,
        residual: norm,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::astro::KeplerianElements;

    fn domain() -> ZonalDomain {
        ZonalDomain {
            brillouin_radius: 6378137.0,
            max_eccentricity: 0.9,
        }
    }

    fn elements(e: f64, i: f64) -> EquinoctialElements {
        KeplerianElements {
            a: 7.2e6,
            e,
            i,
            raan: 0.3,
            arg_perigee: 1.0,
            mean_anomaly: 2.0,
        }
        .to_equinoctial()
    }

    #[test]
    fn test_solves_contracting_map() {
        // A mild non-linear perturbation
        let forward = |m: &EquinoctialElements| EquinoctialElements {
            a: m.a + 1000.0 * (m.lambda_m).sin(),
            ex: m.ex + 1e-4 * m.lambda_m.cos(),
            ey: m.ey,
            hx: m.hx,
            hy: m.hy + 1e-4 * m.hx,
            lambda_m: m.lambda_m + 1e-3 * (2.0 * m.lambda_m).sin(),
        };
        let osculating = elements(0.01, 1.0);
        let mean =
            solve_mean_elements(&osculating, &domain(), &MeanSolverSettings::default(), forward)
                .unwrap();

        let image = forward(&mean);
        assert_relative_eq!(image.a, osculating.a, max_relative = 1e-12);
        assert_relative_eq!(image.ex, osculating.ex, epsilon = 1e-13);
        assert_relative_eq!(image.hy, osculating.hy, epsilon = 1e-13);
        assert_relative_eq!(image.lambda_m, osculating.lambda_m, epsilon = 1e-12);
    }

    #[test]
    fn test_not_converged() {
        // Doubling the longitude makes the iteration cycle forever
        let osculating = elements(0.01, 1.0);
        let forward = |m: &EquinoctialElements| EquinoctialElements {
            lambda_m: 2.0 * m.lambda_m,
            ..*m
        };
        let settings = MeanSolverSettings {
            epsilon: 1e-13,
            max_iterations: 7,
        };
        let err = solve_mean_elements(&osculating, &domain(), &settings, forward).unwrap_err();
        match err {
            PropagationError::MeanElementsNotConverged {
                iterations,
                residual,
            } => {
                assert_eq!(iterations, 7);
                assert!(residual > 0.1);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_domain_checks() {
        let d = domain();
        assert!(d.check(&elements(0.01, 1.0)).is_ok());
        assert!(matches!(
            d.check(&elements(0.95, 1.0)),
            Err(PropagationError::TooLargeEccentricity { .. })
        ));
        assert!(matches!(
            d.check(&elements(0.2, 1.0)),
            Err(PropagationError::InsideBrillouinSphere { .. })
        ));
        assert!(matches!(
            d.check(&elements(0.01, 1e-6)),
            Err(PropagationError::AlmostEquatorial { .. })
        ));
        let critical = (1.0 / 5.0f64.sqrt()).acos();
        assert!(matches!(
            d.check(&elements(0.01, critical + 1e-4)),
            Err(PropagationError::AlmostCriticallyInclined { .. })
        ));
    }

    #[test]
    fn test_candidate_mean_is_checked() {
        // Osculating orbit is fine, but the mean orbit it implies dips below
        // the Brillouin sphere
        let forward = |m: &EquinoctialElements| EquinoctialElements {
            a: m.a + 1.0e6,
            ..*m
        };
        let osculating = elements(0.1, 1.0);
        let err = solve_mean_elements(
            &osculating,
            &domain(),
            &MeanSolverSettings::default(),
            forward,
        )
        .unwrap_err();
        assert!(matches!(err, PropagationError::InsideBrillouinSphere { .. }));
    }
}
