use nalgebra::Vector3;

use super::{
    CartesianState, CircularElements, EquinoctialElements, HasMass, KeplerianElements, OrbitError,
};
use crate::math::anomaly::mean_to_true;

/// How close to `-z` the orbit normal may point before the equinoctial
/// inclination vector is no longer representable.
const RETROGRADE_TOLERANCE: f64 = 1e-12;

/// One of the supported parameterizations of an orbit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrbitElements {
    Cartesian(CartesianState),
    Keplerian(KeplerianElements),
    Circular(CircularElements),
    Equinoctial(EquinoctialElements),
}

/// An elliptic orbit at a given date.
///
/// The orbit keeps whichever parameterization it was built from; the
/// `to_*` methods convert on demand. Orbits are immutable values: anything
/// that "changes" an orbit returns a new one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    elements: OrbitElements,
    /// Seconds from the reference epoch
    epoch: f64,
    mu: f64,
}

impl Orbit {
    pub fn new(elements: OrbitElements, epoch: f64, mu: f64) -> Result<Self, OrbitError> {
        let orbit = Orbit {
            elements,
            epoch,
            mu,
        };
        orbit.validate()?;
        Ok(orbit)
    }

    pub fn from_keplerian(
        elements: KeplerianElements,
        epoch: f64,
        mu: f64,
    ) -> Result<Self, OrbitError> {
        Self::new(OrbitElements::Keplerian(elements), epoch, mu)
    }

    pub fn from_circular(
        elements: CircularElements,
        epoch: f64,
        mu: f64,
    ) -> Result<Self, OrbitError> {
        Self::new(OrbitElements::Circular(elements), epoch, mu)
    }

    pub fn from_equinoctial(
        elements: EquinoctialElements,
        epoch: f64,
        mu: f64,
    ) -> Result<Self, OrbitError> {
        Self::new(OrbitElements::Equinoctial(elements), epoch, mu)
    }

    pub fn from_cartesian(
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        epoch: f64,
        mu: f64,
    ) -> Result<Self, OrbitError> {
        Self::new(
            OrbitElements::Cartesian(CartesianState::new(position, velocity)),
            epoch,
            mu,
        )
    }

    fn validate(&self) -> Result<(), OrbitError> {
        if !(self.mu > 0.0) || !self.mu.is_finite() {
            return Err(OrbitError::NonPositiveMu(self.mu));
        }
        if !self.epoch.is_finite() {
            return Err(OrbitError::NonFinite);
        }

        match &self.elements {
            OrbitElements::Cartesian(state) => {
                if !state.is_finite() || state.angular_momentum().norm() == 0.0 {
                    return Err(OrbitError::NonFinite);
                }
                if 1.0 + state.angular_momentum().normalize().z < RETROGRADE_TOLERANCE {
                    return Err(OrbitError::RetrogradeEquatorial);
                }
                // Unbound trajectories have no semi-major axis we can use
                if state.energy(self.mu) >= 0.0 {
                    let e = self.to_equinoctial().eccentricity();
                    return Err(OrbitError::NotElliptic(e));
                }
            }
            OrbitElements::Keplerian(kep) => {
                let values = [kep.a, kep.e, kep.i, kep.raan, kep.arg_perigee, kep.mean_anomaly];
                if values.iter().any(|x| !x.is_finite()) {
                    return Err(OrbitError::NonFinite);
                }
                if !(0.0..1.0).contains(&kep.e) {
                    return Err(OrbitError::NotElliptic(kep.e));
                }
            }
            OrbitElements::Circular(circ) => {
                let values = [circ.a, circ.ex, circ.ey, circ.i, circ.raan, circ.alpha_m];
                if values.iter().any(|x| !x.is_finite()) {
                    return Err(OrbitError::NonFinite);
                }
            }
            OrbitElements::Equinoctial(eq) => {
                let values = [eq.a, eq.ex, eq.ey, eq.hx, eq.hy, eq.lambda_m];
                if values.iter().any(|x| !x.is_finite()) {
                    return Err(OrbitError::NonFinite);
                }
            }
        }

        let equinoctial = self.to_equinoctial();
        let values = [
            equinoctial.ex,
            equinoctial.ey,
            equinoctial.hx,
            equinoctial.hy,
            equinoctial.lambda_m,
        ];
        if values.iter().any(|x| !x.is_finite()) {
            return Err(OrbitError::NonFinite);
        }
        if !(equinoctial.a > 0.0) {
            return Err(OrbitError::NonPositiveSemiMajorAxis(equinoctial.a));
        }
        let e = equinoctial.eccentricity();
        if e >= 1.0 {
            return Err(OrbitError::NotElliptic(e));
        }
        Ok(())
    }

    pub fn elements(&self) -> &OrbitElements {
        &self.elements
    }

    pub fn epoch(&self) -> f64 {
        self.epoch
    }

    pub fn to_equinoctial(&self) -> EquinoctialElements {
        match &self.elements {
            OrbitElements::Cartesian(state) => {
                EquinoctialElements::from_cartesian(&state.position(), &state.velocity(), self.mu)
            }
            OrbitElements::Keplerian(kep) => kep.to_equinoctial(),
            OrbitElements::Circular(circ) => circ.to_equinoctial(),
            OrbitElements::Equinoctial(eq) => *eq,
        }
    }

    pub fn to_keplerian(&self) -> KeplerianElements {
        match &self.elements {
            OrbitElements::Keplerian(kep) => *kep,
            OrbitElements::Circular(circ) => circ.to_keplerian(),
            _ => self.to_equinoctial().to_keplerian(),
        }
    }

    pub fn to_circular(&self) -> CircularElements {
        match &self.elements {
            OrbitElements::Keplerian(kep) => kep.to_circular(),
            OrbitElements::Circular(circ) => *circ,
            _ => self.to_equinoctial().to_circular(),
        }
    }

    pub fn to_cartesian(&self) -> CartesianState {
        match &self.elements {
            OrbitElements::Cartesian(state) => *state,
            _ => {
                let (position, velocity) = self.to_equinoctial().to_cartesian(self.mu);
                CartesianState::new(position, velocity)
            }
        }
    }

    pub fn position(&self) -> Vector3<f64> {
        self.to_cartesian().position()
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.to_cartesian().velocity()
    }

    pub fn semimajor_axis(&self) -> f64 {
        self.to_equinoctial().a
    }

    pub fn eccentricity(&self) -> f64 {
        self.to_equinoctial().eccentricity()
    }

    pub fn inclination(&self) -> f64 {
        self.to_equinoctial().inclination()
    }

    pub fn mean_motion(&self) -> f64 {
        self.to_equinoctial().mean_motion(self.mu)
    }

    pub fn period(&self) -> f64 {
        2.0 * std::f64::consts::PI / self.mean_motion()
    }

    pub fn perigee_radius(&self) -> f64 {
        let eq = self.to_equinoctial();
        eq.a * (1.0 - eq.eccentricity())
    }

    pub fn true_anomaly(&self) -> f64 {
        let kep = self.to_keplerian();
        mean_to_true(kep.mean_anomaly, kep.e)
    }

    /// The same orbit with its elements expressed in another parameterization.
    /// `kind` is only used for its variant.
    pub fn converted_like(&self, kind: &OrbitElements) -> Orbit {
        let elements = match kind {
            OrbitElements::Cartesian(_) => OrbitElements::Cartesian(self.to_cartesian()),
            OrbitElements::Keplerian(_) => OrbitElements::Keplerian(self.to_keplerian()),
            OrbitElements::Circular(_) => OrbitElements::Circular(self.to_circular()),
            OrbitElements::Equinoctial(_) => OrbitElements::Equinoctial(self.to_equinoctial()),
        };
        Orbit {
            elements,
            epoch: self.epoch,
            mu: self.mu,
        }
    }

    /// Builds an orbit at `epoch` from equinoctial elements, keeping this
    /// orbit's gravitational parameter and parameterization.
    pub fn with_equinoctial(
        &self,
        elements: EquinoctialElements,
        epoch: f64,
    ) -> Result<Orbit, OrbitError> {
        let orbit = Orbit::from_equinoctial(elements, epoch, self.mu)?;
        Ok(orbit.converted_like(&self.elements))
    }

    /// Keplerian motion over `dt` seconds: only the mean angle moves.
    pub fn shifted_by(&self, dt: f64) -> Orbit {
        let delta = self.mean_motion() * dt;
        let elements = match &self.elements {
            OrbitElements::Keplerian(kep) => OrbitElements::Keplerian(KeplerianElements {
                mean_anomaly: kep.mean_anomaly + delta,
                ..*kep
            }),
            OrbitElements::Circular(circ) => OrbitElements::Circular(CircularElements {
                alpha_m: circ.alpha_m + delta,
                ..*circ
            }),
            OrbitElements::Equinoctial(eq) => OrbitElements::Equinoctial(EquinoctialElements {
                lambda_m: eq.lambda_m + delta,
                ..*eq
            }),
            OrbitElements::Cartesian(_) => {
                let eq = self.to_equinoctial();
                let shifted = EquinoctialElements {
                    lambda_m: eq.lambda_m + delta,
                    ..eq
                };
                let (position, velocity) = shifted.to_cartesian(self.mu);
                OrbitElements::Cartesian(CartesianState::new(position, velocity))
            }
        };
        Orbit {
            elements,
            epoch: self.epoch + dt,
            mu: self.mu,
        }
    }
}

impl HasMass for Orbit {
    fn mu(&self) -> f64 {
        self.mu
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    use super::*;

    const MU: f64 = 3.986004415e14;

    fn leo() -> KeplerianElements {
        KeplerianElements {
            a: 7.0e6,
            e: 0.01,
            i: 0.9,
            raan: 1.3,
            arg_perigee: -0.4,
            mean_anomaly: 2.5,
        }
    }

    #[test]
    fn test_validation() {
        assert!(Orbit::from_keplerian(leo(), 0.0, MU).is_ok());
        assert_eq!(
            Orbit::from_keplerian(leo(), 0.0, -1.0),
            Err(OrbitError::NonPositiveMu(-1.0))
        );
        assert_eq!(
            Orbit::from_keplerian(KeplerianElements { e: 1.2, ..leo() }, 0.0, MU),
            Err(OrbitError::NotElliptic(1.2))
        );
        assert_eq!(
            Orbit::from_keplerian(KeplerianElements { a: -7.0e6, ..leo() }, 0.0, MU),
            Err(OrbitError::NonPositiveSemiMajorAxis(-7.0e6))
        );
        assert_eq!(
            Orbit::from_keplerian(KeplerianElements { i: f64::NAN, ..leo() }, 0.0, MU),
            Err(OrbitError::NonFinite)
        );

        // Escape velocity and up is rejected
        let r = 7.0e6;
        let v = (2.0 * MU / r).sqrt() * 1.01;
        let result = Orbit::from_cartesian(Vector3::new(r, 0.0, 0.0), Vector3::new(0.0, v, 0.0), 0.0, MU);
        assert!(matches!(result, Err(OrbitError::NotElliptic(_))));
    }

    #[test]
    fn test_retrograde_equatorial() {
        let position = Vector3::new(7.0e6, 0.0, 0.0);
        let result = Orbit::from_cartesian(position, Vector3::new(0.0, -7.5e3, 0.0), 0.0, MU);
        assert_eq!(result, Err(OrbitError::RetrogradeEquatorial));

        // Slightly off the equator is still fine
        let velocity = Vector3::new(0.0, -7.5e3, 10.0);
        let orbit = Orbit::from_cartesian(position, velocity, 0.0, MU).unwrap();
        let elements = orbit.to_equinoctial();
        assert!(elements.hx.is_finite() && elements.hy.is_finite());
        assert!(elements.inclination() > 3.0);
    }

    #[test]
    fn test_conversions_agree() {
        let orbit = Orbit::from_keplerian(leo(), 10.0, MU).unwrap();
        let state = orbit.to_cartesian();
        let from_pv = Orbit::from_cartesian(state.position(), state.velocity(), 10.0, MU).unwrap();

        let kep = from_pv.to_keplerian();
        assert_relative_eq!(kep.a, 7.0e6, max_relative = 1e-12);
        assert_relative_eq!(kep.e, 0.01, epsilon = 1e-12);
        assert_relative_eq!(kep.i, 0.9, epsilon = 1e-12);
        assert_relative_eq!(from_pv.true_anomaly(), orbit.true_anomaly(), epsilon = 1e-10);

        let circular = from_pv.converted_like(&OrbitElements::Circular(orbit.to_circular()));
        assert!(matches!(circular.elements(), OrbitElements::Circular(_)));
        assert_relative_eq!(circular.position(), orbit.position(), max_relative = 1e-12);
    }

    #[test]
    fn test_shift_by_period() {
        let orbit = Orbit::from_keplerian(leo(), 0.0, MU).unwrap();
        let period = orbit.period();
        assert_relative_eq!(period, 2.0 * PI * (7.0e6f64.powi(3) / MU).sqrt());

        let shifted = orbit.shifted_by(period);
        assert_relative_eq!(shifted.epoch(), period);
        assert_relative_eq!(shifted.position(), orbit.position(), max_relative = 1e-9);

        // Cartesian orbits shift the same way
        let cartesian = orbit.converted_like(&OrbitElements::Cartesian(orbit.to_cartesian()));
        let half = cartesian.shifted_by(period / 2.0);
        assert_relative_eq!(
            half.position(),
            orbit.shifted_by(period / 2.0).position(),
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_derived_quantities() {
        let orbit = Orbit::from_keplerian(leo(), 0.0, MU).unwrap();
        assert_relative_eq!(orbit.perigee_radius(), 7.0e6 * 0.99, max_relative = 1e-14);
        assert_relative_eq!(orbit.mu(), MU);
        assert_relative_eq!(orbit.semimajor_axis(), 7.0e6);
        assert_relative_eq!(orbit.inclination(), 0.9, epsilon = 1e-14);
    }
}
