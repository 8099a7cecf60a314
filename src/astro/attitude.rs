use nalgebra::UnitQuaternion;

use super::Orbit;
use crate::math::geometry::local_orbital_frame;

/// Supplies the spacecraft attitude along an orbit.
pub trait AttitudeProvider {
    /// Rotation from body frame to inertial frame.
    fn attitude(&self, orbit: &Orbit) -> UnitQuaternion<f64>;
}

/// Always the same inertial attitude.
#[derive(Debug, Clone, Copy)]
pub struct FixedAttitude(pub UnitQuaternion<f64>);

impl Default for FixedAttitude {
    fn default() -> Self {
        FixedAttitude(UnitQuaternion::identity())
    }
}

impl AttitudeProvider for FixedAttitude {
    fn attitude(&self, _orbit: &Orbit) -> UnitQuaternion<f64> {
        self.0
    }
}

/// Body axes aligned with the local orbital frame: x radial, z along the
/// orbital angular momentum.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalOrbitalFrameAttitude;

impl AttitudeProvider for LocalOrbitalFrameAttitude {
    fn attitude(&self, orbit: &Orbit) -> UnitQuaternion<f64> {
        let state = orbit.to_cartesian();
        let rotation = local_orbital_frame(&state.position(), &state.velocity());
        UnitQuaternion::from_rotation_matrix(&rotation)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    use super::*;
    use crate::astro::KeplerianElements;

    #[test]
    fn test_lof_attitude() {
        let kep = KeplerianElements {
            a: 7.0e6,
            e: 0.0,
            i: 0.3,
            raan: 0.2,
            arg_perigee: 0.0,
            mean_anomaly: 1.0,
        };
        let orbit = Orbit::from_keplerian(kep, 0.0, 3.986004415e14).unwrap();
        let q = LocalOrbitalFrameAttitude.attitude(&orbit);

        let radial = orbit.position().normalize();
        assert_relative_eq!(q * Vector3::x(), radial, epsilon = 1e-12);
        // Circular orbit: y is exactly along the velocity
        assert_relative_eq!(q * Vector3::y(), orbit.velocity().normalize(), epsilon = 1e-12);

        let fixed = FixedAttitude::default();
        assert_eq!(fixed.attitude(&orbit), UnitQuaternion::identity());
    }
}
