use log::warn;
use nalgebra::{Matrix6x3, Vector3, Vector6};

use super::DifferentialEffect;
use crate::astro::{EquinoctialElements, HasMass, Orbit, SpacecraftState};
use crate::math::geometry::local_orbital_frame;
use crate::math::normalize_angle;
use crate::propagation::PropagationError;

/// Standard gravity, for specific impulse conversions (m/s²).
pub const G0: f64 = 9.80665;

/// Velocity step for the finite-difference Jacobian (m/s).
const VELOCITY_STEP: f64 = 1e-3;

/// Past this fraction of the orbital speed, second-order terms stop being
/// negligible.
const LARGE_MANEUVER_RATIO: f64 = 1e-2;

/// Frame a maneuver's velocity increment is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManeuverFrame {
    Inertial,
    /// x radial, z along the orbital angular momentum, y completing the triad
    LocalOrbital,
}

/// Linearized effect of a small impulsive maneuver.
///
/// The change in equinoctial elements is the element Jacobian with respect
/// to velocity at the maneuver date, times the velocity increment. The
/// change in mean motion makes the mean longitude drift linearly afterwards.
/// States at or before the maneuver date are left untouched.
///
/// By default the effect adds a burn the reference trajectory doesn't have,
/// so it also consumes propellant. To remove a burn the reference already
/// contains, build the effect with the opposite increment and call
/// [SmallManeuverEffect::undoing]: the propellant is then given back instead.
#[derive(Debug, Clone)]
pub struct SmallManeuverEffect {
    epoch: f64,
    dv: Vector3<f64>,
    /// Ratio of mass after the burn to mass before it
    mass_ratio: f64,
    undo: bool,
    /// Change in (a, ex, ey, hx, hy, lambda_m)
    delta: Vector6<f64>,
    /// Change in mean motion, rad/s
    delta_n: f64,
}

impl SmallManeuverEffect {
    /// `state` is the state at the maneuver date, `dv` is in m/s and `isp`
    /// in seconds.
    pub fn new(
        state: &SpacecraftState,
        dv: Vector3<f64>,
        frame: ManeuverFrame,
        isp: f64,
    ) -> Result<Self, PropagationError> {
        let orbit = state.orbit();
        let cartesian = orbit.to_cartesian();
        let dv = match frame {
            ManeuverFrame::Inertial => dv,
            ManeuverFrame::LocalOrbital => {
                local_orbital_frame(&cartesian.position(), &cartesian.velocity()) * dv
            }
        };

        if dv.norm() > LARGE_MANEUVER_RATIO * cartesian.velocity().norm() {
            warn!(
                "maneuver of {} m/s at {} is large for a linearized effect",
                dv.norm(),
                state.epoch()
            );
        }

        let jacobian = velocity_jacobian(orbit)?;
        let delta = jacobian * dv;

        let eq = orbit.to_equinoctial();
        let n = eq.mean_motion(orbit.mu());
        let delta_n = -1.5 * n / eq.a * delta[0];

        Ok(SmallManeuverEffect {
            epoch: state.epoch(),
            dv,
            mass_ratio: (-dv.norm() / (G0 * isp)).exp(),
            undo: false,
            delta,
            delta_n,
        })
    }

    /// Marks this effect as cancelling a burn already in the reference, so
    /// the mass it burned is restored rather than consumed a second time.
    pub fn undoing(mut self) -> Self {
        self.undo = true;
        self
    }

    pub fn is_undo(&self) -> bool {
        self.undo
    }

    pub fn epoch(&self) -> f64 {
        self.epoch
    }

    /// Velocity increment in the inertial frame.
    pub fn inertial_dv(&self) -> Vector3<f64> {
        self.dv
    }

    /// Linearized change of equinoctial elements, without the drift.
    pub fn element_change(&self) -> EquinoctialElements {
        to_elements(&self.delta)
    }

    pub fn mass_ratio(&self) -> f64 {
        self.mass_ratio
    }
}

fn to_vector(eq: &EquinoctialElements) -> Vector6<f64> {
    Vector6::new(eq.a, eq.ex, eq.ey, eq.hx, eq.hy, eq.lambda_m)
}

fn to_elements(v: &Vector6<f64>) -> EquinoctialElements {
    EquinoctialElements {
        a: v[0],
        ex: v[1],
        ey: v[2],
        hx: v[3],
        hy: v[4],
        lambda_m: v[5],
    }
}

/// d(equinoctial elements) / d(velocity), by central differences.
fn velocity_jacobian(orbit: &Orbit) -> Result<Matrix6x3<f64>, PropagationError> {
    let state = orbit.to_cartesian();
    let mut jacobian = Matrix6x3::zeros();
    for j in 0..3 {
        let mut step = Vector3::zeros();
        step[j] = VELOCITY_STEP;
        let plus = Orbit::from_cartesian(
            state.position(),
            state.velocity() + step,
            orbit.epoch(),
            orbit.mu(),
        )?;
        let minus = Orbit::from_cartesian(
            state.position(),
            state.velocity() - step,
            orbit.epoch(),
            orbit.mu(),
        )?;

        let mut diff = to_vector(&plus.to_equinoctial()) - to_vector(&minus.to_equinoctial());
        diff[5] = normalize_angle(diff[5], 0.0);
        jacobian.set_column(j, &(diff / (2.0 * VELOCITY_STEP)));
    }
    Ok(jacobian)
}

impl DifferentialEffect for SmallManeuverEffect {
    fn apply_to_orbit(&self, orbit: &Orbit) -> Result<Orbit, PropagationError> {
        let dt = orbit.epoch() - self.epoch;
        if dt <= 0.0 {
            return Ok(*orbit);
        }

        let mut delta = self.delta;
        delta[5] += self.delta_n * dt;
        let updated = to_vector(&orbit.to_equinoctial()) + delta;
        Ok(orbit.with_equinoctial(to_elements(&updated), orbit.epoch())?)
    }

    fn apply_to_state(&self, state: &SpacecraftState) -> Result<SpacecraftState, PropagationError> {
        if state.epoch() <= self.epoch {
            return Ok(state.clone());
        }
        let mass = if self.undo {
            state.mass() / self.mass_ratio
        } else {
            state.mass() * self.mass_ratio
        };
        Ok(state
            .with_orbit(self.apply_to_orbit(state.orbit())?)
            .with_mass(mass))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::consts::{leo_elements, TEST_MU};

    fn state() -> SpacecraftState {
        SpacecraftState::new(Orbit::from_keplerian(leo_elements(), 100.0, TEST_MU).unwrap())
    }

    #[test]
    fn test_along_track_raises_orbit() {
        let state = state();
        let speed = state.velocity().norm();
        let dv = state.velocity() / speed * 0.5;
        let effect = SmallManeuverEffect::new(&state, dv, ManeuverFrame::Inertial, 300.0).unwrap();

        // Vis-viva: da = 2 a² v dv / mu
        let a = leo_elements().a;
        let expected = 2.0 * a * a * speed * 0.5 / TEST_MU;
        assert_relative_eq!(effect.element_change().a, expected, max_relative = 1e-4);

        // Mean motion slows down
        assert!(effect.delta_n < 0.0);
        assert_relative_eq!(
            effect.mass_ratio(),
            (-0.5 / (G0 * 300.0)).exp(),
            max_relative = 1e-15
        );
    }

    #[test]
    fn test_frames() {
        let state = state();
        let lof = SmallManeuverEffect::new(
            &state,
            Vector3::new(0.0, 0.0, 0.2),
            ManeuverFrame::LocalOrbital,
            300.0,
        )
        .unwrap();

        // z of the local frame is the orbit normal
        let normal = state.position().cross(&state.velocity()).normalize();
        assert_relative_eq!(lof.inertial_dv(), normal * 0.2, epsilon = 1e-12);

        // An out-of-plane burn leaves a nearly unchanged
        assert!(lof.element_change().a.abs() < 1e-3);
    }

    #[test]
    fn test_applies_strictly_after() {
        let state = state();
        let effect = SmallManeuverEffect::new(
            &state,
            Vector3::new(0.1, 0.2, 0.3),
            ManeuverFrame::Inertial,
            250.0,
        )
        .unwrap();

        let at_date = effect.apply_to_state(&state).unwrap();
        assert_eq!(at_date, state);

        let later = state.with_orbit(state.orbit().shifted_by(60.0));
        let changed = effect.apply_to_state(&later).unwrap();
        assert!(changed.mass() < later.mass());
        assert!((changed.position() - later.position()).norm() > 1.0);
    }

    #[test]
    fn test_undo_restores_mass() {
        let state = state();
        let dv = Vector3::new(0.0, 0.3, 0.0);
        let burn = SmallManeuverEffect::new(&state, dv, ManeuverFrame::LocalOrbital, 300.0).unwrap();
        let undo = SmallManeuverEffect::new(&state, -dv, ManeuverFrame::LocalOrbital, 300.0)
            .unwrap()
            .undoing();
        assert!(!burn.is_undo());
        assert!(undo.is_undo());

        let later = state.with_orbit(state.orbit().shifted_by(60.0));
        let burned = burn.apply_to_state(&later).unwrap();
        assert_relative_eq!(burned.mass(), later.mass() * burn.mass_ratio(), max_relative = 1e-15);

        // Undoing the burn on the burned trajectory gets the mass back
        let restored = undo.apply_to_state(&burned).unwrap();
        assert_relative_eq!(restored.mass(), later.mass(), max_relative = 1e-14);
        assert!(restored.mass() > burned.mass());

        // Opposite increments, opposite element changes
        assert_relative_eq!(
            undo.element_change().a,
            -burn.element_change().a,
            max_relative = 1e-6
        );
        assert_eq!(undo.apply_to_state(&state).unwrap(), state);
    }

    #[test]
    fn test_matches_exact_burn() {
        // Burning, then letting the orbit coast, vs. the linearized model
        let state = state();
        let dv = Vector3::new(-0.05, 0.08, 0.03);
        let effect = SmallManeuverEffect::new(&state, dv, ManeuverFrame::Inertial, 300.0).unwrap();

        let burned = Orbit::from_cartesian(
            state.position(),
            state.velocity() + dv,
            state.epoch(),
            TEST_MU,
        )
        .unwrap();
        let dt = 2000.0;
        let exact = burned.shifted_by(dt);
        let modeled = effect.apply_to_orbit(&state.orbit().shifted_by(dt)).unwrap();
        assert!((exact.position() - modeled.position()).norm() < 0.2);
    }
}
