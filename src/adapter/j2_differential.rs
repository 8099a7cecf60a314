use super::DifferentialEffect;
use crate::astro::{EquinoctialElements, Orbit};
use crate::gravity::ZonalHarmonics;
use crate::propagation::PropagationError;

/// Direct effects such as maneuvers only act strictly after their date, so
/// they are evaluated this long after the reference date.
const DIRECT_EFFECT_OFFSET: f64 = 1e-3;

/// Corrects the J2 secular drift of a trajectory whose orbit was changed by
/// another effect.
///
/// A maneuver changes a, e and i, hence the J2 precession rates of the node
/// and the perigee. The reference trajectory still drifts at the old rates;
/// this effect adds the difference, growing linearly from the reference
/// date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct J2DifferentialEffect {
    reference_epoch: f64,
    apply_before: bool,
    d_perigee_rate: f64,
    d_raan_rate: f64,
}

impl J2DifferentialEffect {
    /// `direct` is the effect whose J2 consequences should be corrected, for
    /// instance a [SmallManeuverEffect](super::SmallManeuverEffect) at the
    /// date of `original`.
    pub fn new<G: ZonalHarmonics + ?Sized>(
        original: &Orbit,
        direct: &dyn DifferentialEffect,
        apply_before: bool,
        field: &G,
    ) -> Result<Self, PropagationError> {
        let modified = direct.apply_to_orbit(&original.shifted_by(DIRECT_EFFECT_OFFSET))?;
        Ok(Self::from_orbits(original, &modified, apply_before, field))
    }

    /// Effect of switching from `original` to `modified`, referenced at the
    /// date of `original`.
    pub fn from_orbits<G: ZonalHarmonics + ?Sized>(
        original: &Orbit,
        modified: &Orbit,
        apply_before: bool,
        field: &G,
    ) -> Self {
        let j2 = field.unnormalized_jn(2, original.epoch());
        let radius = field.reference_radius();
        let (perigee0, raan0) = j2_rates(original, j2, radius);
        let (perigee1, raan1) = j2_rates(modified, j2, radius);

        J2DifferentialEffect {
            reference_epoch: original.epoch(),
            apply_before,
            d_perigee_rate: perigee1 - perigee0,
            d_raan_rate: raan1 - raan0,
        }
    }

    /// Differences in (argument of perigee, node) rates, rad/s.
    pub fn rate_changes(&self) -> (f64, f64) {
        (self.d_perigee_rate, self.d_raan_rate)
    }
}

/// First-order J2 rates of the argument of perigee and the node.
fn j2_rates(orbit: &Orbit, j2: f64, reference_radius: f64) -> (f64, f64) {
    let kep = orbit.to_keplerian();
    let n = orbit.mean_motion();
    let p = kep.a * (1.0 - kep.e * kep.e);
    let factor = 1.5 * n * j2 * (reference_radius / p).powi(2);
    let (sin_i, cos_i) = kep.i.sin_cos();
    let perigee = 0.5 * factor * (4.0 - 5.0 * sin_i * sin_i);
    let raan = -factor * cos_i;
    (perigee, raan)
}

impl DifferentialEffect for J2DifferentialEffect {
    fn apply_to_orbit(&self, orbit: &Orbit) -> Result<Orbit, PropagationError> {
        let dt = orbit.epoch() - self.reference_epoch;
        if dt < 0.0 && !self.apply_before {
            return Ok(*orbit);
        }

        let d_raan = self.d_raan_rate * dt;
        let d_lon_perigee = self.d_perigee_rate * dt + d_raan;

        // The eccentricity vector turns with the longitude of perigee, the
        // inclination vector with the node; the mean anomaly is unchanged.
        let eq = orbit.to_equinoctial();
        let (sin_p, cos_p) = d_lon_perigee.sin_cos();
        let (sin_o, cos_o) = d_raan.sin_cos();
        let rotated = EquinoctialElements {
            a: eq.a,
            ex: eq.ex * cos_p - eq.ey * sin_p,
            ey: eq.ex * sin_p + eq.ey * cos_p,
            hx: eq.hx * cos_o - eq.hy * sin_o,
            hy: eq.hx * sin_o + eq.hy * cos_o,
            lambda_m: eq.lambda_m + d_lon_perigee,
        };
        Ok(orbit.with_equinoctial(rotated, orbit.epoch())?)
    }
}
