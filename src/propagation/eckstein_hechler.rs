//! Eckstein-Hechler analytical theory for near-circular orbits.
//!
//! Works in circular elements. Secular drift of the node and the mean
//! argument of latitude includes J2 to J6; the eccentricity vector rotates
//! around the frozen eccentricity set by J3 and J5. Short-period terms carry
//! J2 to J6 to first order in eccentricity, plus the J2² terms of the
//! semi-major axis that keep the along-track drift down.

use simba::scalar::RealField;

use super::mean_solver::{solve_mean_elements, MeanSolverSettings, ZonalDomain};
use super::{
    assemble_state, AdditionalStateProvider, AdditionalStateRegistry, PropagationError,
    PropagationType, Propagator,
};
use crate::astro::{AttitudeProvider, CircularElements, FixedAttitude, HasMass, Orbit, SpacecraftState};
use crate::gravity::{ZonalCoefficients, ZonalHarmonics};
use crate::math::lit;

/// The theory is an expansion around circular orbits.
pub const MAX_ECCENTRICITY: f64 = 0.1;

/// `gn = -Jn (Re/a)^n` and powers of `sin i`, shared by the secular and
/// periodic terms.
#[derive(Debug, Clone, Copy)]
struct Harmonics<T> {
    g2: T,
    g3: T,
    g4: T,
    g5: T,
    g6: T,
    sin_i: T,
    cos_i: T,
    s2: T,
    s4: T,
    s6: T,
}

impl<T: RealField + Copy> Harmonics<T> {
    fn new(a: T, i: T, coefficients: &ZonalCoefficients) -> Self {
        let q = lit::<T>(coefficients.reference_radius()) / a;
        let g = |degree: usize| -coefficients.jn_as::<T>(degree) * q.powi(degree as i32);
        let (sin_i, cos_i) = i.sin_cos();
        let s2 = sin_i * sin_i;
        Harmonics {
            g2: g(2),
            g3: g(3),
            g4: g(4),
            g5: g(5),
            g6: g(6),
            sin_i,
            cos_i,
            s2,
            s4: s2 * s2,
            s6: s2 * s2 * s2,
        }
    }

    /// J2 rotation rate of the eccentricity vector, in units of mean motion.
    fn perigee_rate(&self) -> T {
        -lit::<T>(0.75) * self.g2 * (lit::<T>(4.0) - lit::<T>(5.0) * self.s2)
    }

    /// `(eps1, eps2)`: the J4/J6 distortion of the eccentricity circle and
    /// the J3/J5 frozen eccentricity.
    fn frozen_eccentricity(&self) -> (T, T) {
        let k = |x: f64| lit::<T>(x);
        let Harmonics {
            g3,
            g4,
            g5,
            g6,
            sin_i,
            s2,
            s4,
            ..
        } = *self;
        let rdpom = self.perigee_rate();

        let q = k(3.0) / (k(32.0) * rdpom);
        let eps1 = q * g4 * s2 * (k(30.0) - k(35.0) * s2)
            - k(175.0) * q * g6 * s2 * (T::one() - k(3.0) * s2 + k(2.0625) * s4);
        let q = k(3.0) * sin_i / (k(8.0) * rdpom);
        let eps2 = q * g3 * (k(4.0) - k(5.0) * s2)
            - q * g5 * (k(10.0) - k(35.0) * s2 + k(26.25) * s4);
        (eps1, eps2)
    }

    /// Secular drift of the mean argument of latitude, in units of mean
    /// motion, without the Keplerian part.
    fn latitude_drift(&self) -> T {
        -lit::<T>(1.5) * self.g2 * (lit::<T>(3.0) - lit::<T>(4.0) * self.s2)
    }
}

/// Maps mean circular elements to osculating ones.
pub fn mean_to_osculating<T: RealField + Copy>(
    mean: &CircularElements<T>,
    coefficients: &ZonalCoefficients,
) -> CircularElements<T> {
    let k = |x: f64| lit::<T>(x);
    let one = T::one();

    let h = Harmonics::new(mean.a, mean.i, coefficients);
    let Harmonics {
        g2,
        g3,
        g4,
        g5,
        g6,
        sin_i,
        cos_i,
        s2,
        s4,
        s6,
    } = h;
    let (_, eps2) = h.frozen_eccentricity();
    let rdl = one + h.latitude_drift();

    let qq = -k(1.5) * g2 / rdl;
    let qa = k(0.75) * g2 * g2 * s2;
    let qb = k(0.25) * g4 * s2;
    let qc = k(105.0 / 16.0) * g6 * s2;
    let qd = -k(0.75) * g3 * sin_i;
    let qe = k(3.75) * g5 * sin_i;
    let kh = k(0.375) / h.perigee_rate();
    let kl = kh / sin_i;

    // Semi-major axis
    let ax1 = qq * (k(2.0) - k(3.5) * s2);
    let ay1 = qq * (k(2.0) - k(2.5) * s2);
    let as1 = qd * (k(4.0) - k(5.0) * s2) + qe * (k(2.625) * s4 - k(3.5) * s2 + one);
    let ac2 = qq * s2
        + qa * k(7.0) * (k(2.0) - k(3.0) * s2)
        + qb * (k(15.0) - k(17.5) * s2)
        + qc * (k(3.0) * s2 - one - k(33.0 / 16.0) * s4);
    let axy3 = qq * k(3.5) * s2;
    let as3 = qd * k(5.0 / 3.0) * s2 + qe * k(7.0 / 6.0) * s2 * (one - k(1.125) * s2);
    let ac4 = qa * s2 + qb * k(4.375) * s2 + qc * k(0.75) * (k(1.1) * s4 - s2);
    let as5 = qe * k(21.0 / 80.0) * s4;
    let ac6 = qc * k(-11.0 / 80.0) * s4;

    // Eccentricity vector
    let ex1 = qq * (one - k(1.25) * s2);
    let exx2 = qq * k(0.5) * (k(3.0) - k(5.0) * s2);
    let exy2 = qq * (k(2.0) - k(1.5) * s2);
    let ex3 = qq * k(7.0 / 12.0) * s2;
    let ex4 = qq * k(17.0 / 8.0) * s2;

    let ey1 = qq * (one - k(1.75) * s2);
    let eyx2 = qq * (one - k(3.0) * s2);
    let eyy2 = qq * (k(2.0) * s2 - k(1.5));
    let ey3 = qq * k(7.0 / 12.0) * s2;
    let ey4 = qq * k(17.0 / 8.0) * s2;

    // Node
    let q = -qq * cos_i;
    let rx1 = k(3.5) * q;
    let ry1 = k(-2.5) * q;
    let r2 = k(-0.5) * q;
    let r3 = k(7.0 / 6.0) * q;
    let rl = g3 * cos_i * (k(4.0) - k(15.0) * s2)
        - k(2.5) * g5 * cos_i * (k(4.0) - k(42.0) * s2 + k(52.5) * s4);

    // Inclination
    let q = k(0.5) * qq * sin_i * cos_i;
    let iy1 = q;
    let ix1 = -q;
    let i2 = q;
    let i3 = q * k(7.0 / 3.0);
    let ih = -g3 * cos_i * (k(4.0) - k(5.0) * s2)
        + k(2.5) * g5 * cos_i * (k(4.0) - k(14.0) * s2 + k(10.5) * s4);

    // Argument of latitude
    let lx1 = qq * (k(7.0) - k(77.0 / 8.0) * s2);
    let ly1 = qq * (k(55.0 / 8.0) * s2 - k(7.5));
    let l2 = qq * (k(1.25) * s2 - k(0.5));
    let l3 = qq * (k(77.0 / 24.0) * s2 - k(7.0 / 6.0));
    let ll = g3 * (k(53.0) * s2 - k(4.0) - k(57.5) * s4)
        + k(2.5) * g5 * (k(4.0) - k(96.0) * s2 + k(269.5) * s4 - k(201.25) * s6);

    let harmonic = |n: f64| (k(n) * mean.alpha_m).sin_cos();
    let (sl1, cl1) = harmonic(1.0);
    let (sl2, cl2) = harmonic(2.0);
    let (sl3, cl3) = harmonic(3.0);
    let (sl4, cl4) = harmonic(4.0);
    let (sl5, _) = harmonic(5.0);
    let (_, cl6) = harmonic(6.0);

    let CircularElements { ex, ey, .. } = *mean;
    let qh = (ey - eps2) * kh;
    let ql = ex * kl;

    let da = ax1 * ex * cl1
        + ay1 * ey * sl1
        + as1 * sl1
        + ac2 * cl2
        + axy3 * (ex * cl3 + ey * sl3)
        + as3 * sl3
        + ac4 * cl4
        + as5 * sl5
        + ac6 * cl6;
    let dex = ex1 * cl1
        + exx2 * ex * cl2
        + exy2 * ey * sl2
        + ex3 * cl3
        + ex4 * (ex * cl4 + ey * sl4);
    let dey = ey1 * sl1
        + eyx2 * ex * sl2
        + eyy2 * ey * cl2
        + ey3 * sl3
        + ey4 * (ex * sl4 - ey * cl4);
    let draan = rx1 * ex * sl1 + ry1 * ey * cl1 + r2 * sl2 + r3 * (ey * cl3 - ex * sl3) + ql * rl;
    let di = iy1 * ey * sl1 + ix1 * ex * cl1 + i2 * cl2 + i3 * (ex * cl3 + ey * sl3) + qh * ih;
    let dalpha =
        lx1 * ex * sl1 + ly1 * ey * cl1 + l2 * sl2 + l3 * (ex * sl3 - ey * cl3) + ql * ll;

    CircularElements {
        a: mean.a * (one + da),
        ex: ex + dex,
        ey: ey + dey,
        i: mean.i + di,
        raan: mean.raan + draan,
        alpha_m: mean.alpha_m + dalpha,
    }
}

/// Everything the secular and long-period motion depends on, computed once
/// from the initial mean elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecularCoefficients {
    pub mean_motion: f64,
    /// Rotation rate of the eccentricity vector, in units of mean motion
    pub perigee_rate: f64,
    pub node_rate: f64,
    pub latitude_rate: f64,
    pub eps1: f64,
    /// Frozen eccentricity
    pub eps2: f64,
}

pub fn secular_coefficients(
    mean: &CircularElements,
    coefficients: &ZonalCoefficients,
) -> SecularCoefficients {
    let h = Harmonics::new(mean.a, mean.i, coefficients);
    let Harmonics {
        g2,
        g4,
        g6,
        cos_i,
        s2,
        s4,
        s6,
        ..
    } = h;
    let (eps1, eps2) = h.frozen_eccentricity();

    let rdpomp = 7.5 * g4 * (1.0 - 31.0 / 8.0 * s2 + 49.0 / 16.0 * s4)
        - 13.125 * g6 * (1.0 - 8.0 * s2 + 129.0 / 8.0 * s4 - 297.0 / 32.0 * s6);

    let node_rate = cos_i
        * (1.5 * g2 - 2.25 * g2 * g2 * (2.5 - 19.0 / 6.0 * s2)
            + 0.9375 * g4 * (7.0 * s2 - 4.0)
            + 3.28125 * g6 * (2.0 - 9.0 * s2 + 8.25 * s4));

    let latitude_rate = 1.0
        + h.latitude_drift()
        + 2.25 * g2 * g2 * (9.0 - 263.0 / 12.0 * s2 + 341.0 / 24.0 * s4)
        + 15.0 / 16.0 * g4 * (8.0 - 31.0 * s2 + 24.5 * s4)
        + 105.0 / 32.0 * g6 * (-10.0 / 3.0 + 25.0 * s2 - 48.75 * s4 + 27.5 * s6);

    SecularCoefficients {
        mean_motion: (coefficients.mu() / mean.a.powi(3)).sqrt(),
        perigee_rate: h.perigee_rate() + rdpomp,
        node_rate,
        latitude_rate,
        eps1,
        eps2,
    }
}

/// Mean circular elements `dt` seconds after `mean`.
pub fn propagate_mean(
    mean: &CircularElements,
    secular: &SecularCoefficients,
    dt: f64,
) -> CircularElements {
    let SecularCoefficients {
        mean_motion,
        perigee_rate,
        node_rate,
        latitude_rate,
        eps1,
        eps2,
    } = *secular;
    let xnot = mean_motion * dt;

    let (sx, cx) = (xnot * perigee_rate).sin_cos();
    CircularElements {
        a: mean.a,
        ex: cx * mean.ex + sx * (eps2 - (1.0 - eps1) * mean.ey),
        ey: sx * (1.0 + eps1) * mean.ex + cx * (mean.ey - eps2) + eps2,
        i: mean.i,
        raan: mean.raan + node_rate * xnot,
        alpha_m: mean.alpha_m + latitude_rate * xnot,
    }
}

/// Eckstein-Hechler propagator for near-circular, non-equatorial orbits.
pub struct EcksteinHechlerPropagator<G> {
    field: G,
    initial: SpacecraftState,
    coefficients: ZonalCoefficients,
    mean: CircularElements,
    secular: SecularCoefficients,
    settings: MeanSolverSettings,
    attitude: Box<dyn AttitudeProvider>,
    providers: AdditionalStateRegistry,
}

impl<G: ZonalHarmonics> EcksteinHechlerPropagator<G> {
    pub fn new(
        initial: SpacecraftState,
        field: G,
        propagation_type: PropagationType,
    ) -> Result<Self, PropagationError> {
        Self::with_settings(initial, field, propagation_type, MeanSolverSettings::default())
    }

    pub fn with_settings(
        initial: SpacecraftState,
        field: G,
        propagation_type: PropagationType,
        settings: MeanSolverSettings,
    ) -> Result<Self, PropagationError> {
        let attitude = Box::new(FixedAttitude(initial.attitude()));
        let coefficients = ZonalCoefficients::evaluate(&field, initial.epoch());
        let mean = initial_mean(initial.orbit(), &coefficients, propagation_type, &settings)?;
        let initial = match propagation_type {
            PropagationType::Osculating => initial,
            PropagationType::Mean => {
                let osculating = mean_to_osculating(&mean, &coefficients).to_equinoctial();
                let orbit = initial
                    .orbit()
                    .with_equinoctial(osculating, initial.epoch())?;
                initial.with_orbit(orbit)
            }
        };

        Ok(EcksteinHechlerPropagator {
            field,
            initial,
            coefficients,
            mean,
            secular: secular_coefficients(&mean, &coefficients),
            settings,
            attitude,
            providers: AdditionalStateRegistry::new(),
        })
    }

    pub fn with_attitude_provider(mut self, attitude: Box<dyn AttitudeProvider>) -> Self {
        self.attitude = attitude;
        self
    }

    /// Mean elements at the initial date.
    pub fn mean_orbit(&self) -> Result<Orbit, PropagationError> {
        Ok(Orbit::from_circular(
            self.mean,
            self.initial.epoch(),
            self.initial.orbit().mu(),
        )?)
    }

    pub fn mean_elements_at(&self, epoch: f64) -> CircularElements {
        propagate_mean(&self.mean, &self.secular, epoch - self.initial.epoch())
    }
}

fn domain(coefficients: &ZonalCoefficients) -> ZonalDomain {
    ZonalDomain {
        brillouin_radius: coefficients.reference_radius(),
        max_eccentricity: MAX_ECCENTRICITY,
    }
}

fn initial_mean(
    orbit: &Orbit,
    coefficients: &ZonalCoefficients,
    propagation_type: PropagationType,
    settings: &MeanSolverSettings,
) -> Result<CircularElements, PropagationError> {
    match propagation_type {
        PropagationType::Mean => {
            domain(coefficients).check(&orbit.to_equinoctial())?;
            Ok(orbit.to_circular())
        }
        PropagationType::Osculating => {
            let mean = solve_mean_elements(
                &orbit.to_equinoctial(),
                &domain(coefficients),
                settings,
                |mean| mean_to_osculating(&mean.to_circular(), coefficients).to_equinoctial(),
            )?;
            Ok(mean.to_circular())
        }
    }
}

/// Mean Eckstein-Hechler elements of an osculating orbit.
pub fn compute_mean_orbit<G: ZonalHarmonics + ?Sized>(
    osculating: &Orbit,
    field: &G,
    settings: &MeanSolverSettings,
) -> Result<Orbit, PropagationError> {
    let coefficients = ZonalCoefficients::evaluate(field, osculating.epoch());
    let mean = initial_mean(
        osculating,
        &coefficients,
        PropagationType::Osculating,
        settings,
    )?;
    Ok(Orbit::from_circular(mean, osculating.epoch(), osculating.mu())?)
}

impl<G: ZonalHarmonics> Propagator for EcksteinHechlerPropagator<G> {
    fn initial_state(&self) -> &SpacecraftState {
        &self.initial
    }

    fn propagate(&self, epoch: f64) -> Result<SpacecraftState, PropagationError> {
        let mean = self.mean_elements_at(epoch);
        let osculating = mean_to_osculating(&mean, &self.coefficients);
        let orbit = self
            .initial
            .orbit()
            .with_equinoctial(osculating.to_equinoctial(), epoch)?;
        Ok(assemble_state(
            &self.initial,
            orbit,
            self.attitude.as_ref(),
            &self.providers,
        ))
    }

    fn reset_initial_state(&mut self, state: SpacecraftState) -> Result<(), PropagationError> {
        let coefficients = ZonalCoefficients::evaluate(&self.field, state.epoch());
        let mean = initial_mean(
            state.orbit(),
            &coefficients,
            PropagationType::Osculating,
            &self.settings,
        )?;
        self.secular = secular_coefficients(&mean, &coefficients);
        self.coefficients = coefficients;
        self.mean = mean;
        self.initial = state;
        Ok(())
    }

    fn add_additional_state_provider(&mut self, provider: Box<dyn AdditionalStateProvider>) {
        self.providers.add(provider);
    }

    fn managed_additional_states(&self) -> Vec<String> {
        self.providers.names()
    }
}
