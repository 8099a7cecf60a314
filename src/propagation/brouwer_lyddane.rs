//! Brouwer-Lyddane analytical theory.
//!
//! Mean elements drift secularly under J2, J2² and J4. The osculating orbit
//! is recovered by adding the J2 short-period terms and the long-period
//! terms of J2², J3, J4 and J5, written in Lyddane's form so that small
//! eccentricities and inclinations don't blow up.

use simba::scalar::RealField;

use super::mean_solver::{solve_mean_elements, MeanSolverSettings, ZonalDomain};
use super::{
    assemble_state, AdditionalStateProvider, AdditionalStateRegistry, PropagationError,
    PropagationType, Propagator,
};
use crate::astro::{
    AttitudeProvider, FixedAttitude, HasMass, KeplerianElements, Orbit, SpacecraftState,
};
use crate::gravity::{ZonalCoefficients, ZonalHarmonics};
use crate::math::anomaly::mean_to_true;
use crate::math::{lit, normalize_angle};

/// Above this the first-order expansion in eccentricity is no longer usable.
pub const MAX_ECCENTRICITY: f64 = 0.9;

/// One long-period term, generated by
/// `scale * G^-power * E(e) * P(sin i) * trig(order * g)` in Delaunay
/// variables, where `scale` already carries the `L^(power + 1)` that makes
/// the corrections dimensionless.
struct LongPeriodTerm<T> {
    scale: T,
    power: i32,
    /// `E(e) / e`
    e_ratio: T,
    /// `dE/de`
    e_slope: T,
    p: T,
    /// `P / sin i`
    p_ratio: T,
    /// `dP / d(sin i)`
    p_slope: T,
    order: T,
    cosine: bool,
}

impl<T: RealField + Copy> LongPeriodTerm<T> {
    /// A term whose inclination function is `numerator(s) / (1 - 5/4 s²)`.
    fn critical(
        scale: T,
        power: i32,
        (e_ratio, e_slope): (T, T),
        sin_i: T,
        (numerator, numerator_ratio, numerator_slope): (T, T, T),
        order: T,
        cosine: bool,
    ) -> Self {
        let divisor = T::one() - lit::<T>(1.25) * sin_i * sin_i;
        LongPeriodTerm {
            scale,
            power,
            e_ratio,
            e_slope,
            p: numerator / divisor,
            p_ratio: numerator_ratio / divisor,
            p_slope: (numerator_slope * divisor + lit::<T>(2.5) * sin_i * numerator)
                / (divisor * divisor),
            order,
            cosine,
        }
    }
}

/// Long-period corrections, in the combinations Lyddane's recombination
/// consumes.
struct LongPeriodCorrections<T> {
    e: T,
    i: T,
    e_dl: T,
    raan: T,
    lambda: T,
}

impl<T: RealField + Copy> LongPeriodCorrections<T> {
    fn zero() -> Self {
        LongPeriodCorrections {
            e: T::zero(),
            i: T::zero(),
            e_dl: T::zero(),
            raan: T::zero(),
            lambda: T::zero(),
        }
    }

    /// Adds the Poisson bracket of the elements with `term`.
    fn add(&mut self, term: &LongPeriodTerm<T>, e: T, eta: T, g: T, sin_i: T, cos_i: T) {
        let one = T::one();
        let (sin_jg, cos_jg) = (term.order * g).sin_cos();
        let (trig, trig_slope) = if term.cosine {
            (cos_jg, -term.order * sin_jg)
        } else {
            (sin_jg, term.order * cos_jg)
        };

        let m = term.power;
        let k = term.scale;
        let e_fn = term.e_ratio * e;
        let outer = k * eta.powi(-(m + 1));

        self.e += k * eta.powi(1 - m) * term.e_ratio * term.p * trig_slope;
        self.i -= outer * e_fn * term.p_ratio * cos_i * trig_slope;
        self.e_dl += k * eta.powi(2 - m) * term.e_slope * term.p * trig;
        self.raan -= outer * cos_i / sin_i * e_fn * term.p_slope * trig;
        self.lambda += outer
            * trig
            * (-eta * eta * e * term.e_slope * term.p / (one + eta)
                - lit::<T>(m as f64) * e_fn * term.p
                - cos_i * sin_i / (one + cos_i) * e_fn * term.p_slope);
    }
}

/// Long-period terms of the odd zonals and of J4, relative to J2.
fn long_period_corrections<T: RealField + Copy>(
    mean: &KeplerianElements<T>,
    coefficients: &ZonalCoefficients,
) -> LongPeriodCorrections<T> {
    let k = |x: f64| lit::<T>(x);
    let mut corrections = LongPeriodCorrections::zero();
    let j2 = coefficients.jn(2);
    if j2 == 0.0 {
        return corrections;
    }

    let q = k(coefficients.reference_radius()) / mean.a;
    let ratio = |degree: usize| k(coefficients.jn(degree) / j2);
    let e = mean.e;
    let eta = (T::one() - e * e).sqrt();
    let (s, c) = mean.i.sin_cos();
    let s2 = s * s;
    let s4 = s2 * s2;

    let terms = [
        // J3
        LongPeriodTerm {
            scale: ratio(3) * q / k(2.0),
            power: 1,
            e_ratio: T::one(),
            e_slope: T::one(),
            p: s,
            p_ratio: T::one(),
            p_slope: T::one(),
            order: T::one(),
            cosine: true,
        },
        // J4
        LongPeriodTerm::critical(
            ratio(4) * q * q / k(8.0),
            3,
            (e, k(2.0) * e),
            s,
            (
                s2 * (k(15.0 / 8.0) - k(35.0 / 16.0) * s2),
                s * (k(15.0 / 8.0) - k(35.0 / 16.0) * s2),
                k(15.0 / 4.0) * s - k(35.0 / 4.0) * s2 * s,
            ),
            k(2.0),
            false,
        ),
        // J5, first harmonic of g
        LongPeriodTerm::critical(
            -ratio(5) * q * q * q / k(3.0),
            5,
            (k(2.0) + k(1.5) * e * e, k(2.0) + k(4.5) * e * e),
            s,
            (
                k(15.0 / 8.0) * s * (T::one() - k(3.5) * s2 + k(21.0 / 8.0) * s4),
                k(15.0 / 8.0) * (T::one() - k(3.5) * s2 + k(21.0 / 8.0) * s4),
                k(15.0 / 8.0) * (T::one() - k(10.5) * s2 + k(105.0 / 8.0) * s4),
            ),
            T::one(),
            true,
        ),
        // J5, third harmonic of g
        LongPeriodTerm::critical(
            -ratio(5) * q * q * q / k(3.0),
            5,
            (e * e / k(6.0), e * e / k(2.0)),
            s,
            (
                k(35.0 / 16.0) * s2 * s * (T::one() - k(1.125) * s2),
                k(35.0 / 16.0) * s2 * (T::one() - k(1.125) * s2),
                k(35.0 / 16.0) * (k(3.0) * s2 - k(45.0 / 8.0) * s4),
            ),
            k(3.0),
            true,
        ),
    ];
    for term in terms.iter() {
        corrections.add(term, e, eta, mean.arg_perigee, s, c);
    }
    corrections
}

/// Maps mean Keplerian elements to osculating ones.
#[allow(non_snake_case)]
pub fn mean_to_osculating<T: RealField + Copy>(
    mean: &KeplerianElements<T>,
    coefficients: &ZonalCoefficients,
) -> KeplerianElements<T> {
    let k = |x: f64| lit::<T>(x);
    let one = T::one();

    let KeplerianElements {
        a,
        e,
        i,
        raan,
        arg_perigee: w,
        mean_anomaly: M,
    } = *mean;

    let re_a = k(coefficients.reference_radius()) / a;
    let g2 = coefficients.jn_as::<T>(2) / k(2.0) * re_a * re_a;
    let eta2 = one - e * e;
    let eta = eta2.sqrt();
    let eta3 = eta2 * eta;
    let eta6 = eta3 * eta3;
    let g2p = g2 / (eta2 * eta2);

    let theta = i.cos();
    let theta2 = theta * theta;
    let theta4 = theta2 * theta2;
    let den = one - k(5.0) * theta2;
    let sin2_i = one - theta2;

    let f = mean_to_true(M, e);
    let (sin_f, cos_f) = f.sin_cos();
    let ar = (one + e * cos_f) / eta2;
    let ar2eta2 = ar * ar * eta2;
    let phi = f - M + e * sin_f;

    let cos_2w = (k(2.0) * w).cos();
    let sin_2w = (k(2.0) * w).sin();
    let (sin_2wf, cos_2wf) = (k(2.0) * w + f).sin_cos();
    let (sin_2w2f, cos_2w2f) = (k(2.0) * w + k(2.0) * f).sin_cos();
    let (sin_2w3f, cos_2w3f) = (k(2.0) * w + k(3.0) * f).sin_cos();

    // Semi-major axis
    let a_osc = a
        + a * g2
            * ((k(3.0) * theta2 - one) * (ar * ar * ar - one / eta3)
                + k(3.0) * sin2_i * ar * ar * ar * cos_2w2f);

    // Eccentricity
    let long_period = one - k(11.0) * theta2 - k(40.0) * theta4 / den;
    let de1 = g2p / k(8.0) * e * eta2 * long_period * cos_2w;
    let cos2_f = cos_f * cos_f;
    let cos3_f = cos2_f * cos_f;
    let de = de1
        + eta2 / k(2.0)
            * (g2
                * ((k(3.0) * theta2 - one) / eta6
                    * (e * eta + e / (one + eta) + k(3.0) * cos_f + k(3.0) * e * cos2_f
                        + e * e * cos3_f)
                    + k(3.0) * sin2_i / eta6
                        * (e + k(3.0) * cos_f + k(3.0) * e * cos2_f + e * e * cos3_f)
                        * cos_2w2f)
                - g2p * sin2_i * (k(3.0) * cos_2wf + cos_2w3f));

    // Inclination
    let di = -e * de1 / (eta2 * i.tan())
        + g2p / k(2.0)
            * theta
            * sin2_i.sqrt()
            * (k(3.0) * cos_2w2f + k(3.0) * e * cos_2wf + e * cos_2w3f);

    // Sum of the three angles, node and e * dM
    let node_terms = g2p / k(8.0)
        * e
        * e
        * theta
        * (k(11.0) + k(80.0) * theta2 / den + k(200.0) * theta4 / (den * den))
        * sin_2w;
    let short_terms = k(3.0) * sin_2w2f + k(3.0) * e * sin_2wf + e * sin_2w3f;
    let node_short = g2p / k(2.0) * theta * (k(6.0) * phi - short_terms);

    let lambda = M
        + w
        + raan
        + g2p / k(8.0) * eta3 * long_period * sin_2w
        - g2p / k(16.0)
            * (k(2.0) + e * e
                - k(11.0) * (k(2.0) + k(3.0) * e * e) * theta2
                - k(40.0) * (k(2.0) + k(5.0) * e * e) * theta4 / den
                - k(400.0) * e * e * theta4 * theta2 / (den * den))
            * sin_2w
        + g2p / k(4.0)
            * (-k(6.0) * den * phi + (k(3.0) - k(5.0) * theta2) * short_terms)
        - node_terms
        - node_short;

    let e_dM = g2p / k(8.0) * e * eta3 * long_period * sin_2w
        - g2p / k(4.0)
            * eta3
            * (k(2.0) * (k(3.0) * theta2 - one) * (ar2eta2 + ar + one) * sin_f
                + k(3.0)
                    * sin2_i
                    * ((-ar2eta2 - ar + one) * sin_2wf + (ar2eta2 + ar + one / k(3.0)) * sin_2w3f));

    let d_raan = -node_terms - node_short;

    let long = long_period_corrections(mean, coefficients);
    let de = de + long.e;
    let di = di + long.i;
    let lambda = lambda + long.lambda;
    let e_dM = e_dM + long.e_dl;
    let d_raan = d_raan + long.raan;

    // Recombine so that e -> 0 and i -> 0 stay regular
    let (sin_M, cos_M) = M.sin_cos();
    let d1 = (e + de) * sin_M + e_dM * cos_M;
    let d2 = (e + de) * cos_M - e_dM * sin_M;
    // Keep the osculating angles on the same revolution as the mean ones
    let mean_anomaly = M + normalize_angle(d1.atan2(d2) - M, T::zero());
    let e_osc = d1.hypot(d2);

    let (sin_half_i, cos_half_i) = (i / k(2.0)).sin_cos();
    let (sin_raan, cos_raan) = raan.sin_cos();
    let tilt = sin_half_i + cos_half_i * di / k(2.0);
    let d3 = tilt * sin_raan + sin_half_i * d_raan * cos_raan;
    let d4 = tilt * cos_raan - sin_half_i * d_raan * sin_raan;
    let raan_osc = raan + normalize_angle(d3.atan2(d4) - raan, T::zero());
    let i_osc = k(2.0) * d3.hypot(d4).min(one).asin();

    KeplerianElements {
        a: a_osc,
        e: e_osc,
        i: i_osc,
        raan: raan_osc,
        arg_perigee: lambda - mean_anomaly - raan_osc,
        mean_anomaly,
    }
}

/// Time derivatives of the mean angles, in rad/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecularRates {
    pub mean_anomaly: f64,
    pub arg_perigee: f64,
    pub raan: f64,
}

/// Secular drift of the mean angles from J2, J2² and J4.
pub fn secular_rates(mean: &KeplerianElements, coefficients: &ZonalCoefficients) -> SecularRates {
    let a = mean.a;
    let e = mean.e;
    let n0 = (coefficients.mu() / (a * a * a)).sqrt();

    let re_a = coefficients.reference_radius() / a;
    let g2 = coefficients.jn(2) / 2.0 * re_a.powi(2);
    let g4 = -3.0 / 8.0 * coefficients.jn(4) * re_a.powi(4);

    let eta2 = 1.0 - e * e;
    let eta = eta2.sqrt();
    let g2p = g2 / (eta2 * eta2);
    let g4p = g4 / eta2.powi(4);
    let g2p2 = g2p * g2p;

    let theta = mean.i.cos();
    let theta2 = theta * theta;
    let theta4 = theta2 * theta2;

    let mean_anomaly = n0
        * (1.0
            + 1.5 * g2p * eta * (3.0 * theta2 - 1.0)
            + 3.0 / 32.0
                * g2p2
                * eta
                * (-15.0 + 16.0 * eta + 25.0 * eta2
                    + (30.0 - 96.0 * eta - 90.0 * eta2) * theta2
                    + (105.0 + 144.0 * eta + 25.0 * eta2) * theta4)
            + 15.0 / 16.0 * g4p * eta * e * e * (3.0 - 30.0 * theta2 + 35.0 * theta4));

    let arg_perigee = n0
        * (1.5 * g2p * (5.0 * theta2 - 1.0)
            + 3.0 / 32.0
                * g2p2
                * (-35.0 + 24.0 * eta + 25.0 * eta2
                    + (90.0 - 192.0 * eta - 126.0 * eta2) * theta2
                    + (385.0 + 360.0 * eta + 45.0 * eta2) * theta4)
            + 5.0 / 16.0
                * g4p
                * (21.0 - 9.0 * eta2
                    + (-270.0 + 126.0 * eta2) * theta2
                    + (385.0 - 189.0 * eta2) * theta4));

    let raan = n0
        * (-3.0 * g2p * theta
            + 3.0 / 8.0
                * g2p2
                * ((-5.0 + 12.0 * eta + 9.0 * eta2) * theta
                    + (-35.0 - 36.0 * eta - 5.0 * eta2) * theta * theta2)
            + 5.0 / 4.0 * g4p * (5.0 - 3.0 * eta2) * theta * (3.0 - 7.0 * theta2));

    SecularRates {
        mean_anomaly,
        arg_perigee,
        raan,
    }
}

/// Brouwer-Lyddane propagator for elliptic orbits outside the critical
/// inclination.
pub struct BrouwerLyddanePropagator<G> {
    field: G,
    initial: SpacecraftState,
    coefficients: ZonalCoefficients,
    /// Mean elements at the initial date
    mean: KeplerianElements,
    rates: SecularRates,
    /// Empirical drag coefficient, rad/s²
    m2: f64,
    settings: MeanSolverSettings,
    attitude: Box<dyn AttitudeProvider>,
    providers: AdditionalStateRegistry,
}

impl<G: ZonalHarmonics> BrouwerLyddanePropagator<G> {
    pub fn new(
        initial: SpacecraftState,
        field: G,
        propagation_type: PropagationType,
    ) -> Result<Self, PropagationError> {
        Self::with_settings(
            initial,
            field,
            propagation_type,
            0.0,
            MeanSolverSettings::default(),
        )
    }

    pub fn with_settings(
        initial: SpacecraftState,
        field: G,
        propagation_type: PropagationType,
        m2: f64,
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

        Ok(BrouwerLyddanePropagator {
            field,
            initial,
            coefficients,
            mean,
            rates: secular_rates(&mean, &coefficients),
            m2,
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
        Ok(Orbit::from_keplerian(
            self.mean,
            self.initial.epoch(),
            self.initial.orbit().mu(),
        )?)
    }

    /// Mean elements at `epoch`, i.e. the initial ones with secular drift.
    pub fn mean_elements_at(&self, epoch: f64) -> KeplerianElements {
        let dt = epoch - self.initial.epoch();
        KeplerianElements {
            mean_anomaly: self.mean.mean_anomaly
                + self.rates.mean_anomaly * dt
                + self.m2 * dt * dt,
            arg_perigee: self.mean.arg_perigee + self.rates.arg_perigee * dt,
            raan: self.mean.raan + self.rates.raan * dt,
            ..self.mean
        }
    }

    pub fn secular_rates(&self) -> SecularRates {
        self.rates
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
) -> Result<KeplerianElements, PropagationError> {
    match propagation_type {
        PropagationType::Mean => {
            domain(coefficients).check(&orbit.to_equinoctial())?;
            Ok(orbit.to_keplerian())
        }
        PropagationType::Osculating => {
            let mean = solve_mean_elements(
                &orbit.to_equinoctial(),
                &domain(coefficients),
                settings,
                |mean| mean_to_osculating(&mean.to_keplerian(), coefficients).to_equinoctial(),
            )?;
            Ok(mean.to_keplerian())
        }
    }
}

/// Mean Brouwer-Lyddane elements of an osculating orbit.
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
    Ok(Orbit::from_keplerian(mean, osculating.epoch(), osculating.mu())?)
}

impl<G: ZonalHarmonics> Propagator for BrouwerLyddanePropagator<G> {
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
        self.rates = secular_rates(&mean, &coefficients);
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
