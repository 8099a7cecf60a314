//! Conversions between mean, eccentric and true anomaly on elliptic orbits.
//!
//! All of these are generic over the scalar so the perturbation theories can
//! be evaluated in whatever real field the caller works in.

use simba::scalar::RealField;

use super::{lit, normalize_angle};

const KEPLER_MAX_ITERATIONS: usize = 50;

pub fn mean_to_eccentric<T: RealField + Copy>(mean_anomaly: T, e: T) -> T {
    // Solve in [-pi, pi) and put the whole revolutions back at the end
    let reduced = normalize_angle(mean_anomaly, T::zero());
    let revolutions = mean_anomaly - reduced;

    // Starting guess from Vallado, then plain Newton. Kepler's equation is
    // monotonic in E, so this converges for every elliptic eccentricity.
    let mut ecc = if reduced < T::zero() {
        reduced - e
    } else {
        reduced + e
    };
    let tolerance = T::default_epsilon() * lit(4.0);
    for _ in 0..KEPLER_MAX_ITERATIONS {
        let f = ecc - e * ecc.sin() - reduced;
        let f_prime = T::one() - e * ecc.cos();
        let step = f / f_prime;
        ecc -= step;
        if step.abs() <= tolerance * (T::one() + ecc.abs()) {
            break;
        }
    }

    ecc + revolutions
}

pub fn eccentric_to_mean<T: RealField + Copy>(eccentric_anomaly: T, e: T) -> T {
    eccentric_anomaly - e * eccentric_anomaly.sin()
}

#[inline]
fn beta<T: RealField + Copy>(e: T) -> T {
    e / (T::one() + ((T::one() - e) * (T::one() + e)).sqrt())
}

// Both of these use the half-angle difference form, which has no branch cut
// at +/- pi, unlike tan(v/2) = sqrt((1+e)/(1-e)) tan(E/2).
pub fn eccentric_to_true<T: RealField + Copy>(eccentric_anomaly: T, e: T) -> T {
    let b = beta(e);
    let (sin_e, cos_e) = eccentric_anomaly.sin_cos();
    eccentric_anomaly + lit::<T>(2.0) * (b * sin_e / (T::one() - b * cos_e)).atan()
}

pub fn true_to_eccentric<T: RealField + Copy>(true_anomaly: T, e: T) -> T {
    let b = beta(e);
    let (sin_v, cos_v) = true_anomaly.sin_cos();
    true_anomaly - lit::<T>(2.0) * (b * sin_v / (T::one() + b * cos_v)).atan()
}

pub fn mean_to_true<T: RealField + Copy>(mean_anomaly: T, e: T) -> T {
    eccentric_to_true(mean_to_eccentric(mean_anomaly, e), e)
}

pub fn true_to_mean<T: RealField + Copy>(true_anomaly: T, e: T) -> T {
    eccentric_to_mean(true_to_eccentric(true_anomaly, e), e)
}
