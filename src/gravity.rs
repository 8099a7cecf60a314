//! Zonal part of a central body's gravity field.
//!
//! Propagators never reach for a global field: they are handed a
//! [ZonalHarmonics] implementation, and evaluate it once into an immutable
//! [ZonalCoefficients] snapshot that the theories read from.

use std::sync::Arc;

use simba::scalar::RealField;

use crate::astro::HasMass;
use crate::math::lit;

/// Highest degree any of the analytical theories use.
pub const MAX_ZONAL_DEGREE: usize = 6;

/// A provider of unnormalized zonal coefficients `Jn = -Cn,0`.
pub trait ZonalHarmonics: HasMass {
    /// Equatorial radius the coefficients are normalized to. Also the radius
    /// of the Brillouin sphere.
    fn reference_radius(&self) -> f64;

    fn max_degree(&self) -> usize;

    /// Unnormalized `Jn` at the given date. Degrees above [Self::max_degree]
    /// are zero.
    fn unnormalized_jn(&self, degree: usize, epoch: f64) -> f64;
}

impl<T> ZonalHarmonics for &T
where
    T: ZonalHarmonics + ?Sized,
{
    fn reference_radius(&self) -> f64 {
        (*self).reference_radius()
    }

    fn max_degree(&self) -> usize {
        (*self).max_degree()
    }

    fn unnormalized_jn(&self, degree: usize, epoch: f64) -> f64 {
        (*self).unnormalized_jn(degree, epoch)
    }
}

impl<T> ZonalHarmonics for Arc<T>
where
    T: ZonalHarmonics + ?Sized,
{
    fn reference_radius(&self) -> f64 {
        self.as_ref().reference_radius()
    }

    fn max_degree(&self) -> usize {
        self.as_ref().max_degree()
    }

    fn unnormalized_jn(&self, degree: usize, epoch: f64) -> f64 {
        self.as_ref().unnormalized_jn(degree, epoch)
    }
}

/// A field with constant zonal coefficients up to degree 6.
#[derive(Debug, Clone, PartialEq)]
pub struct ZonalField {
    mu: f64,
    reference_radius: f64,
    /// J2 through J6
    jn: [f64; MAX_ZONAL_DEGREE - 1],
}

impl ZonalField {
    pub fn new(mu: f64, reference_radius: f64, jn: [f64; MAX_ZONAL_DEGREE - 1]) -> Self {
        ZonalField {
            mu,
            reference_radius,
            jn,
        }
    }

    /// Only the J2 term.
    pub fn j2_only(mu: f64, reference_radius: f64, j2: f64) -> Self {
        Self::new(mu, reference_radius, [j2, 0.0, 0.0, 0.0, 0.0])
    }

    /// Earth, from EGM96 (unnormalized, tide free).
    pub fn earth() -> Self {
        Self::new(
            3.986004415e14,
            6_378_136.3,
            [
                1.082_626_683_553_15e-3,
                -2.532_656_485_332_3e-6,
                -1.619_621_591_367_0e-6,
                -2.272_960_829_0e-7,
                5.406_812_391_0e-7,
            ],
        )
    }
}

impl HasMass for ZonalField {
    fn mu(&self) -> f64 {
        self.mu
    }
}

impl ZonalHarmonics for ZonalField {
    fn reference_radius(&self) -> f64 {
        self.reference_radius
    }

    fn max_degree(&self) -> usize {
        MAX_ZONAL_DEGREE
    }

    fn unnormalized_jn(&self, degree: usize, _epoch: f64) -> f64 {
        match degree {
            2..=MAX_ZONAL_DEGREE => self.jn[degree - 2],
            _ => 0.0,
        }
    }
}

/// Zonal coefficients frozen at one date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZonalCoefficients {
    mu: f64,
    reference_radius: f64,
    /// Indexed by degree; entries 0 and 1 stay zero
    jn: [f64; MAX_ZONAL_DEGREE + 1],
    epoch: f64,
}

impl ZonalCoefficients {
    pub fn evaluate<G: ZonalHarmonics + ?Sized>(field: &G, epoch: f64) -> Self {
        let mut jn = [0.0; MAX_ZONAL_DEGREE + 1];
        let max_degree = field.max_degree().min(MAX_ZONAL_DEGREE);
        for (degree, j) in jn.iter_mut().enumerate().take(max_degree + 1).skip(2) {
            *j = field.unnormalized_jn(degree, epoch);
        }
        ZonalCoefficients {
            mu: field.mu(),
            reference_radius: field.reference_radius(),
            jn,
            epoch,
        }
    }

    pub fn reference_radius(&self) -> f64 {
        self.reference_radius
    }

    pub fn epoch(&self) -> f64 {
        self.epoch
    }

    pub fn jn(&self, degree: usize) -> f64 {
        self.jn.get(degree).copied().unwrap_or(0.0)
    }

    /// `Jn` lifted into the scalar type a theory is evaluated in.
    pub fn jn_as<T: RealField>(&self, degree: usize) -> T {
        lit(self.jn(degree))
    }
}

impl HasMass for ZonalCoefficients {
    fn mu(&self) -> f64 {
        self.mu
    }
}
