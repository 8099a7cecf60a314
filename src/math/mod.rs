//! Scalar helpers shared by the element conversions and the perturbation
//! theories.
//!
//! Everything numeric that should work for more than plain `f64` is written
//! against [RealField], so the same formulas can be evaluated in `f32`, `f64`
//! or any other real field implementing the simba traits.

pub mod anomaly;
pub mod geometry;
pub mod intervals;
pub mod root_finding;

use simba::scalar::RealField;

/// Lifts an `f64` literal into an arbitrary real field.
#[inline]
pub fn lit<T: RealField>(value: f64) -> T {
    nalgebra::convert(value)
}

/// Normalizes an angle into the 2π-wide interval centered on `center`.
pub fn normalize_angle<T: RealField + Copy>(angle: T, center: T) -> T {
    let two_pi = T::two_pi();
    angle - two_pi * ((angle + T::pi() - center) / two_pi).floor()
}
