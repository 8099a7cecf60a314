//! Orbit value types.
//!
//! The important types in this module are:
//! - [Orbit], an immutable osculating (or mean) orbit at a date, holding one
//!   of several element parameterizations ([OrbitElements])
//! - the element sets themselves: [KeplerianElements], [CircularElements],
//!   [EquinoctialElements], and the Cartesian [CartesianState]
//! - [SpacecraftState], which adds attitude, mass and additional state to an
//!   orbit

mod attitude;
mod elements;
mod orbit;
mod spacecraft;
mod state;

pub use attitude::{AttitudeProvider, FixedAttitude, LocalOrbitalFrameAttitude};
pub use elements::{
    eccentric_to_mean_longitude, CircularElements, EquinoctialElements, KeplerianElements,
};
pub use orbit::{Orbit, OrbitElements};
pub use spacecraft::{SpacecraftState, DEFAULT_MASS};
pub use state::CartesianState;

/// A trait indicating this object can be used in physical computations that
/// require a massive central body.
pub trait HasMass {
    /// The standard gravitational parameter of this object
    fn mu(&self) -> f64;
}

impl<T> HasMass for &T
where
    T: HasMass + ?Sized,
{
    fn mu(&self) -> f64 {
        (*self).mu()
    }
}

impl<T> HasMass for std::sync::Arc<T>
where
    T: HasMass + ?Sized,
{
    fn mu(&self) -> f64 {
        self.as_ref().mu()
    }
}

/// Reasons an orbit can't be built from a set of elements.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrbitError {
    #[error("gravitational parameter must be positive, got {0}")]
    NonPositiveMu(f64),
    #[error("semi-major axis must be positive, got {0} m")]
    NonPositiveSemiMajorAxis(f64),
    #[error("only elliptic orbits are supported, got eccentricity {0}")]
    NotElliptic(f64),
    #[error("orbit contains non-finite values")]
    NonFinite,
    #[error("retrograde equatorial orbits have no equinoctial representation")]
    RetrogradeEquatorial,
}
