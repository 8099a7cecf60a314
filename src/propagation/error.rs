use thiserror::Error;

use crate::astro::OrbitError;

/// Broad classes of failure, for callers that only need to know whose
/// fault it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The orbit or data handed in is outside what the model supports.
    InvalidInput,
    /// An iterative method ran out of iterations.
    NonConvergence,
    /// An API was called in a way its contract forbids.
    Misuse,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropagationError {
    #[error("eccentricity {eccentricity} is too large for this model (limit {limit})")]
    TooLargeEccentricity { eccentricity: f64, limit: f64 },
    #[error("perigee radius {perigee_radius} m is inside the Brillouin sphere of radius {brillouin_radius} m")]
    InsideBrillouinSphere {
        perigee_radius: f64,
        brillouin_radius: f64,
    },
    #[error("orbit is almost critically inclined (i = {inclination} rad)")]
    AlmostCriticallyInclined { inclination: f64 },
    #[error("orbit is almost equatorial (i = {inclination} rad)")]
    AlmostEquatorial { inclination: f64 },
    #[error("mean elements did not converge after {iterations} iterations (residual {residual})")]
    MeanElementsNotConverged { iterations: usize, residual: f64 },
    #[error("requested date {requested} is before the last date served ({last})")]
    NonMonotonicDate { requested: f64, last: f64 },
    #[error("date {epoch} is outside the ephemeris span [{start}, {end}]")]
    OutOfRange { epoch: f64, start: f64, end: f64 },
    #[error("this propagator cannot be reset")]
    ResetNotSupported,
    #[error("an ephemeris needs at least 2 samples, got {0}")]
    NotEnoughSamples(usize),
    #[error("ephemeris samples must be strictly increasing in time ({previous} then {next})")]
    UnsortedSamples { previous: f64, next: f64 },
    #[error("event check interval must be positive and finite, got {0} s")]
    InvalidMaxCheck(f64),
    #[error(transparent)]
    Orbit(#[from] OrbitError),
}

impl PropagationError {
    pub fn kind(&self) -> ErrorKind {
        use PropagationError::*;
        match self {
            TooLargeEccentricity { .. }
            | InsideBrillouinSphere { .. }
            | AlmostCriticallyInclined { .. }
            | AlmostEquatorial { .. }
            | NotEnoughSamples(_)
            | UnsortedSamples { .. }
            | Orbit(_) => ErrorKind::InvalidInput,
            MeanElementsNotConverged { .. } => ErrorKind::NonConvergence,
            NonMonotonicDate { .. }
            | OutOfRange { .. }
            | ResetNotSupported
            | InvalidMaxCheck(_) => ErrorKind::Misuse,
        }
    }
}
