//! Analytical propagators and the pieces they share.
//!
//! Every propagator implements [Propagator]. The zonal ones
//! ([BrouwerLyddanePropagator], [EcksteinHechlerPropagator]) are built from
//! either a mean or an osculating initial state, see [PropagationType]; in
//! the latter case the mean elements are found with
//! [solve_mean_elements].

pub mod brouwer_lyddane;
pub mod eckstein_hechler;

mod additional;
mod ephemeris;
mod error;
mod generator;
mod keplerian;
mod mean_solver;

pub use additional::{AdditionalStateProvider, AdditionalStateRegistry, FunctionProvider};
pub use brouwer_lyddane::BrouwerLyddanePropagator;
pub use eckstein_hechler::EcksteinHechlerPropagator;
pub use ephemeris::Ephemeris;
pub use error::{ErrorKind, PropagationError};
pub use generator::EphemerisGenerator;
pub use keplerian::KeplerianPropagator;
pub use mean_solver::{solve_mean_elements, MeanSolverSettings, ZonalDomain};

use crate::astro::{AttitudeProvider, Orbit, SpacecraftState};

/// Whether the orbit handed to a propagator holds mean or osculating elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationType {
    Mean,
    Osculating,
}

pub trait Propagator {
    fn initial_state(&self) -> &SpacecraftState;

    /// Osculating state at `epoch` (seconds from the reference epoch).
    fn propagate(&self, epoch: f64) -> Result<SpacecraftState, PropagationError>;

    /// Restarts the propagator from a new osculating state.
    fn reset_initial_state(&mut self, state: SpacecraftState) -> Result<(), PropagationError>;

    fn add_additional_state_provider(&mut self, provider: Box<dyn AdditionalStateProvider>);

    /// Names of the additional states this propagator computes itself.
    fn managed_additional_states(&self) -> Vec<String>;

    fn is_additional_state_managed(&self, name: &str) -> bool {
        self.managed_additional_states().iter().any(|n| n == name)
    }
}

/// Builds the output state of an analytical propagator: new orbit and
/// attitude, mass and unmanaged additional states from the initial state,
/// then the managed additional states.
fn assemble_state(
    initial: &SpacecraftState,
    orbit: Orbit,
    attitude: &dyn AttitudeProvider,
    providers: &AdditionalStateRegistry,
) -> SpacecraftState {
    let state = initial
        .with_orbit(orbit)
        .with_attitude(attitude.attitude(&orbit));
    providers.apply(state)
}
