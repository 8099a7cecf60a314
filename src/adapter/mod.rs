//! Cheap corrections layered on top of an existing trajectory.
//!
//! An [AdapterPropagator] wraps a reference propagator (often an
//! [Ephemeris](crate::propagation::Ephemeris)) and applies a chain of
//! [DifferentialEffect]s to every state it returns. This is how small
//! maneuvers are added to a precomputed trajectory without propagating it
//! again.

mod j2_differential;
mod small_maneuver;

pub use j2_differential::J2DifferentialEffect;
pub use small_maneuver::{ManeuverFrame, SmallManeuverEffect};

use log::debug;

use crate::astro::{Orbit, SpacecraftState};
use crate::propagation::{
    AdditionalStateProvider, AdditionalStateRegistry, PropagationError, Propagator,
};

/// A change applied to states of a reference trajectory.
pub trait DifferentialEffect {
    fn apply_to_orbit(&self, orbit: &Orbit) -> Result<Orbit, PropagationError>;

    /// Effects that touch more than the orbit (mass, for instance) override
    /// this.
    fn apply_to_state(&self, state: &SpacecraftState) -> Result<SpacecraftState, PropagationError> {
        Ok(state.with_orbit(self.apply_to_orbit(state.orbit())?))
    }
}

pub struct AdapterPropagator<P> {
    reference: P,
    effects: Vec<Box<dyn DifferentialEffect>>,
    providers: AdditionalStateRegistry,
}

impl<P: Propagator> AdapterPropagator<P> {
    pub fn new(reference: P) -> Self {
        AdapterPropagator {
            reference,
            effects: Vec::new(),
            providers: AdditionalStateRegistry::new(),
        }
    }

    /// Effects are applied in the order they were added.
    pub fn add_effect(&mut self, effect: Box<dyn DifferentialEffect>) {
        self.effects.push(effect);
        debug!("adapter now has {} effects", self.effects.len());
    }

    pub fn effects(&self) -> &[Box<dyn DifferentialEffect>] {
        &self.effects
    }

    pub fn reference(&self) -> &P {
        &self.reference
    }
}

impl<P: Propagator> Propagator for AdapterPropagator<P> {
    fn initial_state(&self) -> &SpacecraftState {
        self.reference.initial_state()
    }

    fn propagate(&self, epoch: f64) -> Result<SpacecraftState, PropagationError> {
        let mut state = self.reference.propagate(epoch)?;
        for effect in &self.effects {
            state = effect.apply_to_state(&state)?;
        }
        Ok(self.providers.apply(state))
    }

    fn reset_initial_state(&mut self, state: SpacecraftState) -> Result<(), PropagationError> {
        self.reference.reset_initial_state(state)
    }

    fn add_additional_state_provider(&mut self, provider: Box<dyn AdditionalStateProvider>) {
        self.providers.add(provider);
    }

    /// Only the adapter's own providers: the reference propagator's are not
    /// inherited, their values simply pass through.
    fn managed_additional_states(&self) -> Vec<String> {
        self.providers.names()
    }
}
