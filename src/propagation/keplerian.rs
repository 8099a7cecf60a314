use super::{
    assemble_state, AdditionalStateProvider, AdditionalStateRegistry, PropagationError, Propagator,
};
use crate::astro::{AttitudeProvider, FixedAttitude, SpacecraftState};

/// Two-body motion: only the mean angle moves.
pub struct KeplerianPropagator {
    initial: SpacecraftState,
    attitude: Box<dyn AttitudeProvider>,
    providers: AdditionalStateRegistry,
}

impl KeplerianPropagator {
    pub fn new(initial: SpacecraftState) -> Self {
        KeplerianPropagator {
            attitude: Box::new(FixedAttitude(initial.attitude())),
            initial,
            providers: AdditionalStateRegistry::new(),
        }
    }

    pub fn with_attitude_provider(mut self, attitude: Box<dyn AttitudeProvider>) -> Self {
        self.attitude = attitude;
        self
    }
}

impl Propagator for KeplerianPropagator {
    fn initial_state(&self) -> &SpacecraftState {
        &self.initial
    }

    fn propagate(&self, epoch: f64) -> Result<SpacecraftState, PropagationError> {
        let orbit = self.initial.orbit().shifted_by(epoch - self.initial.epoch());
        Ok(assemble_state(
            &self.initial,
            orbit,
            self.attitude.as_ref(),
            &self.providers,
        ))
    }

    fn reset_initial_state(&mut self, state: SpacecraftState) -> Result<(), PropagationError> {
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

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::astro::{LocalOrbitalFrameAttitude, Orbit};
    use crate::consts::{leo_elements, TEST_MU};
    use crate::propagation::FunctionProvider;

    #[test]
    fn test_period() {
        let orbit = Orbit::from_keplerian(leo_elements(), 50.0, TEST_MU).unwrap();
        let propagator = KeplerianPropagator::new(SpacecraftState::new(orbit));

        let after = propagator.propagate(50.0 + orbit.period()).unwrap();
        assert_relative_eq!(after.position(), orbit.position(), max_relative = 1e-9);
        assert_relative_eq!(after.epoch(), 50.0 + orbit.period());

        // Backwards works just as well
        let before = propagator.propagate(50.0 - orbit.period()).unwrap();
        assert_relative_eq!(before.position(), orbit.position(), max_relative = 1e-9);
    }

    #[test]
    fn test_state_contents() {
        let orbit = Orbit::from_keplerian(leo_elements(), 0.0, TEST_MU).unwrap();
        let initial = SpacecraftState::new(orbit)
            .with_mass(850.0)
            .with_additional_state("tag", vec![1.0, 2.0]);
        let mut propagator = KeplerianPropagator::new(initial)
            .with_attitude_provider(Box::new(LocalOrbitalFrameAttitude));
        propagator.add_additional_state_provider(Box::new(FunctionProvider::new(
            "altitude",
            |s: &SpacecraftState| vec![s.position().norm() - 6378137.0],
        )));

        let state = propagator.propagate(1234.0).unwrap();
        assert_eq!(state.mass(), 850.0);
        // Unmanaged data is carried along untouched
        assert_eq!(state.additional_state("tag"), Some(&[1.0, 2.0][..]));
        assert!(state.additional_state("altitude").unwrap()[0] > 700e3);
        assert_eq!(propagator.managed_additional_states(), vec!["altitude".to_owned()]);

        let radial = state.position().normalize();
        assert_relative_eq!(state.attitude() * nalgebra::Vector3::x(), radial, epsilon = 1e-12);
    }
}
