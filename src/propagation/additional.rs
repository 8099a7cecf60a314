use crate::astro::SpacecraftState;

/// Computes a named additional state from the rest of a spacecraft state.
pub trait AdditionalStateProvider {
    fn name(&self) -> &str;

    fn additional_state(&self, state: &SpacecraftState) -> Vec<f64>;
}

/// Wraps a closure as an [AdditionalStateProvider].
pub struct FunctionProvider<F> {
    name: String,
    function: F,
}

impl<F> FunctionProvider<F>
where
    F: Fn(&SpacecraftState) -> Vec<f64>,
{
    pub fn new(name: impl Into<String>, function: F) -> Self {
        FunctionProvider {
            name: name.into(),
            function,
        }
    }
}

impl<F> AdditionalStateProvider for FunctionProvider<F>
where
    F: Fn(&SpacecraftState) -> Vec<f64>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn additional_state(&self, state: &SpacecraftState) -> Vec<f64> {
        (self.function)(state)
    }
}

/// The providers one propagator manages, in registration order.
#[derive(Default)]
pub struct AdditionalStateRegistry {
    providers: Vec<Box<dyn AdditionalStateProvider>>,
}

impl AdditionalStateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, provider: Box<dyn AdditionalStateProvider>) {
        self.providers.push(provider);
    }

    pub fn names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_owned()).collect()
    }

    pub fn is_managed(&self, name: &str) -> bool {
        self.providers.iter().any(|p| p.name() == name)
    }

    /// Evaluates every provider on `state`. Later providers see the values
    /// of earlier ones.
    pub fn apply(&self, state: SpacecraftState) -> SpacecraftState {
        self.providers.iter().fold(state, |state, provider| {
            let values = provider.additional_state(&state);
            state.with_additional_state(provider.name(), values)
        })
    }
}

impl std::fmt::Debug for AdditionalStateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astro::{KeplerianElements, Orbit};

    #[test]
    fn test_registry_order() {
        let kep = KeplerianElements {
            a: 7.0e6,
            e: 0.0,
            i: 0.1,
            raan: 0.0,
            arg_perigee: 0.0,
            mean_anomaly: 0.0,
        };
        let state = SpacecraftState::new(Orbit::from_keplerian(kep, 0.0, 3.986004415e14).unwrap());

        let mut registry = AdditionalStateRegistry::new();
        registry.add(Box::new(FunctionProvider::new("radius", |s: &SpacecraftState| {
            vec![s.position().norm()]
        })));
        registry.add(Box::new(FunctionProvider::new("twice", |s: &SpacecraftState| {
            let r = s.additional_state("radius").map_or(0.0, |v| v[0]);
            vec![2.0 * r]
        })));

        assert_eq!(registry.names(), vec!["radius".to_owned(), "twice".to_owned()]);
        assert!(registry.is_managed("twice"));
        assert!(!registry.is_managed("mass"));

        let state = registry.apply(state);
        let radius = state.additional_state("radius").unwrap()[0];
        assert!((radius - 7.0e6).abs() < 1e-6);
        assert_eq!(state.additional_state("twice"), Some(&[2.0 * radius][..]));
    }
}
