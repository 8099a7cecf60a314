use std::collections::BTreeMap;

use nalgebra::{UnitQuaternion, Vector3};

use super::Orbit;

/// Mass used when none is given, in kg.
pub const DEFAULT_MASS: f64 = 1000.0;

/// Everything a propagator knows about the spacecraft at one date.
///
/// Like [Orbit], this is an immutable value; the `with_*` methods return
/// modified copies.
#[derive(Debug, Clone, PartialEq)]
pub struct SpacecraftState {
    orbit: Orbit,
    /// Rotation from body frame to inertial frame
    attitude: UnitQuaternion<f64>,
    mass: f64,
    additional: BTreeMap<String, Vec<f64>>,
}

impl SpacecraftState {
    pub fn new(orbit: Orbit) -> Self {
        SpacecraftState {
            orbit,
            attitude: UnitQuaternion::identity(),
            mass: DEFAULT_MASS,
            additional: BTreeMap::new(),
        }
    }

    pub fn orbit(&self) -> &Orbit {
        &self.orbit
    }

    pub fn epoch(&self) -> f64 {
        self.orbit.epoch()
    }

    pub fn attitude(&self) -> UnitQuaternion<f64> {
        self.attitude
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn position(&self) -> Vector3<f64> {
        self.orbit.position()
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.orbit.velocity()
    }

    pub fn additional_state(&self, name: &str) -> Option<&[f64]> {
        self.additional.get(name).map(|v| v.as_slice())
    }

    pub fn additional_states(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.additional
    }

    pub fn has_additional_state(&self, name: &str) -> bool {
        self.additional.contains_key(name)
    }

    pub fn with_orbit(&self, orbit: Orbit) -> Self {
        SpacecraftState {
            orbit,
            ..self.clone()
        }
    }

    pub fn with_attitude(&self, attitude: UnitQuaternion<f64>) -> Self {
        SpacecraftState {
            attitude,
            ..self.clone()
        }
    }

    pub fn with_mass(&self, mass: f64) -> Self {
        SpacecraftState {
            mass,
            ..self.clone()
        }
    }

    pub fn with_additional_state(&self, name: impl Into<String>, values: Vec<f64>) -> Self {
        let mut additional = self.additional.clone();
        additional.insert(name.into(), values);
        SpacecraftState {
            additional,
            ..self.clone()
        }
    }
}
