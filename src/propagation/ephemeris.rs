use std::collections::BTreeMap;

use itertools::Itertools;
use nalgebra::Vector3;

use super::{AdditionalStateProvider, AdditionalStateRegistry, PropagationError, Propagator};
use crate::astro::{HasMass, Orbit, SpacecraftState};

/// A propagator that interpolates between stored states.
///
/// Positions and velocities use cubic Hermite interpolation, mass and
/// additional states are linear, attitude is slerped. Dates outside the
/// sample span are rejected rather than extrapolated.
pub struct Ephemeris {
    samples: Vec<SpacecraftState>,
    providers: AdditionalStateRegistry,
}

impl Ephemeris {
    pub fn new(samples: Vec<SpacecraftState>) -> Result<Self, PropagationError> {
        if samples.len() < 2 {
            return Err(PropagationError::NotEnoughSamples(samples.len()));
        }
        for (previous, next) in samples.iter().tuple_windows() {
            if !(next.epoch() > previous.epoch()) {
                return Err(PropagationError::UnsortedSamples {
                    previous: previous.epoch(),
                    next: next.epoch(),
                });
            }
        }

        Ok(Ephemeris {
            samples,
            providers: AdditionalStateRegistry::new(),
        })
    }

    pub fn min_epoch(&self) -> f64 {
        self.samples[0].epoch()
    }

    pub fn max_epoch(&self) -> f64 {
        self.samples[self.samples.len() - 1].epoch()
    }

    pub fn samples(&self) -> &[SpacecraftState] {
        &self.samples
    }

    fn interpolate(&self, epoch: f64) -> Result<SpacecraftState, PropagationError> {
        if !(self.min_epoch()..=self.max_epoch()).contains(&epoch) {
            return Err(PropagationError::OutOfRange {
                epoch,
                start: self.min_epoch(),
                end: self.max_epoch(),
            });
        }

        // First sample strictly after the date, kept inside the last segment
        let idx = self
            .samples
            .partition_point(|s| s.epoch() <= epoch)
            .max(1)
            .min(self.samples.len() - 1);
        let before = &self.samples[idx - 1];
        let after = &self.samples[idx];

        let h = after.epoch() - before.epoch();
        let s = (epoch - before.epoch()) / h;
        let (position, velocity) = hermite(
            (before.position(), before.velocity()),
            (after.position(), after.velocity()),
            h,
            s,
        );

        let orbit = Orbit::from_cartesian(position, velocity, epoch, before.orbit().mu())?
            .converted_like(before.orbit().elements());
        let attitude = before
            .attitude()
            .try_slerp(&after.attitude(), s, 1e-12)
            .unwrap_or_else(|| before.attitude());
        let mass = lerp(before.mass(), after.mass(), s);

        let mut state = before
            .with_orbit(orbit)
            .with_attitude(attitude)
            .with_mass(mass);
        for (name, values) in interpolate_additional(before, after, s) {
            state = state.with_additional_state(name, values);
        }
        Ok(state)
    }
}

fn lerp(a: f64, b: f64, s: f64) -> f64 {
    a + (b - a) * s
}

/// Cubic Hermite interpolation over a segment of length `h`, at fraction `s`.
fn hermite(
    start: (Vector3<f64>, Vector3<f64>),
    end: (Vector3<f64>, Vector3<f64>),
    h: f64,
    s: f64,
) -> (Vector3<f64>, Vector3<f64>) {
    let (p0, v0) = start;
    let (p1, v1) = end;
    let s2 = s * s;
    let s3 = s2 * s;

    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;
    let position = p0 * h00 + v0 * (h10 * h) + p1 * h01 + v1 * (h11 * h);

    let d00 = (6.0 * s2 - 6.0 * s) / h;
    let d10 = 3.0 * s2 - 4.0 * s + 1.0;
    let d01 = (-6.0 * s2 + 6.0 * s) / h;
    let d11 = 3.0 * s2 - 2.0 * s;
    let velocity = p0 * d00 + v0 * d10 + p1 * d01 + v1 * d11;

    (position, velocity)
}

/// Additional states present with the same shape on both ends are
/// interpolated, anything else is taken from the earlier sample.
fn interpolate_additional(
    before: &SpacecraftState,
    after: &SpacecraftState,
    s: f64,
) -> BTreeMap<String, Vec<f64>> {
    before
        .additional_states()
        .iter()
        .map(|(name, values)| {
            let interpolated = match after.additional_state(name) {
                Some(next) if next.len() == values.len() => values
                    .iter()
                    .zip(next)
                    .map(|(&a, &b)| lerp(a, b, s))
                    .collect(),
                _ => values.clone(),
            };
            (name.clone(), interpolated)
        })
        .collect()
}

impl Propagator for Ephemeris {
    fn initial_state(&self) -> &SpacecraftState {
        &self.samples[0]
    }

    fn propagate(&self, epoch: f64) -> Result<SpacecraftState, PropagationError> {
        Ok(self.providers.apply(self.interpolate(epoch)?))
    }

    fn reset_initial_state(&mut self, _state: SpacecraftState) -> Result<(), PropagationError> {
        Err(PropagationError::ResetNotSupported)
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
    use crate::astro::OrbitElements;
    use crate::consts::{leo_elements, TEST_MU};
    use crate::propagation::{ErrorKind, KeplerianPropagator};

    fn sampled(step: f64, count: usize) -> (KeplerianPropagator, Ephemeris) {
        let orbit = Orbit::from_keplerian(leo_elements(), 0.0, TEST_MU).unwrap();
        let propagator = KeplerianPropagator::new(SpacecraftState::new(orbit));
        let samples = (0..count)
            .map(|k| {
                let state = propagator.propagate(k as f64 * step).unwrap();
                state
                    .with_mass(1000.0 - k as f64)
                    .with_additional_state("counter", vec![k as f64])
            })
            .collect();
        (propagator, Ephemeris::new(samples).unwrap())
    }

    #[test]
    fn test_interpolation_accuracy() {
        let (reference, ephemeris) = sampled(30.0, 40);
        for &t in [0.0, 13.0, 333.3, 600.0, 1139.9, 1170.0].iter() {
            let expected = reference.propagate(t).unwrap();
            let actual = ephemeris.propagate(t).unwrap();
            assert!((actual.position() - expected.position()).norm() < 0.1);
            assert!((actual.velocity() - expected.velocity()).norm() < 1e-2);
        }

        let mid = ephemeris.propagate(45.0).unwrap();
        assert_relative_eq!(mid.mass(), 998.5);
        assert_relative_eq!(mid.additional_state("counter").unwrap()[0], 1.5);
        assert!(matches!(mid.orbit().elements(), OrbitElements::Keplerian(_)));
    }

    #[test]
    fn test_samples_are_reproduced() {
        let (_, ephemeris) = sampled(60.0, 5);
        let sample = &ephemeris.samples()[2];
        let state = ephemeris.propagate(120.0).unwrap();
        assert_relative_eq!(state.position(), sample.position(), max_relative = 1e-12);
        assert_eq!(state.additional_state("counter"), Some(&[2.0][..]));
    }

    #[test]
    fn test_out_of_range() {
        let (_, ephemeris) = sampled(60.0, 5);
        assert_eq!(ephemeris.min_epoch(), 0.0);
        assert_eq!(ephemeris.max_epoch(), 240.0);

        let err = ephemeris.propagate(240.5).unwrap_err();
        assert_eq!(
            err,
            PropagationError::OutOfRange {
                epoch: 240.5,
                start: 0.0,
                end: 240.0
            }
        );
        assert_eq!(err.kind(), ErrorKind::Misuse);
        assert!(ephemeris.propagate(-1.0).is_err());
    }

    #[test]
    fn test_invalid_samples() {
        let orbit = Orbit::from_keplerian(leo_elements(), 0.0, TEST_MU).unwrap();
        let state = SpacecraftState::new(orbit);

        assert_eq!(
            Ephemeris::new(vec![state.clone()]).err(),
            Some(PropagationError::NotEnoughSamples(1))
        );
        let later = state.with_orbit(orbit.shifted_by(10.0));
        assert!(matches!(
            Ephemeris::new(vec![later.clone(), state.clone()]).err(),
            Some(PropagationError::UnsortedSamples { .. })
        ));
        assert!(matches!(
            Ephemeris::new(vec![state.clone(), state.clone()]).err(),
            Some(PropagationError::UnsortedSamples { .. })
        ));

        let mut ephemeris = Ephemeris::new(vec![state.clone(), later]).unwrap();
        assert_eq!(
            ephemeris.reset_initial_state(state),
            Err(PropagationError::ResetNotSupported)
        );
    }
}
