use log::{debug, trace};

use super::{Ephemeris, PropagationError, Propagator};
use crate::astro::SpacecraftState;

/// Records the states a propagator produces while it is driven forward in
/// time, so they can be replayed later as an [Ephemeris].
///
/// Between two requested dates, samples are also taken on a fixed grid of
/// `step` seconds from the initial date. A non-positive step records only
/// the requested dates.
pub struct EphemerisGenerator<P> {
    propagator: P,
    step: f64,
    samples: Vec<SpacecraftState>,
    /// Index of the next grid point to record
    next_grid_point: u64,
}

impl<P: Propagator> EphemerisGenerator<P> {
    pub fn new(propagator: P, step: f64) -> Self {
        let initial = propagator.initial_state().clone();
        EphemerisGenerator {
            propagator,
            step,
            samples: vec![initial],
            next_grid_point: 1,
        }
    }

    fn start(&self) -> f64 {
        self.samples[0].epoch()
    }

    pub fn last_epoch(&self) -> f64 {
        self.samples[self.samples.len() - 1].epoch()
    }

    /// Propagates to `epoch`, recording everything on the way.
    ///
    /// Dates must never go backwards: the recorded samples have to stay in
    /// chronological order.
    pub fn propagate(&mut self, epoch: f64) -> Result<SpacecraftState, PropagationError> {
        let last = self.last_epoch();
        if epoch < last {
            return Err(PropagationError::NonMonotonicDate {
                requested: epoch,
                last,
            });
        }

        if self.step > 0.0 {
            loop {
                let grid_epoch = self.start() + self.next_grid_point as f64 * self.step;
                if grid_epoch >= epoch {
                    break;
                }
                if grid_epoch > self.last_epoch() {
                    let state = self.propagator.propagate(grid_epoch)?;
                    trace!("recorded grid sample at {}", grid_epoch);
                    self.samples.push(state);
                }
                self.next_grid_point += 1;
            }
        }

        let state = self.propagator.propagate(epoch)?;
        if epoch > self.last_epoch() {
            self.samples.push(state.clone());
        }
        Ok(state)
    }

    pub fn samples(&self) -> &[SpacecraftState] {
        &self.samples
    }

    /// Stops recording and hands back the ephemeris.
    pub fn build(self) -> Result<Ephemeris, PropagationError> {
        debug!(
            "building ephemeris from {} samples over [{}, {}]",
            self.samples.len(),
            self.start(),
            self.last_epoch()
        );
        Ephemeris::new(self.samples)
    }
}
