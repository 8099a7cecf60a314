//! Minimal event detection on top of any [Propagator].
//!
//! Detectors expose a switching function `g`; an event is a sign change of
//! `g` along the trajectory. The driver samples the trajectory every
//! `max_check` seconds, brackets sign changes and narrows them down by
//! bisection, then lets the detector decide what happens next.

mod detectors;

pub use detectors::{DateDetector, NodeDetector};

use log::debug;

use crate::astro::SpacecraftState;
use crate::math::intervals::Interval;
use crate::math::root_finding::bisection;
use crate::propagation::{PropagationError, Propagator};

const MAX_BISECTION_ITERATIONS: usize = 100;

/// What to do once an event has been found.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Continue,
    Stop,
    /// Restart the propagator from this state.
    ResetState(SpacecraftState),
}

pub trait EventDetector {
    /// Switching function; events are its zeros.
    fn g(&self, state: &SpacecraftState) -> f64;

    /// Called once per event, with the state just after the sign change.
    fn event_occurred(&mut self, state: &SpacecraftState, increasing: bool) -> Action;

    /// Convergence threshold on the event date, in seconds.
    fn threshold(&self) -> f64 {
        1e-6
    }
}

/// An event found during propagation.
#[derive(Debug, Clone, PartialEq)]
pub struct EventPoint {
    pub epoch: f64,
    /// Index of the detector in the slice given to [propagate_with_events]
    pub detector: usize,
    pub increasing: bool,
}

#[derive(Debug, Clone)]
pub struct EventOutcome {
    pub final_state: SpacecraftState,
    pub events: Vec<EventPoint>,
    /// Whether a detector stopped the propagation before the target date
    pub stopped: bool,
}

struct Crossing {
    bracket: Interval,
    detector: usize,
    increasing: bool,
}

/// Propagates forward to `target`, handling events along the way.
///
/// `max_check` must be positive and finite, otherwise the sampling loop
/// would never advance.
pub fn propagate_with_events<P: Propagator>(
    propagator: &mut P,
    detectors: &mut [Box<dyn EventDetector>],
    target: f64,
    max_check: f64,
) -> Result<EventOutcome, PropagationError> {
    if !(max_check > 0.0) || !max_check.is_finite() {
        return Err(PropagationError::InvalidMaxCheck(max_check));
    }

    let mut state = propagator.propagate(propagator.initial_state().epoch())?;
    let mut events = Vec::new();

    while state.epoch() < target {
        let t0 = state.epoch();
        let t1 = (t0 + max_check).min(target);
        let next = propagator.propagate(t1)?;

        let crossing = find_first_crossing(&*propagator, detectors, &state, &next)?;
        let crossing = match crossing {
            Some(crossing) => crossing,
            None => {
                state = next;
                continue;
            }
        };

        // Continue from just past the root, so the same sign change isn't
        // found twice
        let event_state = propagator.propagate(crossing.bracket.hi())?;
        debug!(
            "event from detector {} at {} ({})",
            crossing.detector,
            event_state.epoch(),
            if crossing.increasing { "increasing" } else { "decreasing" }
        );
        events.push(EventPoint {
            epoch: event_state.epoch(),
            detector: crossing.detector,
            increasing: crossing.increasing,
        });

        match detectors[crossing.detector].event_occurred(&event_state, crossing.increasing) {
            Action::Continue => state = event_state,
            Action::Stop => {
                return Ok(EventOutcome {
                    final_state: event_state,
                    events,
                    stopped: true,
                })
            }
            Action::ResetState(new_state) => {
                propagator.reset_initial_state(new_state.clone())?;
                state = new_state;
            }
        }
    }

    Ok(EventOutcome {
        final_state: state,
        events,
        stopped: false,
    })
}

/// Earliest sign change of any detector between two states.
fn find_first_crossing<P: Propagator>(
    propagator: &P,
    detectors: &[Box<dyn EventDetector>],
    start: &SpacecraftState,
    end: &SpacecraftState,
) -> Result<Option<Crossing>, PropagationError> {
    let mut first: Option<Crossing> = None;
    for (idx, detector) in detectors.iter().enumerate() {
        let g0 = detector.g(start);
        let g1 = detector.g(end);
        if g0 == 0.0 || g0.signum() == g1.signum() {
            continue;
        }

        let bracket = bisection(
            |t| propagator.propagate(t).map(|s| detector.g(&s)),
            Interval::new(start.epoch(), end.epoch()),
            detector.threshold(),
            MAX_BISECTION_ITERATIONS,
        )?;

        let earlier = first
            .as_ref()
            .map_or(true, |c| bracket.hi() < c.bracket.hi());
        if earlier {
            first = Some(Crossing {
                bracket,
                detector: idx,
                increasing: g1 > g0,
            });
        }
    }
    Ok(first)
}
