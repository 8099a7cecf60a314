use super::{Action, EventDetector};
use crate::astro::SpacecraftState;

/// Stops propagation at a fixed date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateDetector {
    date: f64,
}

impl DateDetector {
    pub fn new(date: f64) -> Self {
        DateDetector { date }
    }
}

impl EventDetector for DateDetector {
    fn g(&self, state: &SpacecraftState) -> f64 {
        state.epoch() - self.date
    }

    fn event_occurred(&mut self, _state: &SpacecraftState, _increasing: bool) -> Action {
        Action::Stop
    }
}

/// Equator crossings, i.e. the spacecraft going through the orbit's nodes.
///
/// Ascending nodes are increasing events. Each crossing is counted, and
/// propagation continues unless a stop count was set.
#[derive(Debug, Clone, Default)]
pub struct NodeDetector {
    ascending: usize,
    descending: usize,
    stop_after: Option<usize>,
}

impl NodeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop at the n-th node crossed, ascending or descending.
    pub fn stop_after(n: usize) -> Self {
        NodeDetector {
            stop_after: Some(n),
            ..Self::default()
        }
    }

    pub fn ascending(&self) -> usize {
        self.ascending
    }

    pub fn descending(&self) -> usize {
        self.descending
    }
}

impl EventDetector for NodeDetector {
    fn g(&self, state: &SpacecraftState) -> f64 {
        state.position().z
    }

    fn event_occurred(&mut self, _state: &SpacecraftState, increasing: bool) -> Action {
        if increasing {
            self.ascending += 1;
        } else {
            self.descending += 1;
        }

        match self.stop_after {
            Some(n) if self.ascending + self.descending >= n => Action::Stop,
            _ => Action::Continue,
        }
    }
}
