use std::{
    cell::Cell,
    time::{Duration, Instant},
};

/// Caller-imposed budget for a solve.
///
/// The solvers poll [`TimeLimit::can_progress`] between steps and give up with no result
/// once it turns false. An inactive limit never expires.
pub struct TimeLimit {
    is_active: bool,
    start: Instant,
    max_duration: Duration,
    max_steps: Option<u64>,
    steps: Cell<u64>,
}

impl TimeLimit {
    pub fn new(duration: Option<Duration>) -> Self {
        Self {
            is_active: duration.is_some(),
            start: Instant::now(),
            max_duration: duration.unwrap_or_default(),
            max_steps: None,
            steps: Cell::new(0),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(None)
    }

    /// Also stop after `max_steps` polls, independent of the clock.
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Counts one step and reports whether the solver may continue.
    pub fn can_progress(&self) -> bool {
        let steps = self.steps.get() + 1;
        self.steps.set(steps);

        if let Some(max_steps) = self.max_steps {
            if steps > max_steps {
                return false;
            }
        }
        !self.is_active || self.start.elapsed() < self.max_duration
    }

    pub fn steps(&self) -> u64 {
        self.steps.get()
    }

    pub fn remaining(&self) -> Option<Duration> {
        if !self.is_active {
            return None;
        }
        Some(self.max_duration.saturating_sub(self.start.elapsed()))
    }
}
