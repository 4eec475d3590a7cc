//! Simulation clock: owns the step counter and the pause flag.

use crate::types::{RunId, Step};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub run_id: RunId,
    /// The next step to execute. Steps are numbered from 0.
    pub current_step: Step,
    pub paused: bool,
}

impl SimClock {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            current_step: 0,
            paused: true,
        }
    }

    /// Enter the next step and return its number.
    /// Panics if called while paused; callers must check.
    pub fn advance(&mut self) -> Step {
        assert!(!self.paused, "advance() called on paused clock");
        let step = self.current_step;
        self.current_step += 1;
        step
    }

    /// Number of steps executed so far.
    pub fn steps_run(&self) -> Step {
        self.current_step
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }
}
