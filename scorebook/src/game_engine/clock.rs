use serde_derive::{Deserialize, Serialize};

/// A whole-second countdown. The clock never schedules anything itself, the
/// owner calls `tick` once for every elapsed second.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    remaining: u32,
    running: bool,
}

impl Clock {
    pub fn new(remaining: u32) -> Self {
        Self {
            remaining,
            running: false,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Returns true if the clock was started, false if it was already running
    pub fn start(&mut self) -> bool {
        if self.running {
            false
        } else {
            self.running = true;
            true
        }
    }

    /// Returns true if the clock was stopped, false if it was already stopped
    pub fn pause(&mut self) -> bool {
        let was_running = self.running;
        self.running = false;
        was_running
    }

    pub fn reset(&mut self, to: u32) {
        self.running = false;
        self.remaining = to;
    }

    /// Takes one second off a running clock. Returns true once the clock has
    /// reached zero, at which point the owner is expected to pause it.
    pub fn tick(&mut self) -> bool {
        if self.running {
            self.remaining = self.remaining.saturating_sub(1);
        }
        self.is_exhausted()
    }
}
