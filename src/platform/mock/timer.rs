//! Mock Timer implementation for testing

use crate::platform::{traits::TimerInterface, Result};

/// Mock Timer implementation
///
/// Uses simulated time: delays advance an internal counter instead of
/// sleeping, so timeout behavior can be tested without real waiting.
#[derive(Debug, Default)]
pub struct MockTimer {
    current_us: u64,
}

impl MockTimer {
    /// Create a new mock timer starting at time 0
    pub fn new() -> Self {
        Self { current_us: 0 }
    }

    /// Current simulated time in microseconds
    pub fn now_us(&self) -> u64 {
        self.current_us
    }
}

impl TimerInterface for MockTimer {
    fn delay_ms(&mut self, ms: u32) -> Result<()> {
        self.delay_us(ms.saturating_mul(1000))
    }

    fn delay_us(&mut self, us: u32) -> Result<()> {
        self.current_us = self.current_us.wrapping_add(us as u64);
        Ok(())
    }

    fn now_ms(&self) -> u64 {
        self.current_us / 1000
    }
}
