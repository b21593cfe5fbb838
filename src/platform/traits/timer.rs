//! Timer interface trait
//!
//! This module defines the timer and delay interface that platform
//! implementations must provide.

use crate::platform::Result;

/// Timer interface trait
///
/// # Safety Invariants
///
/// - Timer peripheral must be initialized before use
/// - Monotonic time source (never goes backwards)
pub trait TimerInterface {
    /// Delay for specified number of milliseconds
    ///
    /// Blocks execution for at least `ms` milliseconds. This is the only
    /// suspension point in the single sequential control flow.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Timer` if the delay operation fails.
    fn delay_ms(&mut self, ms: u32) -> Result<()>;

    /// Delay for specified number of microseconds
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Timer` if the delay operation fails.
    fn delay_us(&mut self, us: u32) -> Result<()>;

    /// Get current time in milliseconds
    ///
    /// Returns a monotonic timestamp in milliseconds since platform
    /// initialization.
    fn now_ms(&self) -> u64;
}
