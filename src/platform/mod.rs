//! Platform abstraction layer
//!
//! This module provides hardware abstraction for the tracker targets.
//! All platform-specific code must stay behind these traits so the core
//! logic builds and tests on the host.

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{PlatformError, Result};
pub use traits::{StorageInterface, TimerInterface, UartConfig, UartInterface};
