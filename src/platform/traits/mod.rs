//! Platform abstraction traits
//!
//! This module defines the traits that platform implementations must provide.

pub mod storage;
pub mod timer;
pub mod uart;

// Re-export trait interfaces
pub use storage::StorageInterface;
pub use timer::TimerInterface;
pub use uart::{UartConfig, UartInterface};
