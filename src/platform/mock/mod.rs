//! Mock platform implementation for testing
//!
//! This module provides mock implementations of platform traits that can be
//! used for unit testing without requiring actual hardware.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled

#![cfg(any(test, feature = "mock"))]

mod storage;
mod timer;
mod uart;

pub use storage::MockStorage;
pub use timer::MockTimer;
pub use uart::MockUart;
