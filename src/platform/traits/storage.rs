//! Byte storage interface trait
//!
//! This module defines the flat byte storage interface used for persistent
//! records. Two media classes implement it with different survival
//! guarantees:
//!
//! - EEPROM class: survives full power loss, at least 512 bytes from
//!   offset 0. Holds the device configuration record.
//! - RTC memory class: survives a sleep-triggered reset only, same
//!   capacity class. Holds the session record. Multiple record types must
//!   be placed at disjoint offsets by the caller.
//!
//! Unlike raw flash there is no erase/block model: both media are
//! byte-writable and a write is applied as one contiguous operation.

use crate::platform::Result;

/// Byte storage interface trait
///
/// # Safety Invariants
///
/// - Only one owner per storage instance (single writer, no locking)
/// - A write must be allowed to complete before the process can be
///   interrupted by sleep or reset; there is no partial-write recovery
pub trait StorageInterface {
    /// Read `buf.len()` bytes starting at `offset`
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Storage(StorageError::OutOfRange)` if the
    /// range exceeds the medium capacity.
    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<()>;

    /// Write `data` starting at `offset` as one contiguous operation
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Storage(StorageError::OutOfRange)` if the
    /// range exceeds the medium capacity.
    fn write(&mut self, offset: u32, data: &[u8]) -> Result<()>;

    /// Total medium capacity in bytes
    fn capacity(&self) -> u32;
}
