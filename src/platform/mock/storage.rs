//! Mock byte storage implementation for testing
//!
//! Provides in-memory storage simulation for unit tests. Stands in for
//! both the EEPROM-class and the RTC-memory-class medium.

use crate::platform::{error::StorageError, traits::StorageInterface, Result};
use core::cell::RefCell;
use std::vec::Vec;

/// Default mock capacity, matching the smallest supported medium (512 B)
pub const DEFAULT_CAPACITY: u32 = 512;

/// Mock byte storage implementation
///
/// Simulates a flat byte medium in memory. Supports:
/// - Read/write operations
/// - Corruption injection for testing error handling
/// - Write count tracking
#[derive(Debug)]
pub struct MockStorage {
    storage: RefCell<Vec<u8>>,
    write_count: RefCell<u32>,
}

impl MockStorage {
    /// Create a new mock storage instance of the default 512-byte capacity
    ///
    /// Contents start zeroed, modelling a factory-fresh part.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new mock storage instance with an explicit capacity
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            storage: RefCell::new(vec![0u8; capacity as usize]),
            write_count: RefCell::new(0),
        }
    }

    /// Get storage contents (for test verification)
    pub fn get_contents(&self, offset: u32, len: usize) -> Vec<u8> {
        let storage = self.storage.borrow();
        storage[offset as usize..(offset as usize + len)].to_vec()
    }

    /// Inject corruption at offset (for testing error recovery)
    pub fn inject_corruption(&mut self, offset: u32, len: usize) {
        let mut storage = self.storage.borrow_mut();
        for i in 0..len {
            storage[offset as usize + i] ^= 0xAA;
        }
    }

    /// Flip a single bit (for CRC sensitivity testing)
    pub fn flip_bit(&mut self, offset: u32, bit: u8) {
        let mut storage = self.storage.borrow_mut();
        storage[offset as usize] ^= 1 << bit;
    }

    /// Number of write operations performed
    pub fn write_count(&self) -> u32 {
        *self.write_count.borrow()
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageInterface for MockStorage {
    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<()> {
        let storage = self.storage.borrow();
        let end = offset as usize + buf.len();
        if end > storage.len() {
            return Err(StorageError::OutOfRange.into());
        }
        buf.copy_from_slice(&storage[offset as usize..end]);
        Ok(())
    }

    fn write(&mut self, offset: u32, data: &[u8]) -> Result<()> {
        let mut storage = self.storage.borrow_mut();
        let end = offset as usize + data.len();
        if end > storage.len() {
            return Err(StorageError::OutOfRange.into());
        }
        storage[offset as usize..end].copy_from_slice(data);
        *self.write_count.borrow_mut() += 1;
        Ok(())
    }

    fn capacity(&self) -> u32 {
        self.storage.borrow().len() as u32
    }
}
