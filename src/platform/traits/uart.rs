//! UART interface trait
//!
//! This module defines the serial interface that platform implementations
//! must provide for the half-duplex link to the radio modem.

use crate::platform::Result;

/// UART configuration
#[derive(Debug, Clone, Copy)]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baud_rate: u32,
    /// Data bits (typically 8)
    pub data_bits: u8,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            data_bits: 8,
        }
    }
}

/// UART interface trait
///
/// Platform implementations must provide this interface for serial
/// communication.
///
/// # Safety Invariants
///
/// - UART peripheral must be initialized before use
/// - Only one owner per UART peripheral instance
/// - No concurrent access to the same UART from multiple contexts
pub trait UartInterface {
    /// Write data to UART
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Uart` if the write operation fails.
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Read data from UART without blocking
    ///
    /// Reads up to `buffer.len()` bytes into the provided buffer.
    /// Returns the number of bytes actually read, zero when the receive
    /// buffer is empty.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Uart` if the read operation fails.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Set UART baud rate
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Uart(UartError::InvalidBaudRate)` if the baud
    /// rate cannot be achieved with the current clock configuration.
    fn set_baud_rate(&mut self, baud: u32) -> Result<()>;

    /// Check if data is available to read
    ///
    /// Returns `true` if at least one byte can be read without blocking.
    fn available(&self) -> bool;

    /// Drive the transmit line into or out of the break condition
    ///
    /// While the break is asserted the line is held low longer than a
    /// character frame. The modem uses this as its wake signal.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Uart(UartError::BreakFailed)` if the line
    /// cannot be driven.
    fn set_break(&mut self, enabled: bool) -> Result<()>;

    /// Flush transmit buffer
    ///
    /// Blocks until all pending transmit data has been sent.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Uart` if the flush operation fails.
    fn flush_tx(&mut self) -> Result<()>;
}
