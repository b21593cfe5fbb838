//! Platform error types
//!
//! This module defines error types for platform operations.

use core::fmt;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
///
/// All platform implementations map their HAL-specific errors to these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlatformError {
    /// UART operation failed
    Uart(UartError),
    /// Byte storage operation failed
    Storage(StorageError),
    /// Timer operation failed
    Timer(TimerError),
    /// Platform initialization failed
    InitializationFailed,
    /// Invalid configuration provided
    InvalidConfig,
}

/// UART-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartError {
    /// Write operation failed
    WriteFailed,
    /// Read operation failed
    ReadFailed,
    /// Invalid baud rate
    InvalidBaudRate,
    /// Break condition could not be driven
    BreakFailed,
}

/// Storage-specific errors
///
/// Covers both the power-loss-surviving medium (EEPROM class) and the
/// sleep-retained medium (RTC memory class).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Access outside the medium capacity
    OutOfRange,
    /// Write operation failed
    WriteFailed,
    /// Read operation failed
    ReadFailed,
}

/// Timer-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerError {
    /// Invalid duration
    InvalidDuration,
}

impl From<UartError> for PlatformError {
    fn from(e: UartError) -> Self {
        PlatformError::Uart(e)
    }
}

impl From<StorageError> for PlatformError {
    fn from(e: StorageError) -> Self {
        PlatformError::Storage(e)
    }
}

impl From<TimerError> for PlatformError {
    fn from(e: TimerError) -> Self {
        PlatformError::Timer(e)
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Uart(e) => write!(f, "UART error: {:?}", e),
            PlatformError::Storage(e) => write!(f, "storage error: {:?}", e),
            PlatformError::Timer(e) => write!(f, "timer error: {:?}", e),
            PlatformError::InitializationFailed => write!(f, "platform initialization failed"),
            PlatformError::InvalidConfig => write!(f, "invalid configuration"),
        }
    }
}
