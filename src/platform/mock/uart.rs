//! Mock UART implementation for testing

use crate::platform::{
    traits::{UartConfig, UartInterface},
    Result,
};
use core::cell::RefCell;
use std::vec::Vec;

/// Mock UART implementation
///
/// Provides in-memory buffers for transmit and receive data, records break
/// pulses, and allows unit tests to verify serial traffic without hardware.
///
/// # Example
///
/// ```ignore
/// let mut uart = MockUart::new(Default::default());
///
/// uart.write(b"AT\r").unwrap();
/// assert_eq!(uart.tx_buffer(), b"AT\r");
///
/// uart.inject_rx_data(b"OK\r\n");
/// let mut buf = [0u8; 4];
/// uart.read(&mut buf).unwrap();
/// ```
#[derive(Debug)]
pub struct MockUart {
    config: UartConfig,
    tx_buffer: RefCell<Vec<u8>>,
    rx_buffer: RefCell<Vec<u8>>,
    break_events: RefCell<Vec<bool>>,
    write_calls: RefCell<usize>,
    tx_flushes: RefCell<usize>,
}

impl MockUart {
    /// Create a new mock UART
    pub fn new(config: UartConfig) -> Self {
        Self {
            config,
            tx_buffer: RefCell::new(Vec::new()),
            rx_buffer: RefCell::new(Vec::new()),
            break_events: RefCell::new(Vec::new()),
            write_calls: RefCell::new(0),
            tx_flushes: RefCell::new(0),
        }
    }

    /// Get transmitted data (for test verification)
    pub fn tx_buffer(&self) -> Vec<u8> {
        self.tx_buffer.borrow().clone()
    }

    /// Clear transmit buffer
    pub fn clear_tx_buffer(&mut self) {
        self.tx_buffer.borrow_mut().clear();
        *self.write_calls.borrow_mut() = 0;
    }

    /// Inject receive data (for test setup)
    pub fn inject_rx_data(&mut self, data: &[u8]) {
        self.rx_buffer.borrow_mut().extend_from_slice(data);
    }

    /// Number of `write` calls observed
    pub fn write_calls(&self) -> usize {
        *self.write_calls.borrow()
    }

    /// Number of transmit flushes observed
    pub fn tx_flushes(&self) -> usize {
        *self.tx_flushes.borrow()
    }

    /// Sequence of break assert/release events (for wake verification)
    pub fn break_events(&self) -> Vec<bool> {
        self.break_events.borrow().clone()
    }

    /// Get current baud rate
    pub fn baud_rate(&self) -> u32 {
        self.config.baud_rate
    }
}

impl UartInterface for MockUart {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        *self.write_calls.borrow_mut() += 1;
        self.tx_buffer.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut rx = self.rx_buffer.borrow_mut();
        let to_read = core::cmp::min(buffer.len(), rx.len());

        buffer[..to_read].copy_from_slice(&rx[..to_read]);
        rx.drain(..to_read);

        Ok(to_read)
    }

    fn set_baud_rate(&mut self, baud: u32) -> Result<()> {
        self.config.baud_rate = baud;
        Ok(())
    }

    fn available(&self) -> bool {
        !self.rx_buffer.borrow().is_empty()
    }

    fn set_break(&mut self, enabled: bool) -> Result<()> {
        self.break_events.borrow_mut().push(enabled);
        Ok(())
    }

    fn flush_tx(&mut self) -> Result<()> {
        *self.tx_flushes.borrow_mut() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_uart_write() {
        let mut uart = MockUart::new(UartConfig::default());
        let written = uart.write(b"AT$P=1\r").unwrap();
        assert_eq!(written, 7);
        assert_eq!(uart.tx_buffer(), b"AT$P=1\r");
        assert_eq!(uart.write_calls(), 1);
    }

    #[test]
    fn test_mock_uart_read() {
        let mut uart = MockUart::new(UartConfig::default());
        uart.inject_rx_data(b"OK\r\n");

        assert!(uart.available());
        let mut buf = [0u8; 4];
        let read = uart.read(&mut buf).unwrap();
        assert_eq!(read, 4);
        assert_eq!(&buf, b"OK\r\n");
        assert!(!uart.available());
    }

    #[test]
    fn test_mock_uart_read_empty() {
        let mut uart = MockUart::new(UartConfig::default());
        let mut buf = [0u8; 4];
        assert_eq!(uart.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_mock_uart_break_events() {
        let mut uart = MockUart::new(UartConfig::default());
        uart.set_break(true).unwrap();
        uart.set_break(false).unwrap();
        assert_eq!(uart.break_events(), vec![true, false]);
    }

    #[test]
    fn test_mock_uart_baud_rate() {
        let mut uart = MockUart::new(UartConfig::default());
        uart.set_baud_rate(9600).unwrap();
        assert_eq!(uart.baud_rate(), 9600);
    }
}
