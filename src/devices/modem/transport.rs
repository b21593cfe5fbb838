//! Half-duplex line transport to the radio modem
//!
//! One command line out, one response line back, strictly alternating.
//! The modem is timing-sensitive: command characters must be paced apart
//! (a large inter-character gap reads as a line break and wakes or
//! confuses the device), and responses are polled against a strict
//! millisecond budget so a misbehaving modem can never hang the single
//! sequential control thread.

use heapless::String;

use crate::log_debug;
use crate::platform::{PlatformError, TimerInterface, UartInterface};

/// Fixed modem link baud rate
pub const MODEM_BAUD: u32 = 9600;

/// Response line buffer capacity
pub const LINE_CAPACITY: usize = 128;

/// Pacing delay between command characters
const CHAR_PACING_MS: u32 = 100;

/// Settle time after fixing the baud rate on open
const OPEN_SETTLE_MS: u32 = 10;

/// Break duration driving the modem's wake
const WAKE_BREAK_MS: u32 = 5;

/// Settle time after releasing the wake break
const WAKE_SETTLE_MS: u32 = 20;

/// Prefix the modem uses to report a command failure
const ERROR_PREFIX: &str = "ERROR:";

/// Transport failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// No complete line within the millisecond budget, or the line buffer
    /// filled before a terminator arrived
    Timeout,
    /// The modem reported an error line; carries the full line
    ModemError(String<LINE_CAPACITY>),
    /// The underlying platform failed
    Platform(PlatformError),
}

impl From<PlatformError> for TransportError {
    fn from(e: PlatformError) -> Self {
        TransportError::Platform(e)
    }
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TransportError::Timeout => write!(f, "modem response timeout"),
            TransportError::ModemError(line) => write!(f, "modem error line: {}", line),
            TransportError::Platform(e) => write!(f, "transport platform failure: {}", e),
        }
    }
}

/// Line-oriented serial channel to the modem
///
/// Owns the UART and the timer; single owner, one command outstanding at
/// a time. Callers requiring concurrency must serialize externally.
pub struct LineTransport<U: UartInterface, T: TimerInterface> {
    uart: U,
    timer: T,
    ready: bool,
}

impl<U: UartInterface, T: TimerInterface> LineTransport<U, T> {
    pub fn new(uart: U, timer: T) -> Self {
        Self {
            uart,
            timer,
            ready: false,
        }
    }

    /// Open the channel; idempotent
    ///
    /// The first call fixes the baud rate and drains stale input.
    pub fn open(&mut self) -> Result<(), TransportError> {
        if !self.ready {
            self.uart.set_baud_rate(MODEM_BAUD)?;
            self.timer.delay_ms(OPEN_SETTLE_MS)?;
            self.flush()?;
            self.ready = true;
        }
        Ok(())
    }

    /// Transmit one command line
    ///
    /// All characters but the last are paced 100 ms apart after a transmit
    /// flush; the final character goes out immediately, unpaced. No
    /// terminator is appended - the command text carries its own.
    pub fn write_line(&mut self, command: &str) -> Result<(), TransportError> {
        self.open()?;
        let bytes = command.as_bytes();
        if bytes.len() > 1 {
            for &b in &bytes[..bytes.len() - 1] {
                self.uart.write(&[b])?;
                self.uart.flush_tx()?;
                self.timer.delay_ms(CHAR_PACING_MS)?;
            }
            self.uart.write(&bytes[bytes.len() - 1..])?;
        } else {
            self.uart.write(bytes)?;
        }
        Ok(())
    }

    /// Read one response line within a strict millisecond budget
    ///
    /// Polls in 1 ms steps, decrementing the budget while no byte is
    /// pending; once the budget is exhausted the read fails `Timeout` even
    /// if a byte would still arrive. A line is complete at `\n`; carriage
    /// returns and newlines are stripped unless `keep_terminators`. At
    /// most `max_bytes` (capped at [`LINE_CAPACITY`]) are captured -
    /// filling the buffer before the terminator is a failure, never a
    /// silent truncation. A completed line starting with `ERROR:` fails
    /// `ModemError`; the transport classifies modem errors, not each
    /// caller.
    pub fn read_line(
        &mut self,
        max_bytes: usize,
        timeout_ms: u32,
        keep_terminators: bool,
    ) -> Result<String<LINE_CAPACITY>, TransportError> {
        let cap = max_bytes.min(LINE_CAPACITY);
        let mut line: String<LINE_CAPACITY> = String::new();
        let mut budget = timeout_ms;

        loop {
            while !self.uart.available() && budget > 0 {
                self.timer.delay_ms(1)?;
                budget -= 1;
            }
            if budget == 0 {
                return Err(TransportError::Timeout);
            }

            let mut terminated = false;
            while self.uart.available() {
                let mut byte = [0u8; 1];
                if self.uart.read(&mut byte)? == 0 {
                    break;
                }
                let c = byte[0];
                if keep_terminators || (c != b'\r' && c != b'\n') {
                    if line.len() >= cap || line.push(c as char).is_err() {
                        return Err(TransportError::Timeout);
                    }
                }
                if c == b'\n' {
                    terminated = true;
                    break;
                }
            }

            if terminated {
                if line.as_str().starts_with(ERROR_PREFIX) {
                    log_debug!("modem serial err");
                    return Err(TransportError::ModemError(line));
                }
                return Ok(line);
            }
        }
    }

    /// Wake the modem with a transmit break
    ///
    /// Holds the line in break ~5 ms, releases, settles ~20 ms, then
    /// flushes the transient bytes the wake produces.
    pub fn wake(&mut self) -> Result<(), TransportError> {
        self.open()?;
        self.uart.set_break(true)?;
        self.timer.delay_ms(WAKE_BREAK_MS)?;
        self.uart.set_break(false)?;
        self.timer.delay_ms(WAKE_SETTLE_MS)?;
        self.flush()
    }

    /// Discard all buffered unread input
    pub fn flush(&mut self) -> Result<(), TransportError> {
        let mut sink = [0u8; 16];
        while self.uart.available() {
            if self.uart.read(&mut sink)? == 0 {
                break;
            }
        }
        Ok(())
    }

    /// Block the control flow for `ms` milliseconds
    pub fn pause(&mut self, ms: u32) -> Result<(), TransportError> {
        self.timer.delay_ms(ms)?;
        Ok(())
    }

    /// UART reference (for testing)
    pub fn uart_mut(&mut self) -> &mut U {
        &mut self.uart
    }

    /// Timer reference (for testing)
    pub fn timer(&self) -> &T {
        &self.timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{MockTimer, MockUart};

    fn transport() -> LineTransport<MockUart, MockTimer> {
        LineTransport::new(MockUart::new(Default::default()), MockTimer::new())
    }

    #[test]
    fn test_open_sets_baud_and_drains_once() {
        let mut t = transport();
        t.uart_mut().inject_rx_data(b"stale noise");

        t.open().unwrap();
        assert_eq!(t.uart_mut().baud_rate(), MODEM_BAUD);
        assert!(!t.uart_mut().available());

        // Second open is a no-op and must not drain fresh input
        t.uart_mut().inject_rx_data(b"OK\r\n");
        t.open().unwrap();
        assert!(t.uart_mut().available());
    }

    #[test]
    fn test_write_line_paces_all_but_last_char() {
        let mut t = transport();
        t.open().unwrap();
        let start = t.timer().now_ms();

        t.write_line("AT\r").unwrap();
        assert_eq!(t.uart_mut().tx_buffer(), b"AT\r");
        // Two paced characters, final one unpaced
        assert_eq!(t.timer().now_ms() - start, 200);
        assert_eq!(t.uart_mut().tx_flushes(), 2);
    }

    #[test]
    fn test_write_line_single_char_unpaced() {
        let mut t = transport();
        t.open().unwrap();
        let start = t.timer().now_ms();

        t.write_line("\r").unwrap();
        assert_eq!(t.uart_mut().tx_buffer(), b"\r");
        assert_eq!(t.timer().now_ms() - start, 0);
    }

    #[test]
    fn test_read_line_strips_terminators() {
        let mut t = transport();
        t.open().unwrap();
        t.uart_mut().inject_rx_data(b"OK\r\n");

        let line = t.read_line(LINE_CAPACITY, 50, false).unwrap();
        assert_eq!(line.as_str(), "OK");
    }

    #[test]
    fn test_read_line_keeps_terminators_on_request() {
        let mut t = transport();
        t.open().unwrap();
        t.uart_mut().inject_rx_data(b"OK\r\n");

        let line = t.read_line(LINE_CAPACITY, 50, true).unwrap();
        assert_eq!(line.as_str(), "OK\r\n");
    }

    #[test]
    fn test_read_line_timeout_consumes_exact_budget() {
        let mut t = transport();
        t.open().unwrap();
        let start = t.timer().now_ms();

        assert_eq!(
            t.read_line(LINE_CAPACITY, 50, false),
            Err(TransportError::Timeout)
        );
        assert_eq!(t.timer().now_ms() - start, 50);
    }

    #[test]
    fn test_read_line_zero_budget_times_out() {
        let mut t = transport();
        t.open().unwrap();
        t.uart_mut().inject_rx_data(b"OK\r\n");

        // A pending byte after budget exhaustion is still a timeout
        assert_eq!(
            t.read_line(LINE_CAPACITY, 0, false),
            Err(TransportError::Timeout)
        );
    }

    #[test]
    fn test_error_prefix_classified_regardless_of_suffix() {
        for reply in [&b"ERROR:1\r\n"[..], b"ERROR:parity\r\n", b"ERROR:\r\n"] {
            let mut t = transport();
            t.open().unwrap();
            t.uart_mut().inject_rx_data(reply);

            match t.read_line(LINE_CAPACITY, 50, false) {
                Err(TransportError::ModemError(line)) => {
                    assert!(line.as_str().starts_with("ERROR:"))
                }
                other => panic!("expected ModemError, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_capacity_exhaustion_is_failure() {
        let mut t = transport();
        t.open().unwrap();
        t.uart_mut().inject_rx_data(b"0123456789ABCDEF\r\n");

        assert_eq!(t.read_line(8, 50, false), Err(TransportError::Timeout));
    }

    #[test]
    fn test_wake_pulses_break_and_flushes() {
        let mut t = transport();
        t.open().unwrap();
        t.uart_mut().inject_rx_data(b"\xFF\xFE");
        let start = t.timer().now_ms();

        t.wake().unwrap();
        assert_eq!(t.uart_mut().break_events(), vec![true, false]);
        assert_eq!(t.timer().now_ms() - start, 25);
        assert!(!t.uart_mut().available());
    }

    #[test]
    fn test_flush_discards_pending_input() {
        let mut t = transport();
        t.open().unwrap();
        t.uart_mut().inject_rx_data(b"half a li");
        t.flush().unwrap();
        assert!(!t.uart_mut().available());
    }
}
