//! Radio modem protocol driver
//!
//! Implements the modem's AT command vocabulary on top of the line
//! transport. Every operation follows the same pattern: ensure the
//! channel is open, send one command line, read one response with an
//! operation-tuned timeout, classify. The driver holds no sleep/awake
//! state - callers pair every `wake_up` with an eventual `sleep_mode`,
//! and every call is independently retryable after a failure.

use heapless::String;

use crate::devices::modem::transport::{LineTransport, TransportError, LINE_CAPACITY};
use crate::libraries::hex;
use crate::platform::{TimerInterface, UartInterface};
use crate::{log_debug, log_info, log_warn};

/// Response wait for short register operations
pub const WAIT_STD_MS: u32 = 50;

/// Response wait for an uplink transmission
pub const WAIT_UPLINK_MS: u32 = 12_000;

/// Maximum uplink frame length accepted by the modem
pub const MAX_FRAME_BYTES: usize = 12;

/// Settle time after a device reset command
const RESET_SETTLE_MS: u32 = 1_000;

/// Backoff between retry attempts
const RETRY_BACKOFF_MS: u32 = 10;

const CMD_RESET: &str = "AT$P=0\r";
// A trailing LF here is acknowledged by the modem but the sleep mode is
// not entered; the command must end with CR alone.
const CMD_SLEEP: &str = "AT$P=1\r";
const CMD_GET_ID: &str = "AT$I=10\r";
const CMD_GET_PAK: &str = "AT$I=11\r";
const CMD_GET_TEMPERATURE: &str = "AT$T?\r";
const CMD_GET_VOLTAGE: &str = "AT$V?\r";

/// Uplink transmission outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendStatus {
    /// Frame transmitted
    Ok,
    /// Frame not transmitted
    Ko,
    /// Frame transmitted, no downlink response (reserved)
    NoDownlink,
    /// Frame transmitted, downlink response received (reserved)
    Downlink,
    /// Downlink was requested but is not implemented
    NotImplemented,
}

/// Protocol-level failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Response did not match the expected shape; no value is guessed
    MalformedResponse,
    /// The transport failed underneath
    Transport(TransportError),
}

impl From<TransportError> for ProtocolError {
    fn from(e: TransportError) -> Self {
        ProtocolError::Transport(e)
    }
}

impl core::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProtocolError::MalformedResponse => write!(f, "malformed modem response"),
            ProtocolError::Transport(e) => write!(f, "modem transport failure: {}", e),
        }
    }
}

/// Radio modem protocol driver
///
/// ```ignore
/// let mut modem = ModemDriver::new(uart, timer);
/// modem.wake_up()?;
/// let id = modem.with_retry(3, |m| m.get_identifier())?;
/// modem.send_raw(&frame, false);
/// modem.sleep_mode();
/// ```
pub struct ModemDriver<U: UartInterface, T: TimerInterface> {
    transport: LineTransport<U, T>,
}

impl<U: UartInterface, T: TimerInterface> ModemDriver<U, T> {
    pub fn new(uart: U, timer: T) -> Self {
        Self {
            transport: LineTransport::new(uart, timer),
        }
    }

    /// Send one command and read its response line
    fn command(&mut self, cmd: &str, timeout_ms: u32) -> Result<String<LINE_CAPACITY>, TransportError> {
        self.transport.write_line(cmd)?;
        self.transport.read_line(LINE_CAPACITY, timeout_ms, false)
    }

    /// Reset the modem; best-effort, always succeeds
    ///
    /// Sends the reset command, waits a fixed settle time and drains
    /// whatever the device printed while restarting.
    pub fn reset(&mut self) {
        log_info!("modem reset");
        let _ = self.transport.write_line(CMD_RESET);
        let _ = self.transport.pause(RESET_SETTLE_MS);
        let _ = self.transport.flush();
    }

    /// Request sleep mode; true iff the modem acknowledged with `OK`
    ///
    /// Anything else, a timeout included, is a failure the caller may log
    /// and ignore - a modem left awake costs power, not correctness.
    pub fn sleep_mode(&mut self) -> bool {
        log_info!("modem sleep requested");
        match self.command(CMD_SLEEP, WAIT_STD_MS) {
            Ok(line) if line.as_str() == "OK" => true,
            Ok(_) => {
                log_debug!("modem sleep request not applied");
                false
            }
            Err(_) => false,
        }
    }

    /// Wake the modem with a transmit break and flush the transient bytes
    ///
    /// Must precede any command issued after a prior `sleep_mode`.
    pub fn wake_up(&mut self) -> Result<(), TransportError> {
        log_info!("modem waking up");
        self.transport.wake()
    }

    /// Transmit an uplink frame
    ///
    /// Frames longer than 12 bytes are rejected with `Ko` before any
    /// transport write. Only an exact `OK` within the uplink wait yields
    /// `Ok`. Downlink requests are surfaced as `NotImplemented`, not
    /// silently dropped.
    pub fn send_raw(&mut self, frame: &[u8], with_downlink: bool) -> SendStatus {
        if frame.len() > MAX_FRAME_BYTES {
            return SendStatus::Ko;
        }
        if with_downlink {
            log_warn!("modem downlink support not implemented");
            return SendStatus::NotImplemented;
        }

        let encoded = match hex::encode_upper::<{ 2 * MAX_FRAME_BYTES }>(frame) {
            Some(encoded) => encoded,
            None => return SendStatus::Ko,
        };
        let mut cmd: String<{ LINE_CAPACITY }> = String::new();
        if cmd.push_str("AT$SF=").is_err()
            || cmd.push_str(encoded.as_str()).is_err()
            || cmd.push('\r').is_err()
        {
            return SendStatus::Ko;
        }

        match self.command(cmd.as_str(), WAIT_UPLINK_MS) {
            Ok(line) if line.as_str() == "OK" => SendStatus::Ok,
            Ok(_) => {
                log_warn!("modem uplink returned an invalid response");
                SendStatus::Ko
            }
            Err(_) => {
                log_warn!("modem uplink did not return a response");
                SendStatus::Ko
            }
        }
    }

    /// Query the 32-bit radio identifier
    ///
    /// The response must be exactly 8 hex digits; anything else is an
    /// error, never a silently wrong identifier.
    pub fn get_identifier(&mut self) -> Result<u32, ProtocolError> {
        let line = self.command(CMD_GET_ID, WAIT_STD_MS)?;
        match hex::parse_hex_u32(line.as_str()) {
            Some(id) => Ok(id),
            None => {
                log_warn!("invalid identifier response from modem");
                Err(ProtocolError::MalformedResponse)
            }
        }
    }

    /// Query the authentication token (PAK)
    ///
    /// The response must be exactly 16 uppercase hex digits.
    pub fn get_pak(&mut self) -> Result<String<32>, ProtocolError> {
        let line = self.command(CMD_GET_PAK, WAIT_STD_MS)?;
        if line.len() != 16 || !hex::is_hex_str(line.as_str(), true) {
            log_warn!("invalid PAK response from modem");
            return Err(ProtocolError::MalformedResponse);
        }
        let mut pak: String<32> = String::new();
        pak.push_str(line.as_str())
            .map_err(|_| ProtocolError::MalformedResponse)?;
        Ok(pak)
    }

    /// Query the die temperature in tenths of a degree Celsius
    ///
    /// The response must carry at least 4 decimal digits; the first 4 are
    /// parsed. Shorter or malformed responses are an error, never a
    /// best-effort value.
    pub fn get_temperature(&mut self) -> Result<i16, ProtocolError> {
        let line = self.command(CMD_GET_TEMPERATURE, WAIT_STD_MS)?;
        match hex::parse_dec4(line.as_str()) {
            Some(tenths) => Ok(tenths as i16),
            None => Err(ProtocolError::MalformedResponse),
        }
    }

    /// Query the supply voltage in millivolts
    ///
    /// Same response shape rule as `get_temperature`.
    pub fn get_voltage(&mut self) -> Result<u16, ProtocolError> {
        let line = self.command(CMD_GET_VOLTAGE, WAIT_STD_MS)?;
        match hex::parse_dec4(line.as_str()) {
            Some(mv) => Ok(mv),
            None => Err(ProtocolError::MalformedResponse),
        }
    }

    /// Re-invoke `op` up to `max_attempts` times with a fixed 10 ms backoff
    ///
    /// Returns the first success or the last failure. Used where a
    /// transient serial glitch must not corrupt persisted defaults, such
    /// as identifier/PAK retrieval during first-boot provisioning.
    pub fn with_retry<R, F>(&mut self, max_attempts: u32, mut op: F) -> Result<R, ProtocolError>
    where
        F: FnMut(&mut Self) -> Result<R, ProtocolError>,
    {
        let mut attempt = 0;
        loop {
            match op(self) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    attempt += 1;
                    if attempt >= max_attempts {
                        return Err(e);
                    }
                    self.transport.pause(RETRY_BACKOFF_MS)?;
                }
            }
        }
    }

    /// Transport reference (for testing and explicit open)
    pub fn transport_mut(&mut self) -> &mut LineTransport<U, T> {
        &mut self.transport
    }
}
