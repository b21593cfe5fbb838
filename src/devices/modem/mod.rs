//! Radio modem driver
//!
//! Driver for the Sigfox-class radio modem behind a half-duplex 9600-baud
//! serial link. Split in two layers:
//!
//! - [`transport`]: the line channel - paced writes, timeout-bounded line
//!   reads, break-signal wake, error-line classification.
//! - [`driver`]: the command vocabulary, response shape validation and the
//!   bounded retry wrapper.

pub mod driver;
pub mod transport;

pub use driver::{ModemDriver, ProtocolError, SendStatus};
pub use transport::{LineTransport, TransportError, LINE_CAPACITY};
