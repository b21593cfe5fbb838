//! Logging abstraction
//!
//! Two pieces, both diagnostics-only and never control flow:
//!
//! - [`Logger`]: a leveled engine gated by a 16-bit configuration mask and
//!   writing through a [`LogSink`] seam. The mask is the value persisted in
//!   the device configuration record: one nibble per sink (file, software
//!   serial, serial1, serial0), one bit per level within each nibble.
//! - `log_*!` macros for in-driver diagnostics that route to `defmt` on
//!   embedded targets, `println!` in host tests, and nothing otherwise.

use core::fmt;

use heapless::String;

/// Formatted log line capacity
pub const LOG_LINE_CAPACITY: usize = 256;

/// Sink selection masks, one nibble each
pub const LOG_SINK_FILE_MASK: u16 = 0xF000;
pub const LOG_SINK_SSERIAL_MASK: u16 = 0x0F00;
pub const LOG_SINK_SERIAL1_MASK: u16 = 0x00F0;
pub const LOG_SINK_SERIAL_MASK: u16 = 0x000F;

/// Level selection masks, one bit in every sink nibble
pub const LOG_LEVEL_DEBUG_MASK: u16 = 0x8888;
pub const LOG_LEVEL_INFO_MASK: u16 = 0x4444;
pub const LOG_LEVEL_WARN_MASK: u16 = 0x2222;
pub const LOG_LEVEL_ERROR_MASK: u16 = 0x1111;

/// Factory default: all levels on file and serial0, plus serial1
pub const DEFAULT_LOG_CONFIG: u16 = 0xF0FF;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    /// Unconditional, emitted whenever any sink is enabled
    Any,
}

impl LogLevel {
    fn mask(self) -> u16 {
        match self {
            LogLevel::Error => LOG_LEVEL_ERROR_MASK,
            LogLevel::Warn => LOG_LEVEL_WARN_MASK,
            LogLevel::Info => LOG_LEVEL_INFO_MASK,
            LogLevel::Debug => LOG_LEVEL_DEBUG_MASK,
            LogLevel::Any => 0xFFFF,
        }
    }
}

/// Destination for formatted log lines
///
/// Sinks receive a level and a pre-formatted line. They must not influence
/// control flow; a sink failure is silently dropped.
pub trait LogSink {
    fn write_line(&mut self, level: LogLevel, line: &str);
}

/// Leveled logger with per-sink/per-level bitmask gating
///
/// ```ignore
/// let mut log = Logger::new(BufferSink::new());
/// log.init(DEFAULT_LOG_CONFIG);
/// log.info(format_args!("time is {}:{:02}", hour, min));
/// ```
pub struct Logger<S: LogSink> {
    sink: S,
    mask: u16,
    ready: bool,
}

impl<S: LogSink> Logger<S> {
    /// Create a logger with everything gated off until `init`
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            mask: 0,
            ready: false,
        }
    }

    /// Apply the configuration mask, normally `config.log_config`
    pub fn init(&mut self, mask: u16) {
        self.mask = mask;
        self.ready = true;
    }

    /// Whether a level passes the configuration mask on at least one sink
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.ready && self.mask & level.mask() != 0
    }

    /// Format and emit one line at `level`
    pub fn log(&mut self, level: LogLevel, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        let mut line: String<LOG_LINE_CAPACITY> = String::new();
        // Overlong lines are truncated at capacity, never dropped
        let _ = fmt::write(&mut line, args);
        self.sink.write_line(level, line.as_str());
    }

    pub fn error(&mut self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Error, args);
    }

    pub fn warn(&mut self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Warn, args);
    }

    pub fn info(&mut self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Info, args);
    }

    pub fn debug(&mut self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Debug, args);
    }

    pub fn any(&mut self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Any, args);
    }

    /// Sink reference (for testing)
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

/// In-memory sink collecting formatted lines
///
/// Used by host tests for assertions; small enough to double as a
/// diagnostic ring on targets without a console.
#[derive(Debug, Default)]
pub struct BufferSink {
    lines: heapless::Vec<(LogLevel, String<LOG_LINE_CAPACITY>), 16>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[(LogLevel, String<LOG_LINE_CAPACITY>)] {
        &self.lines
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl LogSink for BufferSink {
    fn write_line(&mut self, level: LogLevel, line: &str) {
        let mut owned: String<LOG_LINE_CAPACITY> = String::new();
        let _ = owned.push_str(line);
        // Oldest line is dropped when the ring is full
        if self.lines.is_full() {
            self.lines.remove(0);
        }
        let _ = self.lines.push((level, owned));
    }
}

/// Sink routing through defmt on embedded targets
#[cfg(feature = "defmt")]
#[derive(Debug, Default)]
pub struct DefmtSink;

#[cfg(feature = "defmt")]
impl LogSink for DefmtSink {
    fn write_line(&mut self, level: LogLevel, line: &str) {
        match level {
            LogLevel::Error => defmt::error!("{=str}", line),
            LogLevel::Warn => defmt::warn!("{=str}", line),
            LogLevel::Info | LogLevel::Any => defmt::info!("{=str}", line),
            LogLevel::Debug => defmt::debug!("{=str}", line),
        }
    }
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::error!($($arg)*);

        #[cfg(all(not(feature = "defmt"), test))]
        eprintln!("[ERROR] {}", format!($($arg)*));

        #[cfg(all(not(feature = "defmt"), not(test)))]
        { let _ = ($($arg)*,); }
    }};
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($($arg)*);

        #[cfg(all(not(feature = "defmt"), test))]
        println!("[WARN] {}", format!($($arg)*));

        #[cfg(all(not(feature = "defmt"), not(test)))]
        { let _ = ($($arg)*,); }
    }};
}

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::info!($($arg)*);

        #[cfg(all(not(feature = "defmt"), test))]
        println!("[INFO] {}", format!($($arg)*));

        #[cfg(all(not(feature = "defmt"), not(test)))]
        { let _ = ($($arg)*,); }
    }};
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($($arg)*);

        #[cfg(all(not(feature = "defmt"), test))]
        println!("[DEBUG] {}", format!($($arg)*));

        #[cfg(all(not(feature = "defmt"), not(test)))]
        { let _ = ($($arg)*,); }
    }};
}

/// Log unconditional message
#[macro_export]
macro_rules! log_any {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::info!($($arg)*);

        #[cfg(all(not(feature = "defmt"), test))]
        println!($($arg)*);

        #[cfg(all(not(feature = "defmt"), not(test)))]
        { let _ = ($($arg)*,); }
    }};
}
