#![cfg_attr(not(any(test, feature = "mock")), no_std)]

//! trail_beacon - firmware core for a battery powered location tracker
//!
//! The tracker wakes periodically, locates itself from nearby access points
//! and reports a short frame over a Sigfox-class radio modem, then returns
//! to deep sleep. This crate provides the parts that must survive that
//! regime: power-cycle-resilient persistent record stores for configuration
//! and session state, and the line-oriented command/response driver for the
//! radio modem with its wake/sleep sequencing and retry discipline.
//!
//! Access-point scanning, the boot/execute orchestration loop and console
//! command dispatch live outside this crate and consume these modules
//! through owned instances.

// Platform abstraction layer (UART, byte storage, timer)
pub mod platform;

// Cross-cutting firmware services (CRC, records, config, session, logging)
pub mod core;

// Device drivers built on platform abstraction
pub mod devices;

// Common helper libraries
pub mod libraries;

// Note: Logging macros (log_error!, log_warn!, log_info!, log_debug!,
// log_any!) are exported at crate root via #[macro_export] in core::logging
