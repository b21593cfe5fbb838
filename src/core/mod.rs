//! Core firmware services
//!
//! Cross-cutting services shared by the drivers and the orchestrator:
//! checksum, persistent record store, configuration, session state and
//! logging.

pub mod config;
pub mod crc;
pub mod logging;
pub mod record;
pub mod session;
