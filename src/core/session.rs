//! Session state record
//!
//! Runtime state accumulated across deep-sleep cycles, persisted on the
//! RTC-memory-class medium. The medium survives a sleep-triggered reset
//! but not a full power loss, so the orchestrator round-trips this record
//! on every cycle: restore after wake, accumulate, save before sleep.
//!
//! A single session record lives at offset 0; additional record types on
//! the same medium must be placed at disjoint offsets by the caller.

use crate::core::record::{RecordError, RecordPayload, RecordStore};
use crate::log_info;
use crate::platform::StorageInterface;

/// Magic identifying the session record
pub const SESSION_MAGIC: u16 = 0xA5E5;

/// Session record schema version
pub const SESSION_VERSION: u8 = 0x01;

/// Session record offset on the RTC-memory-class medium
pub const SESSION_OFFSET: u32 = 0;

/// Scratch buffer size carried across sleep cycles
pub const SESSION_SCRATCH_BYTES: usize = 128;

/// Session state payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    /// Cumulative awake time since the last cold boot, in milliseconds
    pub total_ms: u64,
    /// Opaque scratch area for the orchestrator
    pub scratch: [u8; SESSION_SCRATCH_BYTES],
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            total_ms: 0,
            scratch: [0u8; SESSION_SCRATCH_BYTES],
        }
    }
}

impl RecordPayload for SessionState {
    const MAGIC: u16 = SESSION_MAGIC;
    const VERSION: u8 = SESSION_VERSION;
    const SIZE: usize = 8 + SESSION_SCRATCH_BYTES;

    fn to_bytes(&self, buf: &mut [u8]) {
        buf[0..8].copy_from_slice(&self.total_ms.to_le_bytes());
        buf[8..].copy_from_slice(&self.scratch);
    }

    fn from_bytes(buf: &[u8]) -> Option<Self> {
        let mut scratch = [0u8; SESSION_SCRATCH_BYTES];
        scratch.copy_from_slice(&buf[8..]);
        Some(Self {
            total_ms: u64::from_le_bytes([
                buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
            ]),
            scratch,
        })
    }
}

/// Session service owning the RTC-memory-class record store
pub struct SessionService<S: StorageInterface> {
    store: RecordStore<SessionState, S>,
    /// Active state, valid after `restore_after_wake`
    pub state: SessionState,
}

impl<S: StorageInterface> SessionService<S> {
    /// Create the service over the sleep-reset-surviving medium
    ///
    /// Fails at construction if the record does not fit the medium.
    pub fn new(storage: S) -> Result<Self, RecordError> {
        Ok(Self {
            store: RecordStore::new(storage, SESSION_OFFSET)?,
            state: SessionState::default(),
        })
    }

    /// Restore the retained state after a wake-up
    ///
    /// Returns `true` when a valid retained copy was restored. A missing
    /// or corrupt copy (first boot, full power loss, bad crc) yields a
    /// fresh zeroed state instead; it must never block boot.
    pub fn restore_after_wake(&mut self) -> bool {
        match self.store.load() {
            Ok(state) => {
                self.state = state;
                true
            }
            Err(_) => {
                log_info!("session state reset");
                self.state = SessionState::default();
                false
            }
        }
    }

    /// Persist the state before entering deep sleep
    ///
    /// Must complete before the sleep request; there is no partial-write
    /// recovery.
    pub fn save_before_sleep(&mut self) -> Result<(), RecordError> {
        self.store.store(&self.state)
    }

    /// Account awake time into the cumulative counter
    pub fn add_elapsed(&mut self, elapsed_ms: u64) {
        self.state.total_ms = self.state.total_ms.wrapping_add(elapsed_ms);
    }

    /// Record store reference (for testing)
    pub fn store_mut(&mut self) -> &mut RecordStore<SessionState, S> {
        &mut self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockStorage;

    #[test]
    fn test_sleep_wake_round_trip() {
        let mut session = SessionService::new(MockStorage::new()).unwrap();
        assert!(!session.restore_after_wake());

        session.add_elapsed(90_000);
        session.state.scratch[0] = 0x42;
        session.save_before_sleep().unwrap();

        // Sleep-triggered reset: a new service over the same medium
        let medium = core::mem::replace(session.store_mut().storage_mut(), MockStorage::new());
        let mut restored = SessionService::new(medium).unwrap();
        assert!(restored.restore_after_wake());
        assert_eq!(restored.state.total_ms, 90_000);
        assert_eq!(restored.state.scratch[0], 0x42);
    }

    #[test]
    fn test_elapsed_accumulates_across_cycles() {
        let mut session = SessionService::new(MockStorage::new()).unwrap();
        session.restore_after_wake();
        session.add_elapsed(1_500);
        session.save_before_sleep().unwrap();

        session.restore_after_wake();
        session.add_elapsed(2_500);
        assert_eq!(session.state.total_ms, 4_000);
    }

    #[test]
    fn test_corrupt_retained_copy_yields_fresh_state() {
        let mut session = SessionService::new(MockStorage::new()).unwrap();
        session.add_elapsed(60_000);
        session.save_before_sleep().unwrap();

        session.store_mut().storage_mut().inject_corruption(20, 4);
        assert!(!session.restore_after_wake());
        assert_eq!(session.state, SessionState::default());
    }

    #[test]
    fn test_power_loss_yields_fresh_state() {
        // RTC memory does not survive a full power loss: empty medium
        let mut session = SessionService::new(MockStorage::new()).unwrap();
        assert!(!session.restore_after_wake());
        assert_eq!(session.state.total_ms, 0);
    }

    #[test]
    fn test_record_fits_retained_region() {
        // header(9) + total_ms(8) + scratch(128) within the 512-byte region
        assert!(RecordStore::<SessionState, MockStorage>::record_len() <= 512);
    }
}
