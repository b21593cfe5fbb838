//! Power-cycle-resilient persistent record store
//!
//! A record is a validated blob: a fixed header followed by a payload with
//! a compile-time layout. The header carries a per-store magic, the
//! compiled record size, a CRC32 over the whole record (computed with the
//! crc field zeroed) and a schema version. Loading validates strictly in
//! order magic, size, crc, version and never returns a partial payload.
//!
//! The store is instantiated twice in this firmware: the device
//! configuration on the EEPROM-class medium and the session state on the
//! RTC-memory-class medium.

use crate::core::crc::calculate_crc32;
use crate::platform::{PlatformError, StorageInterface};

/// Record header layout: magic(2) | size(2) | crc(4) | version(1), little-endian
pub const HEADER_SIZE: usize = 9;

/// Upper bound on a serialized record, sized to the smallest backing medium
pub const MAX_RECORD_BYTES: usize = 512;

/// Record validation and storage errors
///
/// Load failures identify the first header check that failed; callers
/// recover by rewriting defaults, never by trusting part of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// Stored magic does not match the store's compile-time constant
    BadMagic,
    /// Stored size does not match the compiled record layout
    BadSize,
    /// CRC32 mismatch over the serialized record
    BadChecksum,
    /// Stored schema version does not match the compiled version
    BadVersion,
    /// Record layout does not fit the backing medium (construction-time)
    TooLarge,
    /// Backing medium failed
    Storage(PlatformError),
}

impl From<PlatformError> for RecordError {
    fn from(e: PlatformError) -> Self {
        RecordError::Storage(e)
    }
}

impl core::fmt::Display for RecordError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RecordError::BadMagic => write!(f, "record magic mismatch"),
            RecordError::BadSize => write!(f, "record size mismatch"),
            RecordError::BadChecksum => write!(f, "record checksum mismatch"),
            RecordError::BadVersion => write!(f, "record version mismatch"),
            RecordError::TooLarge => write!(f, "record does not fit backing medium"),
            RecordError::Storage(e) => write!(f, "record storage failure: {}", e),
        }
    }
}

/// Payload of a persistent record
///
/// Implementations serialize to a fixed little-endian layout of exactly
/// `SIZE` bytes. The owning subsystem mutates the payload in memory and
/// hands it to [`RecordStore::store`] whole; records are never partially
/// updated.
pub trait RecordPayload: Sized {
    /// Per-store magic constant
    const MAGIC: u16;
    /// Schema version, bumped on any layout change
    const VERSION: u8;
    /// Serialized payload size in bytes
    const SIZE: usize;

    /// Serialize into `buf`, which is exactly `SIZE` bytes
    fn to_bytes(&self, buf: &mut [u8]);

    /// Deserialize from `buf`, which is exactly `SIZE` bytes
    ///
    /// Returns `None` if the bytes do not form a valid payload.
    fn from_bytes(buf: &[u8]) -> Option<Self>;
}

/// Generic validated-blob record store over a byte storage medium
///
/// ```ignore
/// let mut store: RecordStore<DeviceConfig, _> = RecordStore::new(MockStorage::new(), 0)?;
/// store.store(&cfg)?;
/// let cfg = store.load()?;
/// ```
pub struct RecordStore<P: RecordPayload, S: StorageInterface> {
    storage: S,
    offset: u32,
    _payload: core::marker::PhantomData<P>,
}

impl<P: RecordPayload, S: StorageInterface> RecordStore<P, S> {
    /// Serialized record length, header included
    pub const fn record_len() -> usize {
        HEADER_SIZE + P::SIZE
    }

    /// Create a store for one record at `offset` on `storage`
    ///
    /// An oversized record layout is rejected here, at construction; it
    /// must never surface as a runtime failure.
    pub fn new(storage: S, offset: u32) -> Result<Self, RecordError> {
        let len = Self::record_len();
        if len > MAX_RECORD_BYTES || offset as usize + len > storage.capacity() as usize {
            return Err(RecordError::TooLarge);
        }
        Ok(Self {
            storage,
            offset,
            _payload: core::marker::PhantomData,
        })
    }

    /// Load and validate the record
    ///
    /// Checks run strictly in order magic, size, crc (recomputed with the
    /// crc field zeroed), version; the first failing check short-circuits.
    pub fn load(&mut self) -> Result<P, RecordError> {
        let len = Self::record_len();
        let mut buf = [0u8; MAX_RECORD_BYTES];
        let buf = &mut buf[..len];
        self.storage.read(self.offset, buf)?;

        let magic = u16::from_le_bytes([buf[0], buf[1]]);
        if magic != P::MAGIC {
            return Err(RecordError::BadMagic);
        }
        let size = u16::from_le_bytes([buf[2], buf[3]]);
        if size as usize != len {
            return Err(RecordError::BadSize);
        }
        let stored_crc = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
        buf[4..8].fill(0);
        if calculate_crc32(buf) != stored_crc {
            return Err(RecordError::BadChecksum);
        }
        if buf[8] != P::VERSION {
            return Err(RecordError::BadVersion);
        }
        P::from_bytes(&buf[HEADER_SIZE..]).ok_or(RecordError::BadSize)
    }

    /// Serialize and write the record as one contiguous operation
    ///
    /// The header is rebuilt from the compile-time constants and the crc
    /// computed over the full buffer with the crc field zeroed. There is no
    /// partial-write recovery; a power loss mid-write is an accepted risk.
    pub fn store(&mut self, payload: &P) -> Result<(), RecordError> {
        let len = Self::record_len();
        let mut buf = [0u8; MAX_RECORD_BYTES];
        let buf = &mut buf[..len];

        buf[0..2].copy_from_slice(&P::MAGIC.to_le_bytes());
        buf[2..4].copy_from_slice(&(len as u16).to_le_bytes());
        buf[4..8].fill(0);
        buf[8] = P::VERSION;
        payload.to_bytes(&mut buf[HEADER_SIZE..]);

        let crc = calculate_crc32(buf);
        buf[4..8].copy_from_slice(&crc.to_le_bytes());

        self.storage.write(self.offset, buf)?;
        Ok(())
    }

    /// Load the record, falling back to defaults when absent or invalid
    ///
    /// On any load failure, or when `force_reset` is set, the defaults
    /// closure builds a fresh payload which is stored immediately. Returns
    /// `true` iff defaults were written. This is the only path allowed to
    /// silently discard a corrupted or version-mismatched record;
    /// corruption must never block boot.
    pub fn initialize_if_absent<F>(
        &mut self,
        force_reset: bool,
        defaults: F,
    ) -> Result<bool, RecordError>
    where
        F: FnOnce() -> P,
    {
        if !force_reset && self.load().is_ok() {
            return Ok(false);
        }
        let payload = defaults();
        self.store(&payload)?;
        Ok(true)
    }

    /// Backing medium reference (for testing)
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockStorage;
    use crate::platform::StorageInterface;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Sample {
        counter: u32,
        flags: u16,
    }

    impl RecordPayload for Sample {
        const MAGIC: u16 = 0xBEEF;
        const VERSION: u8 = 2;
        const SIZE: usize = 6;

        fn to_bytes(&self, buf: &mut [u8]) {
            buf[0..4].copy_from_slice(&self.counter.to_le_bytes());
            buf[4..6].copy_from_slice(&self.flags.to_le_bytes());
        }

        fn from_bytes(buf: &[u8]) -> Option<Self> {
            Some(Self {
                counter: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
                flags: u16::from_le_bytes([buf[4], buf[5]]),
            })
        }
    }

    struct Oversized;

    impl RecordPayload for Oversized {
        const MAGIC: u16 = 0x0BAD;
        const VERSION: u8 = 1;
        const SIZE: usize = 600;

        fn to_bytes(&self, _buf: &mut [u8]) {}

        fn from_bytes(_buf: &[u8]) -> Option<Self> {
            Some(Self)
        }
    }

    fn sample_store() -> RecordStore<Sample, MockStorage> {
        RecordStore::new(MockStorage::new(), 0).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let mut store = sample_store();
        let payload = Sample {
            counter: 0xDEAD_BEEF,
            flags: 0x1234,
        };
        store.store(&payload).unwrap();
        assert_eq!(store.load().unwrap(), payload);
    }

    #[test]
    fn test_empty_medium_fails_magic() {
        let mut store = sample_store();
        assert_eq!(store.load(), Err(RecordError::BadMagic));
    }

    #[test]
    fn test_crc_sensitivity_every_payload_bit() {
        // Flipping any single bit after the crc field must fail the
        // checksum check, never pass or return garbage.
        let payload = Sample {
            counter: 0xA5A5_5A5A,
            flags: 0x0FF0,
        };
        let len = RecordStore::<Sample, MockStorage>::record_len();
        for offset in 8..len as u32 {
            for bit in 0..8 {
                let mut store = sample_store();
                store.store(&payload).unwrap();
                store.storage_mut().flip_bit(offset, bit);
                assert_eq!(
                    store.load(),
                    Err(RecordError::BadChecksum),
                    "offset {} bit {}",
                    offset,
                    bit
                );
            }
        }
    }

    #[test]
    fn test_magic_checked_before_crc() {
        let mut store = sample_store();
        store
            .store(&Sample {
                counter: 1,
                flags: 2,
            })
            .unwrap();
        store.storage_mut().flip_bit(0, 0);
        assert_eq!(store.load(), Err(RecordError::BadMagic));
    }

    #[test]
    fn test_size_checked_before_crc() {
        let mut store = sample_store();
        store
            .store(&Sample {
                counter: 1,
                flags: 2,
            })
            .unwrap();
        store.storage_mut().flip_bit(2, 0);
        assert_eq!(store.load(), Err(RecordError::BadSize));
    }

    #[test]
    fn test_corrupt_crc_field() {
        let mut store = sample_store();
        store
            .store(&Sample {
                counter: 1,
                flags: 2,
            })
            .unwrap();
        store.storage_mut().flip_bit(4, 3);
        assert_eq!(store.load(), Err(RecordError::BadChecksum));
    }

    #[test]
    fn test_version_mismatch_rejected() {
        // A record written under another schema version must be rejected
        // whole, never partially accepted. Rewrite the version byte and
        // refresh the crc so only the version check can fail.
        let mut store = sample_store();
        store
            .store(&Sample {
                counter: 7,
                flags: 7,
            })
            .unwrap();

        let len = RecordStore::<Sample, MockStorage>::record_len();
        let mut raw = store.storage_mut().get_contents(0, len);
        raw[8] = Sample::VERSION + 1;
        raw[4..8].fill(0);
        let crc = crate::core::crc::calculate_crc32(&raw);
        raw[4..8].copy_from_slice(&crc.to_le_bytes());
        store.storage_mut().write(0, &raw).unwrap();

        assert_eq!(store.load(), Err(RecordError::BadVersion));
    }

    #[test]
    fn test_initialize_if_absent_idempotent() {
        let mut store = sample_store();
        let defaults = || Sample {
            counter: 42,
            flags: 0,
        };

        assert!(store.initialize_if_absent(false, defaults).unwrap());
        let writes = store.storage_mut().write_count();

        // Second call is a no-op on a valid record
        assert!(!store.initialize_if_absent(false, defaults).unwrap());
        assert_eq!(store.storage_mut().write_count(), writes);
        assert_eq!(store.load().unwrap().counter, 42);
    }

    #[test]
    fn test_initialize_if_absent_forced() {
        let mut store = sample_store();
        store
            .store(&Sample {
                counter: 1,
                flags: 1,
            })
            .unwrap();

        // Force overwrites even a currently-valid record
        let written = store
            .initialize_if_absent(true, || Sample {
                counter: 99,
                flags: 0,
            })
            .unwrap();
        assert!(written);
        assert_eq!(store.load().unwrap().counter, 99);
    }

    #[test]
    fn test_initialize_recovers_from_corruption() {
        let mut store = sample_store();
        store
            .store(&Sample {
                counter: 5,
                flags: 5,
            })
            .unwrap();
        store.storage_mut().inject_corruption(10, 2);

        assert!(store
            .initialize_if_absent(false, || Sample {
                counter: 0,
                flags: 0,
            })
            .unwrap());
        assert_eq!(
            store.load().unwrap(),
            Sample {
                counter: 0,
                flags: 0,
            }
        );
    }

    #[test]
    fn test_oversized_record_rejected_at_construction() {
        let result: Result<RecordStore<Oversized, _>, _> = RecordStore::new(MockStorage::new(), 0);
        assert_eq!(result.err(), Some(RecordError::TooLarge));
    }

    #[test]
    fn test_record_must_fit_at_offset() {
        // Fits at offset 0, but not at the end of the medium
        let result: Result<RecordStore<Sample, _>, _> =
            RecordStore::new(MockStorage::with_capacity(16), 8);
        assert_eq!(result.err(), Some(RecordError::TooLarge));
    }
}
