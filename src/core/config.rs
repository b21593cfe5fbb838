//! Device configuration record
//!
//! Factory configuration persisted on the EEPROM-class medium, read on
//! every boot. Layout on the medium, little-endian, from offset 0:
//! `magic(2) | size(2) | crc(4) | version(1) | log_config(2) | radio_id(4)`.
//! The record schema version is the firmware version; a firmware upgrade
//! that changes the layout invalidates the stored record and defaults are
//! rewritten on the next boot.

use crate::core::logging::{LogSink, Logger, DEFAULT_LOG_CONFIG};
use crate::core::record::{RecordError, RecordPayload, RecordStore};
use crate::devices::modem::ModemDriver;
use crate::platform::{StorageInterface, TimerInterface, UartInterface};
use crate::log_warn;

/// Firmware version, doubles as the configuration schema version
pub const FIRMWARE_VERSION: u8 = 0x01;

/// Magic identifying the configuration record
pub const CONFIG_MAGIC: u16 = 0xA5FC;

/// Configuration record offset on the EEPROM-class medium
pub const CONFIG_OFFSET: u32 = 0;

/// Identifier retrieval attempts during first-boot provisioning
const PROVISION_ATTEMPTS: u32 = 3;

/// Device configuration payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    /// Per-sink/per-level logging mask, see `core::logging`
    pub log_config: u16,
    /// 32-bit radio identifier reported by the modem
    pub radio_id: u32,
}

impl DeviceConfig {
    /// Compiled-in defaults; the radio identifier comes from the modem
    pub fn factory_default(radio_id: u32) -> Self {
        Self {
            log_config: DEFAULT_LOG_CONFIG,
            radio_id,
        }
    }
}

impl RecordPayload for DeviceConfig {
    const MAGIC: u16 = CONFIG_MAGIC;
    const VERSION: u8 = FIRMWARE_VERSION;
    const SIZE: usize = 6;

    fn to_bytes(&self, buf: &mut [u8]) {
        buf[0..2].copy_from_slice(&self.log_config.to_le_bytes());
        buf[2..6].copy_from_slice(&self.radio_id.to_le_bytes());
    }

    fn from_bytes(buf: &[u8]) -> Option<Self> {
        Some(Self {
            log_config: u16::from_le_bytes([buf[0], buf[1]]),
            radio_id: u32::from_le_bytes([buf[2], buf[3], buf[4], buf[5]]),
        })
    }
}

/// Configuration service owning the EEPROM-class record store
///
/// ```ignore
/// let mut config = ConfigService::new(eeprom)?;
/// let written = config.init(false, &mut modem)?;
/// logger.init(config.config.log_config);
/// ```
pub struct ConfigService<S: StorageInterface> {
    store: RecordStore<DeviceConfig, S>,
    /// Active configuration, valid after `init`
    pub config: DeviceConfig,
}

impl<S: StorageInterface> ConfigService<S> {
    /// Create the service over the power-loss-surviving medium
    pub fn new(storage: S) -> Result<Self, RecordError> {
        Ok(Self {
            store: RecordStore::new(storage, CONFIG_OFFSET)?,
            config: DeviceConfig::factory_default(0),
        })
    }

    /// Load the configuration, (re)writing defaults when needed
    ///
    /// On a load failure or when `force_reset` is set, builds the factory
    /// defaults and stores them; this is the only path that discards a
    /// corrupted or version-mismatched record, so corruption never blocks
    /// boot. The radio identifier is queried from the modem through the
    /// bounded retry wrapper; the modem must be awake. Returns `true` iff
    /// defaults were (re)written.
    pub fn init<U, T>(
        &mut self,
        force_reset: bool,
        modem: &mut ModemDriver<U, T>,
    ) -> Result<bool, RecordError>
    where
        U: UartInterface,
        T: TimerInterface,
    {
        match self.store.load() {
            Ok(config) if !force_reset => {
                self.config = config;
                Ok(false)
            }
            _ => {
                let radio_id = match modem.with_retry(PROVISION_ATTEMPTS, |m| m.get_identifier()) {
                    Ok(id) => id,
                    Err(_) => {
                        log_warn!("radio identifier unavailable, storing 0");
                        0
                    }
                };
                self.config = DeviceConfig::factory_default(radio_id);
                self.store.store(&self.config)?;
                Ok(true)
            }
        }
    }

    /// Log the active configuration (console `c` command)
    pub fn print<L: LogSink>(&self, log: &mut Logger<L>) {
        log.any(format_args!("-------- Config --------"));
        log.any(format_args!(" Magic : {:04X}", CONFIG_MAGIC));
        log.any(format_args!(" FW version : {:02X}", FIRMWARE_VERSION));
        log.any(format_args!(" RadioId : {:08X}", self.config.radio_id));
        log.any(format_args!(" logConfig : {:04X}", self.config.log_config));
    }

    /// Record store reference (for testing)
    pub fn store_mut(&mut self) -> &mut RecordStore<DeviceConfig, S> {
        &mut self.store
    }
}
