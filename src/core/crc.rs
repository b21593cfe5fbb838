//! CRC32 calculation for persistent record validation
//!
//! This module provides the checksum used to detect corrupted records in
//! the EEPROM-class and RTC-memory-class storage. Records are always
//! checksummed with their own crc field zeroed in the buffer under test.

use crc::{Crc, CRC_32_ISO_HDLC};

/// CRC32 algorithm (ISO HDLC / Ethernet / ZIP)
const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Calculate CRC32 checksum of data
///
/// Uses the CRC-32-ISO-HDLC algorithm (polynomial 0x04C11DB7), the same as
/// used in Ethernet, ZIP, and PNG. Pure and deterministic, so a value
/// computed before a reset validates after it.
pub fn calculate_crc32(data: &[u8]) -> u32 {
    CRC32.checksum(data)
}

/// Validate data against a CRC32 checksum
///
/// Returns `true` if the checksum matches.
pub fn validate_crc32(data: &[u8], expected_crc: u32) -> bool {
    calculate_crc32(data) == expected_crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_known_values() {
        // Known CRC32 values for test vectors
        let test_cases = [
            (b"" as &[u8], 0x00000000u32),
            (b"a", 0xE8B7BE43),
            (b"abc", 0x352441C2),
            (b"123456789", 0xCBF43926),
        ];

        for (data, expected) in test_cases {
            let crc = calculate_crc32(data);
            assert_eq!(
                crc,
                expected,
                "CRC mismatch for '{}'",
                core::str::from_utf8(data).unwrap()
            );
        }
    }

    #[test]
    fn test_validate_crc32() {
        let data = b"record payload under test";
        let crc = calculate_crc32(data);

        assert!(validate_crc32(data, crc));
        assert!(!validate_crc32(data, crc + 1));
        assert!(!validate_crc32(data, 0));
    }

    #[test]
    fn test_crc32_detects_single_bit_flip() {
        let data = b"original data";
        let crc = calculate_crc32(data);

        let mut corrupted = data.to_vec();
        corrupted[0] ^= 0x01;

        assert!(!validate_crc32(&corrupted, crc));
    }

    #[test]
    fn test_crc32_deterministic() {
        let data = b"consistent data";
        assert_eq!(calculate_crc32(data), calculate_crc32(data));
    }
}
