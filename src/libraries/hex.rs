//! Hex and short-decimal conversion helpers
//!
//! Pure conversions used by the modem protocol driver: frame bytes to
//! uppercase hex for uplink commands, and validation/parsing of the hex
//! and decimal response shapes the modem reports.

use heapless::String;

/// Encode bytes as uppercase hex
///
/// Returns `None` when the output would exceed the string capacity;
/// truncation is never silent.
pub fn encode_upper<const N: usize>(bytes: &[u8]) -> Option<String<N>> {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
    let mut out: String<N> = String::new();
    for &b in bytes {
        out.push(DIGITS[(b >> 4) as usize] as char).ok()?;
        out.push(DIGITS[(b & 0x0F) as usize] as char).ok()?;
    }
    Some(out)
}

/// Whether `s` is entirely hex digits
///
/// With `upper_only` set, lowercase digits are rejected. An empty string
/// is not a hex string.
pub fn is_hex_str(s: &str, upper_only: bool) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_digit()
                || (b'A'..=b'F').contains(&b)
                || (!upper_only && (b'a'..=b'f').contains(&b))
        })
}

/// Parse exactly 8 hex digits into a u32
pub fn parse_hex_u32(s: &str) -> Option<u32> {
    if s.len() != 8 || !is_hex_str(s, false) {
        return None;
    }
    u32::from_str_radix(s, 16).ok()
}

/// Parse the first 4 characters as a decimal number
///
/// The input must carry at least 4 characters and the first 4 must all be
/// decimal digits; anything shorter or malformed is `None`, never a
/// best-effort value.
pub fn parse_dec4(s: &str) -> Option<u16> {
    let bytes = s.as_bytes();
    if bytes.len() < 4 {
        return None;
    }
    let mut value: u16 = 0;
    for &b in &bytes[..4] {
        if !b.is_ascii_digit() {
            return None;
        }
        value = value * 10 + (b - b'0') as u16;
    }
    Some(value)
}
