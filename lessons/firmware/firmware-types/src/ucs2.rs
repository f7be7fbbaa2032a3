//! UCS-2 helpers for firmware strings stored as little-endian `u16` units.

use alloc::string::String;
use alloc::vec::Vec;

/// Encodes `s` as UCS-2 code units followed by a terminating `0`.
///
/// Characters outside the Basic Multilingual Plane are replaced by `?`.
#[must_use]
pub fn encode(s: &str) -> Vec<u16> {
    let mut out: Vec<u16> = s
        .chars()
        .map(|c| u16::try_from(u32::from(c)).unwrap_or(u16::from(b'?')))
        .collect();
    out.push(0);
    out
}

/// Encodes `s` as little-endian UCS-2 bytes including the terminator.
#[must_use]
pub fn encode_bytes(s: &str) -> Vec<u8> {
    encode(s).into_iter().flat_map(u16::to_le_bytes).collect()
}

/// Decodes code units up to the first `0` (or the end of the slice).
#[must_use]
pub fn decode(units: &[u16]) -> String {
    let end = units.iter().position(|&u| u == 0).unwrap_or(units.len());
    char::decode_utf16(units[..end].iter().copied())
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Decodes little-endian UCS-2 bytes up to the first `0` unit.
///
/// Returns the string and the number of bytes consumed including the
/// terminator, or `None` when no terminator is present.
#[must_use]
pub fn decode_bytes(bytes: &[u8]) -> Option<(String, usize)> {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    let len = units.iter().position(|&u| u == 0)?;
    Some((decode(&units[..len]), (len + 1) * 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_terminates() {
        assert_eq!(encode("Hi"), vec![u16::from(b'H'), u16::from(b'i'), 0]);
        assert_eq!(encode_bytes("A"), vec![b'A', 0, 0, 0]);
        assert_eq!(encode("\u{1F600}"), vec![u16::from(b'?'), 0]);
    }

    #[test]
    fn decode_stops_at_terminator() {
        let bytes = [b'O', 0, b'K', 0, 0, 0, b'x', 0];
        assert_eq!(decode_bytes(&bytes), Some((String::from("OK"), 6)));
        assert_eq!(decode(&[u16::from(b'a'), 0, u16::from(b'b')]), "a");
    }

    #[test]
    fn missing_terminator() {
        assert_eq!(decode_bytes(&[b'O', 0, b'K', 0]), None);
        assert_eq!(decode_bytes(&[b'O']), None);
    }
}
