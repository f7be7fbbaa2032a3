//! Hex payload encoding used inside configuration strings.
//!
//! Two byte orders are in use:
//!
//! * `GUID=` and `PATH=` carry bytes in memory order, two digits per byte.
//! * `VALUE=` carries a little-endian buffer written most significant digit
//!   first, so the string has to be read back to front.
//!
//! Both accept odd-length input, in which case the dangling digit forms a
//! byte of its own: forward `"abc"` is `[0xab, 0x0c]`, reversed `"abc"` is
//! `[0xbc, 0x0a]`.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Write;

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum HexError {
    #[error("invalid hex digit '{found}' at index {index}")]
    InvalidDigit { index: usize, found: char },
}

fn digits(hex: &str) -> Result<Vec<u8>, HexError> {
    hex.chars()
        .enumerate()
        .map(|(index, found)| {
            found
                .to_digit(16)
                .and_then(|d| u8::try_from(d).ok())
                .ok_or(HexError::InvalidDigit { index, found })
        })
        .collect()
}

/// Decodes digits in memory order.
///
/// # Errors
/// Fails on non-hex characters.
pub fn decode(hex: &str) -> Result<Vec<u8>, HexError> {
    let digits = digits(hex)?;
    let mut out = vec![0u8; digits.len().div_ceil(2)];
    for (i, d) in digits.into_iter().enumerate() {
        let b = &mut out[i / 2];
        *b = if i % 2 == 0 { d } else { (*b << 4) + d };
    }
    Ok(out)
}

/// Decodes a `VALUE=` payload into its little-endian buffer.
///
/// # Errors
/// Fails on non-hex characters.
pub fn decode_reversed(hex: &str) -> Result<Vec<u8>, HexError> {
    let digits = digits(hex)?;
    let mut out = vec![0u8; digits.len().div_ceil(2)];
    for (i, d) in digits.into_iter().rev().enumerate() {
        let b = &mut out[i / 2];
        *b = if i % 2 == 0 { d } else { (d << 4) + *b };
    }
    Ok(out)
}

/// Encodes bytes in memory order with lowercase digits.
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

/// Encodes a little-endian buffer as a `VALUE=` payload.
#[must_use]
pub fn encode_reversed(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes.iter().rev() {
        let _ = write!(out, "{b:02x}");
    }
    out
}

/// Encodes a name as four lowercase digits per UCS-2 character.
#[must_use]
pub fn encode_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() * 4);
    for unit in name.encode_utf16() {
        let _ = write!(out, "{unit:04x}");
    }
    out
}

/// Decodes a `NAME=` payload, four digits per character.
///
/// A trailing group shorter than four digits still yields a character.
///
/// # Errors
/// Fails on non-hex characters.
pub fn decode_name(hex: &str) -> Result<String, HexError> {
    let digits = digits(hex)?;
    let units: Vec<u16> = digits
        .chunks(4)
        .map(|group| group.iter().fold(0u16, |acc, &d| (acc << 4) | u16::from(d)))
        .collect();
    Ok(char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect())
}
