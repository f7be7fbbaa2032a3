//! # Firmware Data Types
//!
//! Plain data definitions and parsers for the structures the UEFI lessons read
//! from firmware: memory map descriptors, variable attributes, load options,
//! device paths, firmware file system sections and `dmpstore` dumps.
//!
//! Nothing in here talks to firmware. Every parser takes a byte slice and
//! returns borrowed views or owned values, which keeps the crate usable on the
//! host for testing and inside UEFI applications alike.
//!
//! ## Modules
//!
//! * [`memory`]: memory type names, attribute bits and the condensed
//!   "OS view" of a memory map.
//! * [`variable`]: variable attributes and `Boot####` helpers.
//! * [`load_option`]: `EFI_LOAD_OPTION` as stored in `Boot####` variables.
//! * [`device_path`]: device path node iteration and validation.
//! * [`ffs`]: firmware file and section types, section walking.
//! * [`dmpstore`]: the UEFI Shell `dmpstore` dump file format.
//! * [`hexdump`], [`ucs2`], [`crc32`]: small shared helpers.

#![cfg_attr(not(any(test, doctest)), no_std)]
extern crate alloc;

pub mod crc32;
pub mod device_path;
pub mod dmpstore;
pub mod ffs;
pub mod hexdump;
pub mod load_option;
pub mod memory;
pub mod ucs2;
pub mod variable;

pub use uguid::{Guid, guid};

/// Reads a little-endian `u16` at `offset`, if in bounds.
#[must_use]
pub fn read_u16(bytes: &[u8], offset: usize) -> Option<u16> {
    let raw = bytes.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes([raw[0], raw[1]]))
}

/// Reads a little-endian `u32` at `offset`, if in bounds.
#[must_use]
pub fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let raw = bytes.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

/// Reads a little-endian `u64` at `offset`, if in bounds.
#[must_use]
pub fn read_u64(bytes: &[u8], offset: usize) -> Option<u64> {
    let raw = bytes.get(offset..offset.checked_add(8)?)?;
    let mut buf = [0u8; 8];
    buf.copy_from_slice(raw);
    Some(u64::from_le_bytes(buf))
}

/// Reads a GUID in its in-memory (mixed-endian) layout at `offset`.
#[must_use]
pub fn read_guid(bytes: &[u8], offset: usize) -> Option<Guid> {
    let raw = bytes.get(offset..offset.checked_add(16)?)?;
    let mut buf = [0u8; 16];
    buf.copy_from_slice(raw);
    Some(Guid::from_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readers_respect_bounds() {
        let bytes = [0x34, 0x12, 0x78, 0x56, 0xAA];
        assert_eq!(read_u16(&bytes, 0), Some(0x1234));
        assert_eq!(read_u32(&bytes, 0), Some(0x5678_1234));
        assert_eq!(read_u16(&bytes, 4), None);
        assert_eq!(read_u64(&bytes, 0), None);
        assert_eq!(read_u32(&bytes, usize::MAX), None);
    }

    #[test]
    fn guid_is_read_in_memory_order() {
        let guid = guid!("8be4df61-93ca-11d2-aa0d-00e098032b8c");
        let mut bytes = [0u8; 20];
        bytes[4..].copy_from_slice(&guid.to_bytes());
        assert_eq!(read_guid(&bytes, 4), Some(guid));
    }
}
