//! SMBIOS entry point structures.

use crate::{SmbiosError, sum};
use firmware_types::{read_u16, read_u32, read_u64};

pub const ANCHOR_V2: &[u8; 4] = b"_SM_";
pub const INTERMEDIATE_ANCHOR: &[u8; 5] = b"_DMI_";
pub const ANCHOR_V3: &[u8; 5] = b"_SM3_";

/// Length of the SMBIOS 2.1 entry point.
pub const ENTRY_V2_LEN: usize = 0x1F;
/// Length of the SMBIOS 3.0 entry point.
pub const ENTRY_V3_LEN: usize = 0x18;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EntryPoint {
    /// `_SM_` entry point with a 32-bit table address.
    V2 {
        major: u8,
        minor: u8,
        max_structure_size: u16,
        table_address: u32,
        table_length: u16,
        structure_count: u16,
    },
    /// `_SM3_` entry point with a 64-bit table address and a maximum size.
    V3 {
        major: u8,
        minor: u8,
        doc_revision: u8,
        table_address: u64,
        table_max_size: u32,
    },
}

impl EntryPoint {
    /// Decodes and validates an entry point.
    ///
    /// # Errors
    /// Fails on an unknown anchor, a short buffer or a bad checksum. The
    /// `_DMI_` intermediate checksum of 2.x entry points is checked too.
    pub fn parse(bytes: &[u8]) -> Result<Self, SmbiosError> {
        if bytes.starts_with(ANCHOR_V3) {
            Self::parse_v3(bytes)
        } else if bytes.starts_with(ANCHOR_V2) {
            Self::parse_v2(bytes)
        } else {
            Err(SmbiosError::InvalidAnchor)
        }
    }

    fn parse_v2(bytes: &[u8]) -> Result<Self, SmbiosError> {
        let short = SmbiosError::TruncatedEntryPoint;
        let length = usize::from(*bytes.get(5).ok_or(short)?);
        let entry = bytes.get(..length.max(ENTRY_V2_LEN)).ok_or(short)?;
        if sum(&entry[..length]) != 0 {
            return Err(SmbiosError::Checksum("32-bit"));
        }
        if &entry[0x10..0x15] != INTERMEDIATE_ANCHOR {
            return Err(SmbiosError::InvalidAnchor);
        }
        if sum(&entry[0x10..ENTRY_V2_LEN]) != 0 {
            return Err(SmbiosError::Checksum("intermediate"));
        }
        Ok(Self::V2 {
            major: entry[6],
            minor: entry[7],
            max_structure_size: read_u16(entry, 8).ok_or(short)?,
            table_length: read_u16(entry, 0x16).ok_or(short)?,
            table_address: read_u32(entry, 0x18).ok_or(short)?,
            structure_count: read_u16(entry, 0x1C).ok_or(short)?,
        })
    }

    fn parse_v3(bytes: &[u8]) -> Result<Self, SmbiosError> {
        let short = SmbiosError::TruncatedEntryPoint;
        let length = usize::from(*bytes.get(6).ok_or(short)?);
        let entry = bytes.get(..length.max(ENTRY_V3_LEN)).ok_or(short)?;
        if sum(&entry[..length]) != 0 {
            return Err(SmbiosError::Checksum("64-bit"));
        }
        Ok(Self::V3 {
            major: entry[7],
            minor: entry[8],
            doc_revision: entry[9],
            table_max_size: read_u32(entry, 0x0C).ok_or(short)?,
            table_address: read_u64(entry, 0x10).ok_or(short)?,
        })
    }

    #[must_use]
    pub const fn version(&self) -> (u8, u8) {
        match *self {
            Self::V2 { major, minor, .. } | Self::V3 { major, minor, .. } => (major, minor),
        }
    }

    #[must_use]
    pub const fn table_address(&self) -> u64 {
        match *self {
            Self::V2 { table_address, .. } => table_address as u64,
            Self::V3 { table_address, .. } => table_address,
        }
    }

    /// Bytes to map for the structure table. For 3.x this is an upper bound.
    #[must_use]
    pub const fn table_length(&self) -> usize {
        match *self {
            Self::V2 { table_length, .. } => table_length as usize,
            Self::V3 { table_max_size, .. } => table_max_size as usize,
        }
    }

    /// Length of the entry point structure itself.
    #[must_use]
    pub const fn entry_len(&self) -> usize {
        match self {
            Self::V2 { .. } => ENTRY_V2_LEN,
            Self::V3 { .. } => ENTRY_V3_LEN,
        }
    }
}

/// Entry point images for tests in this crate.
#[cfg(test)]
pub(crate) mod build {
    fn fix(bytes: &mut [u8], at: usize) {
        bytes[at] = 0;
        bytes[at] = 0u8.wrapping_sub(super::sum(bytes));
    }

    pub fn v2(address: u32, length: u16, count: u16) -> Vec<u8> {
        let mut e = vec![0u8; super::ENTRY_V2_LEN];
        e[..4].copy_from_slice(super::ANCHOR_V2);
        e[5] = 0x1F;
        e[6] = 2;
        e[7] = 8;
        e[8..10].copy_from_slice(&0x100u16.to_le_bytes());
        e[0x10..0x15].copy_from_slice(super::INTERMEDIATE_ANCHOR);
        e[0x16..0x18].copy_from_slice(&length.to_le_bytes());
        e[0x18..0x1C].copy_from_slice(&address.to_le_bytes());
        e[0x1C..0x1E].copy_from_slice(&count.to_le_bytes());
        e[0x1E] = 0x28;
        fix(&mut e[0x10..], 5);
        fix(&mut e, 4);
        e
    }

    pub fn v3(address: u64, max: u32) -> Vec<u8> {
        let mut e = vec![0u8; super::ENTRY_V3_LEN];
        e[..5].copy_from_slice(super::ANCHOR_V3);
        e[6] = 0x18;
        e[7] = 3;
        e[8] = 4;
        e[10] = 1;
        e[0x0C..0x10].copy_from_slice(&max.to_le_bytes());
        e[0x10..0x18].copy_from_slice(&address.to_le_bytes());
        fix(&mut e, 5);
        e
    }
}
