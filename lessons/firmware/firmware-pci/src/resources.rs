//! ACPI address space descriptors returned by
//! `EFI_PCI_ROOT_BRIDGE_IO_PROTOCOL.Configuration()`.
//!
//! The list is a run of QWORD address space descriptors (tag `0x8A`)
//! closed by an end tag (`0x79`).

use crate::PciError;
use alloc::vec::Vec;
use core::ops::RangeInclusive;
use firmware_types::{read_u16, read_u64};

pub const QWORD_ADDRESS_SPACE: u8 = 0x8A;
pub const END_TAG: u8 = 0x79;
/// `Len` of a QWORD descriptor, excluding the tag and length bytes.
pub const QWORD_LEN: usize = 0x2B;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResourceType {
    Memory,
    Io,
    Bus,
    Other(u8),
}

impl From<u8> for ResourceType {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Memory,
            1 => Self::Io,
            2 => Self::Bus,
            other => Self::Other(other),
        }
    }
}

/// `EFI_ACPI_ADDRESS_SPACE_DESCRIPTOR`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AddressSpace {
    pub resource_type: ResourceType,
    pub general_flags: u8,
    pub specific_flags: u8,
    pub granularity: u64,
    pub range_min: u64,
    pub range_max: u64,
    pub translation_offset: u64,
    pub length: u64,
}

impl AddressSpace {
    /// The bus numbers of a bus descriptor, clamped to eight bits.
    #[must_use]
    pub fn bus_range(&self) -> Option<RangeInclusive<u8>> {
        if self.resource_type != ResourceType::Bus || self.range_min > self.range_max {
            return None;
        }
        let min = u8::try_from(self.range_min).ok()?;
        let max = u8::try_from(self.range_max).unwrap_or(u8::MAX);
        Some(min..=max)
    }
}

/// Decodes descriptors up to the end tag.
///
/// # Errors
/// Fails on an unexpected tag, a short descriptor or a missing end tag.
pub fn parse(bytes: &[u8]) -> Result<Vec<AddressSpace>, PciError> {
    let mut out = Vec::new();
    let mut offset = 0;
    loop {
        let tag = *bytes.get(offset).ok_or(PciError::MissingEndTag)?;
        if tag == END_TAG {
            return Ok(out);
        }
        let bad = PciError::BadDescriptor(offset);
        if tag != QWORD_ADDRESS_SPACE {
            return Err(bad);
        }
        let len = usize::from(read_u16(bytes, offset + 1).ok_or(bad)?);
        let d = bytes.get(offset..offset + 3 + len).ok_or(bad)?;
        if len < QWORD_LEN {
            return Err(bad);
        }
        out.push(AddressSpace {
            resource_type: ResourceType::from(d[3]),
            general_flags: d[4],
            specific_flags: d[5],
            granularity: read_u64(d, 6).ok_or(bad)?,
            range_min: read_u64(d, 14).ok_or(bad)?,
            range_max: read_u64(d, 22).ok_or(bad)?,
            translation_offset: read_u64(d, 30).ok_or(bad)?,
            length: read_u64(d, 38).ok_or(bad)?,
        });
        offset += 3 + len;
    }
}

/// Bus ranges of all bus descriptors in `spaces`.
pub fn bus_ranges(spaces: &[AddressSpace]) -> impl Iterator<Item = RangeInclusive<u8>> + '_ {
    spaces.iter().filter_map(AddressSpace::bus_range)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qword(ty: u8, min: u64, max: u64) -> Vec<u8> {
        let mut d = vec![QWORD_ADDRESS_SPACE];
        d.extend_from_slice(&u16::try_from(QWORD_LEN).unwrap().to_le_bytes());
        d.extend_from_slice(&[ty, 0, 0]);
        d.extend_from_slice(&0u64.to_le_bytes());
        d.extend_from_slice(&min.to_le_bytes());
        d.extend_from_slice(&max.to_le_bytes());
        d.extend_from_slice(&0u64.to_le_bytes());
        d.extend_from_slice(&(max - min + 1).to_le_bytes());
        d
    }

    #[test]
    fn root_bridge_resources() {
        let mut bytes = qword(2, 0, 0xFF);
        bytes.extend(qword(1, 0x6000, 0xFFFF));
        bytes.extend(qword(0, 0x8000_0000, 0xAFFF_FFFF));
        bytes.extend_from_slice(&[END_TAG, 0]);

        let spaces = parse(&bytes).unwrap();
        assert_eq!(spaces.len(), 3);
        assert_eq!(spaces[1].resource_type, ResourceType::Io);
        assert_eq!(spaces[2].length, 0x3000_0000);
        assert_eq!(bus_ranges(&spaces).collect::<Vec<_>>(), [0..=0xFF]);
    }

    #[test]
    fn malformed_lists() {
        assert_eq!(parse(&qword(2, 0, 1)), Err(PciError::MissingEndTag));
        assert_eq!(parse(&[0x87, 0, 0]), Err(PciError::BadDescriptor(0)));
        let mut short = qword(2, 0, 1);
        short.truncate(20);
        assert_eq!(parse(&short), Err(PciError::BadDescriptor(0)));
    }

    #[test]
    fn bus_range_clamps() {
        let spaces = parse(&[qword(2, 0x80, 0x1FF), vec![END_TAG, 0]].concat()).unwrap();
        assert_eq!(spaces[0].bus_range(), Some(0x80..=0xFF));
    }
}
