//! The variable dump file written by the UEFI Shell `dmpstore -s` command.
//!
//! The file is a plain concatenation of records:
//!
//! ```text
//! UINT32   NameSize         bytes, including the NUL terminator
//! UINT32   DataSize
//! CHAR16   Name[NameSize / 2]
//! EFI_GUID Guid
//! UINT32   Attributes
//! UINT8    Data[DataSize]
//! UINT32   Crc32            over all preceding fields of the record
//! ```
//!
//! Editing a variable in such a dump invalidates its CRC and `dmpstore -l`
//! refuses to load it. [`update_crcs`] recomputes them in place.

use crate::crc32::crc32;
use crate::variable::VariableAttributes;
use crate::{Guid, read_guid, read_u32, ucs2};
use alloc::string::String;

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum DmpstoreError {
    #[error("record at offset {0} is truncated")]
    Truncated(usize),
}

/// A single variable record borrowed from a dump.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Record<'a> {
    /// Offset of the record in the dump.
    pub offset: usize,
    pub name: &'a [u8],
    pub guid: Guid,
    pub attributes: VariableAttributes,
    pub data: &'a [u8],
    /// The CRC stored in the file.
    pub stored_crc: u32,
    /// The CRC computed over the record.
    pub computed_crc: u32,
    /// Record length including the CRC.
    pub len: usize,
}

impl Record<'_> {
    #[must_use]
    pub fn name(&self) -> String {
        ucs2::decode_bytes(self.name).map_or_else(String::new, |(s, _)| s)
    }

    #[must_use]
    pub const fn crc_valid(&self) -> bool {
        self.stored_crc == self.computed_crc
    }
}

/// Iterates the records of a dump.
pub struct Records<'a> {
    bytes: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> Records<'a> {
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: 0,
            failed: false,
        }
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<Record<'a>, DmpstoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.bytes.len() {
            return None;
        }
        let result = parse_record(self.bytes, self.offset);
        match &result {
            Ok(record) => self.offset += record.len,
            Err(_) => self.failed = true,
        }
        Some(result)
    }
}

fn parse_record(bytes: &[u8], offset: usize) -> Result<Record<'_>, DmpstoreError> {
    let truncated = DmpstoreError::Truncated(offset);
    let name_size = read_u32(bytes, offset).ok_or(truncated)? as usize;
    let data_size = read_u32(bytes, offset + 4).ok_or(truncated)? as usize;

    let name_start = offset + 8;
    let guid_start = name_start.checked_add(name_size).ok_or(truncated)?;
    let attr_start = guid_start + 16;
    let data_start = attr_start + 4;
    let crc_start = data_start.checked_add(data_size).ok_or(truncated)?;

    let stored_crc = read_u32(bytes, crc_start).ok_or(truncated)?;
    let name = &bytes[name_start..guid_start];
    let guid = read_guid(bytes, guid_start).ok_or(truncated)?;
    let attributes = read_u32(bytes, attr_start).ok_or(truncated)?;

    Ok(Record {
        offset,
        name,
        guid,
        attributes: VariableAttributes::from_bits(attributes),
        data: &bytes[data_start..crc_start],
        stored_crc,
        computed_crc: crc32(&bytes[offset..crc_start]),
        len: crc_start + 4 - offset,
    })
}

/// Rewrites every record CRC in `dump` and returns the number of records
/// whose CRC changed.
///
/// # Errors
/// Fails on a truncated record. Records before it are already updated.
pub fn update_crcs(dump: &mut [u8]) -> Result<usize, DmpstoreError> {
    let mut offset = 0;
    let mut changed = 0;
    while offset < dump.len() {
        let (crc_at, crc, stale, len) = {
            let record = parse_record(dump, offset)?;
            (
                offset + record.len - 4,
                record.computed_crc,
                !record.crc_valid(),
                record.len,
            )
        };
        dump[crc_at..crc_at + 4].copy_from_slice(&crc.to_le_bytes());
        if stale {
            changed += 1;
        }
        offset += len;
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guid;
    use alloc::vec::Vec;

    fn record(name: &str, data: &[u8], crc: Option<u32>) -> Vec<u8> {
        let name = ucs2::encode_bytes(name);
        let mut out = Vec::new();
        out.extend_from_slice(&u32::try_from(name.len()).unwrap().to_le_bytes());
        out.extend_from_slice(&u32::try_from(data.len()).unwrap().to_le_bytes());
        out.extend_from_slice(&name);
        out.extend_from_slice(&guid!("8be4df61-93ca-11d2-aa0d-00e098032b8c").to_bytes());
        out.extend_from_slice(&7u32.to_le_bytes());
        out.extend_from_slice(data);
        let crc = crc.unwrap_or_else(|| crc32(&out));
        out.extend_from_slice(&crc.to_le_bytes());
        out
    }

    #[test]
    fn iterates_records() {
        let mut dump = record("BootOrder", &[1, 0, 0, 0], None);
        dump.extend_from_slice(&record("Timeout", &[5, 0], None));

        let records: Vec<_> = Records::new(&dump).collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name(), "BootOrder");
        assert_eq!(records[0].data, &[1, 0, 0, 0]);
        assert_eq!(records[0].attributes, VariableAttributes::NV_BS_RT);
        assert!(records[0].crc_valid());
        assert_eq!(records[1].name(), "Timeout");
        assert_eq!(records[1].offset, records[0].len);
    }

    #[test]
    fn updates_stale_crcs() {
        let mut dump = record("Timeout", &[5, 0], Some(0xDEAD_BEEF));
        dump.extend_from_slice(&record("Lang", b"eng\0", None));
        assert!(!Records::new(&dump).next().unwrap().unwrap().crc_valid());

        assert_eq!(update_crcs(&mut dump), Ok(1));
        assert!(Records::new(&dump).all(|r| r.unwrap().crc_valid()));
        assert_eq!(update_crcs(&mut dump), Ok(0));
    }

    #[test]
    fn truncated_dump() {
        let mut dump = record("Timeout", &[5, 0], None);
        let full = dump.len();
        dump.extend_from_slice(&[4, 0, 0, 0, 2]);
        let mut records = Records::new(&dump);
        assert!(records.next().unwrap().is_ok());
        assert_eq!(records.next(), Some(Err(DmpstoreError::Truncated(full))));
        assert_eq!(records.next(), None);
        assert_eq!(update_crcs(&mut dump), Err(DmpstoreError::Truncated(full)));
    }
}
