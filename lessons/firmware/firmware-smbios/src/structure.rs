//! Walking the structure table.
//!
//! ```text
//! UINT8  Type
//! UINT8  Length       formatted area including this header
//! UINT16 Handle
//! ...    formatted area
//! "first\0second\0\0" string set, or "\0\0" when there are no strings
//! ```

use crate::SmbiosError;
use alloc::string::String;
use firmware_types::read_u16;

pub const HEADER_LEN: usize = 4;
pub const END_OF_TABLE: u8 = 127;

/// One structure borrowed from the table.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Structure<'a> {
    pub ty: u8,
    pub handle: u16,
    /// The formatted area including the four byte header.
    pub formatted: &'a [u8],
    /// The string set without its final terminator.
    strings: &'a [u8],
}

impl<'a> Structure<'a> {
    /// Total size in the table, string set included.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.formatted.len() + self.strings.len() + 2
    }

    /// Resolves a 1-based string number. `0` means "no string" and yields
    /// an empty string, as do numbers past the end of the string set.
    #[must_use]
    pub fn string(&self, number: u8) -> String {
        if number == 0 {
            return String::new();
        }
        self.strings
            .split(|&b| b == 0)
            .nth(usize::from(number) - 1)
            .map(|s| s.iter().map(|&b| char::from(b)).collect())
            .unwrap_or_default()
    }

    /// Iterates over the string set in order.
    pub fn strings(&self) -> impl Iterator<Item = &'a [u8]> + 'a {
        let strings = self.strings;
        strings
            .split(|&b| b == 0)
            .filter(move |_| !strings.is_empty())
    }

    /// Byte of the formatted area at `offset`, if the structure is long
    /// enough to carry it.
    #[must_use]
    pub fn byte(&self, offset: usize) -> Option<u8> {
        self.formatted.get(offset).copied()
    }

    #[must_use]
    pub fn word(&self, offset: usize) -> Option<u16> {
        read_u16(self.formatted, offset)
    }
}

/// Size of the structure at the start of `bytes`, string set included, or
/// `None` when `bytes` ends before the string set does.
///
/// Records handed out one at a time, e.g. by `EFI_SMBIOS_PROTOCOL.GetNext`,
/// carry no length of their own.
#[must_use]
pub fn structure_size(bytes: &[u8]) -> Option<usize> {
    let length = usize::from(*bytes.get(1)?).max(HEADER_LEN);
    let tail = bytes.get(length..)?;
    tail.windows(2)
        .position(|w| w == [0, 0])
        .map(|end| length + end + 2)
}

/// Iterates the structures of a table.
///
/// The end-of-table structure is yielded and ends the iteration, as does
/// the end of the buffer.
pub struct Structures<'a> {
    bytes: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> Structures<'a> {
    #[must_use]
    pub const fn new(table: &'a [u8]) -> Self {
        Self {
            bytes: table,
            offset: 0,
            done: false,
        }
    }
}

impl<'a> Iterator for Structures<'a> {
    type Item = Result<Structure<'a>, SmbiosError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset + HEADER_LEN > self.bytes.len() {
            return None;
        }
        let offset = self.offset;
        let truncated = SmbiosError::TruncatedStructure(offset);
        let ty = self.bytes[offset];
        let length = usize::from(self.bytes[offset + 1]);
        let (Some(handle), true) = (read_u16(self.bytes, offset + 2), length >= HEADER_LEN) else {
            self.done = true;
            return Some(Err(truncated));
        };
        let Some(formatted) = self.bytes.get(offset..offset + length) else {
            self.done = true;
            return Some(Err(truncated));
        };

        // The string set ends at the first double NUL.
        let tail = &self.bytes[offset + length..];
        let Some(end) = tail.windows(2).position(|w| w == [0, 0]) else {
            self.done = true;
            return Some(Err(truncated));
        };
        let structure = Structure {
            ty,
            handle,
            formatted,
            strings: &tail[..end],
        };
        self.offset += length + end + 2;
        self.done = ty == END_OF_TABLE;
        Some(Ok(structure))
    }
}

/// Structure images for tests in this crate.
#[cfg(test)]
pub(crate) fn build(ty: u8, handle: u16, formatted: &[u8], strings: &[&str]) -> Vec<u8> {
    let mut out = vec![ty, u8::try_from(HEADER_LEN + formatted.len()).unwrap()];
    out.extend_from_slice(&handle.to_le_bytes());
    out.extend_from_slice(formatted);
    for s in strings {
        out.extend_from_slice(s.as_bytes());
        out.push(0);
    }
    if strings.is_empty() {
        out.push(0);
    }
    out.push(0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_until_end_of_table() {
        let mut table = build(0, 0, &[1, 2], &["EFI Development Kit II / OVMF", "0.0.0"]);
        let first_len = table.len();
        table.extend(build(1, 0x100, &[], &[]));
        table.extend(build(END_OF_TABLE, 0xFEFF, &[], &[]));
        table.extend(build(2, 0x200, &[], &[]));

        let all: Vec<_> = Structures::new(&table).collect::<Result<_, _>>().unwrap();
        assert_eq!(all.iter().map(|s| s.ty).collect::<Vec<_>>(), [0, 1, 127]);
        assert_eq!(all[0].string(1), "EFI Development Kit II / OVMF");
        assert_eq!(all[0].string(2), "0.0.0");
        assert_eq!(all[0].string(0), "");
        assert_eq!(all[0].string(3), "");
        assert_eq!(all[0].strings().count(), 2);
        assert_eq!(all[1].strings().count(), 0);
        assert_eq!(all[1].handle, 0x100);
        assert_eq!(all[0].size(), first_len);
        assert_eq!(all[1].size(), 6);
    }

    #[test]
    fn field_access() {
        let table = build(9, 1, &[0xAA, 0x34, 0x12], &[]);
        let s = Structures::new(&table).next().unwrap().unwrap();
        assert_eq!(s.byte(4), Some(0xAA));
        assert_eq!(s.word(5), Some(0x1234));
        assert_eq!(s.byte(7), None);
    }

    #[test]
    fn truncated_structures() {
        let mut table = build(1, 0, &[0; 4], &["x"]);
        table.truncate(table.len() - 1);
        let mut it = Structures::new(&table);
        assert_eq!(it.next(), Some(Err(SmbiosError::TruncatedStructure(0))));
        assert_eq!(it.next(), None);

        let bad_len = [1u8, 2, 0, 0, 0, 0];
        assert!(Structures::new(&bad_len).next().unwrap().is_err());
    }

    #[test]
    fn lone_record_size() {
        let record = build(0, 0, &[1, 2], &["EFI Development Kit II / OVMF", "0.0.0"]);
        let mut trailing = record.clone();
        trailing.extend(build(1, 1, &[], &[]));
        assert_eq!(structure_size(&trailing), Some(record.len()));
        assert_eq!(structure_size(&record[..record.len() - 1]), None);

        let empty = build(127, 0xFEFF, &[], &[]);
        assert_eq!(structure_size(&empty), Some(6));

        let s = Structures::new(&record).next().unwrap().unwrap();
        assert_eq!(s.size(), record.len());
        assert_eq!(s.string(1), "EFI Development Kit II / OVMF");
        assert_eq!(Structures::new(&record).count(), 1);
    }
}
