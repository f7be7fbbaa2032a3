//! `EFI_LOAD_OPTION`, the payload of `Boot####` and `Driver####` variables.
//!
//! ```text
//! UINT32  Attributes
//! UINT16  FilePathListLength
//! CHAR16  Description[]         NUL terminated
//! UINT8   FilePathList[FilePathListLength]
//! UINT8   OptionalData[]        remainder
//! ```

use crate::device_path::DevicePath;
use crate::{read_u16, read_u32, ucs2};
use alloc::string::String;
use bitfield_struct::bitfield;

#[bitfield(u32)]
#[derive(Eq, PartialEq)]
pub struct LoadOptionAttributes {
    /// Bit 0: the boot manager may try this option.
    pub active: bool,
    /// Bit 1: reconnect all drivers after loading.
    pub force_reconnect: bool,
    #[bits(1)]
    __: u8,
    /// Bit 3: hidden from boot menus.
    pub hidden: bool,
    #[bits(4)]
    __: u8,
    /// Bits 8–12: category, `0` boot, `1` application.
    #[bits(5)]
    pub category: u8,
    #[bits(19)]
    __: u32,
}

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum LoadOptionError {
    #[error("load option is too short")]
    Truncated,
    #[error("description is not NUL terminated")]
    UnterminatedDescription,
    #[error("file path list exceeds the load option")]
    FilePathOutOfBounds,
}

/// A decoded load option borrowing from the variable data.
#[derive(Debug)]
pub struct LoadOption<'a> {
    pub attributes: LoadOptionAttributes,
    pub description: String,
    pub file_path: DevicePath<'a>,
    pub optional_data: &'a [u8],
}

impl<'a> LoadOption<'a> {
    /// Parses the raw variable data.
    ///
    /// # Errors
    /// Fails on truncated data or a file path list that does not fit.
    pub fn parse(data: &'a [u8]) -> Result<Self, LoadOptionError> {
        let attributes = read_u32(data, 0).ok_or(LoadOptionError::Truncated)?;
        let path_len = usize::from(read_u16(data, 4).ok_or(LoadOptionError::Truncated)?);
        let (description, desc_bytes) =
            ucs2::decode_bytes(&data[6..]).ok_or(LoadOptionError::UnterminatedDescription)?;

        let path_start = 6 + desc_bytes;
        let path_end = path_start + path_len;
        let file_path = data
            .get(path_start..path_end)
            .ok_or(LoadOptionError::FilePathOutOfBounds)?;

        Ok(Self {
            attributes: LoadOptionAttributes::from_bits(attributes),
            description,
            file_path: DevicePath::new(file_path),
            optional_data: &data[path_end..],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_path::{END_ENTIRE, pci_node};
    use alloc::vec::Vec;

    fn build(description: &str, path: &[u8], optional: &[u8]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&u16::try_from(path.len()).unwrap().to_le_bytes());
        data.extend_from_slice(&ucs2::encode_bytes(description));
        data.extend_from_slice(path);
        data.extend_from_slice(optional);
        data
    }

    #[test]
    fn parse_boot_option() {
        let path = [pci_node(0x1F, 0x2).as_slice(), &END_ENTIRE].concat();
        let data = build("UEFI Shell", &path, &[0xAA, 0xBB]);

        let option = LoadOption::parse(&data).unwrap();
        assert!(option.attributes.active());
        assert!(!option.attributes.hidden());
        assert_eq!(option.description, "UEFI Shell");
        assert_eq!(option.file_path.as_bytes(), path.as_slice());
        assert_eq!(option.optional_data, &[0xAA, 0xBB]);
    }

    #[test]
    fn app_category_and_hidden() {
        let attrs = LoadOptionAttributes::from_bits(0x0000_0109);
        assert!(attrs.active());
        assert!(attrs.hidden());
        assert_eq!(attrs.category(), 1);
    }

    #[test]
    fn rejects_bad_lengths() {
        assert_eq!(LoadOption::parse(&[1, 0]).unwrap_err(), LoadOptionError::Truncated);
        let data = build("X", &[0x7F, 0xFF, 4, 0], &[]);
        let mut short = data.clone();
        short.truncate(data.len() - 1);
        assert_eq!(
            LoadOption::parse(&short).unwrap_err(),
            LoadOptionError::FilePathOutOfBounds
        );
        let unterminated = [1, 0, 0, 0, 4, 0, b'A', 0];
        assert_eq!(
            LoadOption::parse(&unterminated).unwrap_err(),
            LoadOptionError::UnterminatedDescription
        );
    }
}
