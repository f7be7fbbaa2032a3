//! Firmware File System (FFS) file and section types.
//!
//! The contents of an FFS file, as returned by `EFI_FIRMWARE_VOLUME2_PROTOCOL.ReadFile`,
//! are a sequence of 4-byte aligned sections:
//!
//! ```text
//! UINT8 Size[3]; UINT8 Type;             common header
//! UINT8 Size[3] = FFFFFF; UINT8 Type;    extended header
//! UINT32 ExtendedSize;
//! ```

use crate::{read_u16, read_u32, ucs2};
use alloc::string::String;
use bitfield_struct::bitfield;
use core::fmt;

/// Section types.
pub mod section_type {
    pub const ALL: u8 = 0x00;
    pub const COMPRESSION: u8 = 0x01;
    pub const GUID_DEFINED: u8 = 0x02;
    pub const DISPOSABLE: u8 = 0x03;
    pub const PE32: u8 = 0x10;
    pub const PIC: u8 = 0x11;
    pub const TE: u8 = 0x12;
    pub const DXE_DEPEX: u8 = 0x13;
    pub const VERSION: u8 = 0x14;
    pub const USER_INTERFACE: u8 = 0x15;
    pub const COMPATIBILITY16: u8 = 0x16;
    pub const FIRMWARE_VOLUME_IMAGE: u8 = 0x17;
    pub const FREEFORM_SUBTYPE_GUID: u8 = 0x18;
    pub const RAW: u8 = 0x19;
    pub const PEI_DEPEX: u8 = 0x1B;
    pub const MM_DEPEX: u8 = 0x1C;
}

/// File types.
pub mod file_type {
    pub const ALL: u8 = 0x00;
    pub const RAW: u8 = 0x01;
    pub const FREEFORM: u8 = 0x02;
    pub const SECURITY_CORE: u8 = 0x03;
    pub const PEI_CORE: u8 = 0x04;
    pub const DXE_CORE: u8 = 0x05;
    pub const PEIM: u8 = 0x06;
    pub const DRIVER: u8 = 0x07;
    pub const COMBINED_PEIM_DRIVER: u8 = 0x08;
    pub const APPLICATION: u8 = 0x09;
    pub const MM: u8 = 0x0A;
    pub const FIRMWARE_VOLUME_IMAGE: u8 = 0x0B;
    pub const COMBINED_MM_DXE: u8 = 0x0C;
    pub const MM_CORE: u8 = 0x0D;
    pub const MM_STANDALONE: u8 = 0x0E;
    pub const MM_CORE_STANDALONE: u8 = 0x0F;
    pub const FFS_PAD: u8 = 0xF0;
}

/// Section type names paired with the short argument names accepted on the
/// command line.
const SECTIONS: [(u8, &str, &str); 16] = [
    (section_type::ALL, "ALL", "ALL"),
    (section_type::COMPRESSION, "COMPRESSION", "COMPRESS"),
    (section_type::GUID_DEFINED, "GUID_DEFINED", "GUIDED"),
    (section_type::DISPOSABLE, "DISPOSABLE", "DISPOSABLE"),
    (section_type::PE32, "PE32", "PE32"),
    (section_type::PIC, "PIC", "PIC"),
    (section_type::TE, "TE", "TE"),
    (section_type::DXE_DEPEX, "DXE_DEPEX", "DXE_DEPEX"),
    (section_type::VERSION, "VERSION", "VERSION"),
    (section_type::USER_INTERFACE, "USER_INTERFACE", "UI"),
    (section_type::COMPATIBILITY16, "COMPATIBILITY16", "COMPAT16"),
    (section_type::FIRMWARE_VOLUME_IMAGE, "FV_IMAGE", "FV_IMAGE"),
    (section_type::FREEFORM_SUBTYPE_GUID, "SUBTYPE_GUID", "SUBTYPE_GUID"),
    (section_type::RAW, "RAW", "RAW"),
    (section_type::PEI_DEPEX, "PEI_DEPEX", "PEI_DEPEX"),
    (section_type::MM_DEPEX, "MM_DEPEX", "MM_DEPEX"),
];

/// All accepted section argument names, for usage output.
pub const SECTION_ARGUMENTS: &str = "ALL|COMPRESS|GUIDED|DISPOSABLE|PE32|PIC|TE|DXE_DEPEX|PEI_DEPEX|MM_DEPEX\nVERSION|UI|COMPAT16|FV_IMAGE|SUBTYPE_GUID|RAW";

#[must_use]
pub fn section_type_name(ty: u8) -> &'static str {
    SECTIONS
        .iter()
        .find(|(t, _, _)| *t == ty)
        .map_or("UNKNOWN", |(_, name, _)| name)
}

/// Maps a command line argument such as `UI` or `PE32` to its section type.
#[must_use]
pub fn parse_section_type(arg: &str) -> Option<u8> {
    SECTIONS
        .iter()
        .find(|(_, _, short)| *short == arg)
        .map(|(t, _, _)| *t)
}

#[must_use]
pub const fn file_type_name(ty: u8) -> &'static str {
    match ty {
        file_type::RAW => "RAW",
        file_type::FREEFORM => "FREEFORM",
        file_type::SECURITY_CORE => "SEC_CORE",
        file_type::PEI_CORE => "PEI_CORE",
        file_type::DXE_CORE => "DXE_CORE",
        file_type::PEIM => "PEIM",
        file_type::DRIVER => "DRIVER",
        file_type::COMBINED_PEIM_DRIVER => "COMBINED_PEIM_DRIVER",
        file_type::APPLICATION => "APPLICATION",
        file_type::MM => "MM",
        file_type::FIRMWARE_VOLUME_IMAGE => "FV_IMAGE",
        file_type::COMBINED_MM_DXE => "COMBINED_MM_DXE",
        file_type::MM_CORE => "MM_CORE",
        file_type::MM_STANDALONE => "MM_STANDALONE",
        file_type::MM_CORE_STANDALONE => "MM_CORE_STANDALONE",
        0xC0..=0xDF => "OEM",
        0xE0..=0xEF => "DEBUG",
        file_type::FFS_PAD => "FFS_PAD",
        0xF1..=0xFF => "FFS",
        _ => "UNKNOWN",
    }
}

/// `AuthenticationStatus` returned by `ReadFile` and `ReadSection`.
///
/// The low bits describe the section itself, the same bits shifted by 16
/// aggregate the status of every enclosing section.
#[bitfield(u32)]
#[derive(Eq, PartialEq)]
pub struct AuthenticationStatus {
    /// Bit 0: a platform policy overrode the outcome.
    pub platform_override: bool,
    /// Bit 1: the image carries a signature.
    pub image_signed: bool,
    /// Bit 2: the signature was not checked.
    pub not_tested: bool,
    /// Bit 3: the signature check failed.
    pub test_failed: bool,
    #[bits(12)]
    __: u16,
    /// Bits 16-19: the aggregated status of enclosing sections.
    #[bits(4)]
    pub aggregate: u8,
    #[bits(12)]
    __: u16,
}

impl fmt::Display for AuthenticationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (self.platform_override(), "PLATFORM_OVERRIDE"),
            (self.image_signed(), "IMAGE_SIGNED"),
            (self.not_tested(), "NOT_TESTED"),
            (self.test_failed(), "TEST_FAILED"),
        ];
        let mut first = true;
        for (_, name) in names.into_iter().filter(|(set, _)| *set) {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(name)?;
            first = false;
        }
        if first {
            f.write_str("NONE")?;
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum FfsError {
    #[error("section header at offset {0} is truncated")]
    TruncatedHeader(usize),
    #[error("section at offset {offset} has invalid size {size:#x}")]
    InvalidSize { offset: usize, size: u32 },
}

/// A section inside an FFS file.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Section<'a> {
    pub ty: u8,
    /// Offset of the section header within the file.
    pub offset: usize,
    /// Section size including the header.
    pub size: u32,
    /// Section contents after the header.
    pub data: &'a [u8],
}

impl Section<'_> {
    /// The file name stored in a `USER_INTERFACE` section.
    #[must_use]
    pub fn user_interface(&self) -> Option<String> {
        if self.ty != section_type::USER_INTERFACE {
            return None;
        }
        ucs2::decode_bytes(self.data).map(|(s, _)| s)
    }

    /// Build number and version string of a `VERSION` section.
    #[must_use]
    pub fn version(&self) -> Option<(u16, String)> {
        if self.ty != section_type::VERSION {
            return None;
        }
        let build = read_u16(self.data, 0)?;
        let (text, _) = ucs2::decode_bytes(&self.data[2..])?;
        Some((build, text))
    }
}

/// Walks the sections of a file image.
pub struct Sections<'a> {
    bytes: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> Sections<'a> {
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: 0,
            failed: false,
        }
    }
}

impl<'a> Iterator for Sections<'a> {
    type Item = Result<Section<'a>, FfsError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.bytes.len() {
            return None;
        }
        let offset = self.offset;
        let result = parse_section(self.bytes, offset);
        match result {
            Ok(section) => {
                let end = offset + section.size as usize;
                self.offset = end.next_multiple_of(4);
            }
            Err(_) => self.failed = true,
        }
        Some(result)
    }
}

fn parse_section(bytes: &[u8], offset: usize) -> Result<Section<'_>, FfsError> {
    let header = read_u32(bytes, offset).ok_or(FfsError::TruncatedHeader(offset))?;
    let ty = header.to_le_bytes()[3];
    let mut size = header & 0x00FF_FFFF;
    let mut header_len = 4;
    if size == 0x00FF_FFFF {
        size = read_u32(bytes, offset + 4).ok_or(FfsError::TruncatedHeader(offset))?;
        header_len = 8;
    }

    let invalid = FfsError::InvalidSize { offset, size };
    let len = usize::try_from(size).map_err(|_| invalid)?;
    if len < header_len {
        return Err(invalid);
    }
    let data = bytes
        .get(offset + header_len..offset + len)
        .ok_or(invalid)?;
    Ok(Section {
        ty,
        offset,
        size,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn section(ty: u8, payload: &[u8]) -> Vec<u8> {
        let size = u32::try_from(payload.len() + 4).unwrap();
        let mut out = size.to_le_bytes()[..3].to_vec();
        out.push(ty);
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn names() {
        assert_eq!(section_type_name(section_type::PE32), "PE32");
        assert_eq!(section_type_name(section_type::USER_INTERFACE), "USER_INTERFACE");
        assert_eq!(section_type_name(0x42), "UNKNOWN");
        assert_eq!(parse_section_type("UI"), Some(section_type::USER_INTERFACE));
        assert_eq!(parse_section_type("COMPRESS"), Some(section_type::COMPRESSION));
        assert_eq!(parse_section_type("USER_INTERFACE"), None);
        assert_eq!(file_type_name(file_type::DRIVER), "DRIVER");
        assert_eq!(file_type_name(0xC5), "OEM");
        assert_eq!(file_type_name(0xE1), "DEBUG");
        assert_eq!(file_type_name(0xF0), "FFS_PAD");
        assert_eq!(file_type_name(0xF7), "FFS");
        assert_eq!(file_type_name(0x20), "UNKNOWN");
    }

    #[test]
    fn walks_aligned_sections() {
        let mut file = section(section_type::PE32, &[0xAA; 5]);
        file.extend_from_slice(&[0, 0, 0]); // pad to 4
        file.extend_from_slice(&section(section_type::USER_INTERFACE, &ucs2::encode_bytes("Shell")));

        let sections: Vec<_> = Sections::new(&file).collect::<Result<_, _>>().unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].ty, section_type::PE32);
        assert_eq!(sections[0].size, 9);
        assert_eq!(sections[0].data, &[0xAA; 5]);
        assert_eq!(sections[1].offset, 12);
        assert_eq!(sections[1].user_interface().as_deref(), Some("Shell"));
        assert_eq!(sections[0].user_interface(), None);
    }

    #[test]
    fn extended_size_header() {
        let mut file = vec![0xFF, 0xFF, 0xFF, section_type::RAW];
        file.extend_from_slice(&10u32.to_le_bytes());
        file.extend_from_slice(&[1, 2]);
        let section = Sections::new(&file).next().unwrap().unwrap();
        assert_eq!(section.size, 10);
        assert_eq!(section.data, &[1, 2]);
    }

    #[test]
    fn version_section() {
        let mut payload = 7u16.to_le_bytes().to_vec();
        payload.extend_from_slice(&ucs2::encode_bytes("1.0"));
        let file = section(section_type::VERSION, &payload);
        let section = Sections::new(&file).next().unwrap().unwrap();
        assert_eq!(section.version(), Some((7, String::from("1.0"))));
    }

    #[test]
    fn invalid_sections_stop_iteration() {
        let file = [2, 0, 0, section_type::RAW, 0, 0];
        let mut it = Sections::new(&file);
        assert_eq!(
            it.next(),
            Some(Err(FfsError::InvalidSize { offset: 0, size: 2 }))
        );
        assert_eq!(it.next(), None);

        let file = [0x10, 0, 0, section_type::RAW];
        assert_eq!(
            Sections::new(&file).next(),
            Some(Err(FfsError::InvalidSize { offset: 0, size: 0x10 }))
        );
        assert_eq!(
            Sections::new(&[1, 2]).next(),
            Some(Err(FfsError::TruncatedHeader(0)))
        );
    }

    #[test]
    fn authentication_status() {
        let signed = AuthenticationStatus::from_bits(0x0002_0006);
        assert!(signed.image_signed());
        assert!(signed.not_tested());
        assert!(!signed.test_failed());
        assert_eq!(signed.aggregate(), 0x2);
        assert_eq!(alloc::format!("{signed}"), "IMAGE_SIGNED|NOT_TESTED");
        assert_eq!(alloc::format!("{}", AuthenticationStatus::new()), "NONE");
    }
}
