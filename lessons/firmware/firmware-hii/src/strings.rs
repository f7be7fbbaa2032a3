//! String packages and the package lists that carry them.
//!
//! A string package starts with `EFI_HII_STRING_PACKAGE_HDR`:
//!
//! ```text
//! 0x00  EFI_HII_PACKAGE_HEADER Header
//! 0x04  UINT32  HdrSize
//! 0x08  UINT32  StringInfoOffset
//! 0x0C  CHAR16  LanguageWindow[16]
//! 0x2C  UINT16  LanguageName        string id of the language's own name
//! 0x2E  CHAR8   Language[]          NUL-terminated ASCII, e.g. "en-US"
//! ```
//!
//! followed by string information blocks. Every block begins with a one-byte
//! type; string ids are assigned implicitly, starting at 1, in block order.

use crate::package::{PACKAGE_HEADER_LEN, PACKAGE_LIST_HEADER_LEN, PackageHeader, package_type};
use alloc::string::String;
use alloc::vec::Vec;
use firmware_types::{Guid, read_u16, read_u32, ucs2};

/// Offset of `Language` inside the string package header.
pub const LANGUAGE_OFFSET: usize = 0x2E;

/// String information block types.
pub mod block_type {
    pub const END: u8 = 0x00;
    pub const STRING_SCSU: u8 = 0x10;
    pub const STRING_SCSU_FONT: u8 = 0x11;
    pub const STRINGS_SCSU: u8 = 0x12;
    pub const STRINGS_SCSU_FONT: u8 = 0x13;
    pub const STRING_UCS2: u8 = 0x14;
    pub const STRING_UCS2_FONT: u8 = 0x15;
    pub const STRINGS_UCS2: u8 = 0x16;
    pub const STRINGS_UCS2_FONT: u8 = 0x17;
    pub const DUPLICATE: u8 = 0x20;
    pub const SKIP2: u8 = 0x21;
    pub const SKIP1: u8 = 0x22;
    pub const EXT1: u8 = 0x30;
    pub const EXT2: u8 = 0x31;
    pub const EXT4: u8 = 0x32;
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum StringPackageError {
    #[error("not a string package")]
    NotAStringPackage,
    #[error("string package header is truncated")]
    TruncatedHeader,
    #[error("string block at offset {0} is truncated")]
    TruncatedBlock(usize),
    #[error("unsupported string block type {ty:#04x} at offset {offset}")]
    UnsupportedBlock { offset: usize, ty: u8 },
    #[error("string package has no end block")]
    MissingEnd,
}

/// Builds a string package holding UCS-2 strings for one language.
#[derive(Debug, Clone)]
pub struct StringPackageBuilder {
    language: String,
    strings: Vec<String>,
}

impl StringPackageBuilder {
    #[must_use]
    pub fn new(language: &str) -> Self {
        Self {
            language: String::from(language),
            strings: Vec::new(),
        }
    }

    /// Adds the next string; its id is its 1-based position.
    pub fn push(&mut self, s: &str) -> u16 {
        self.strings.push(String::from(s));
        u16::try_from(self.strings.len()).unwrap_or(u16::MAX)
    }

    #[must_use]
    pub fn build(&self) -> Vec<u8> {
        let header_len = LANGUAGE_OFFSET + self.language.len() + 1;
        let mut out = Vec::with_capacity(header_len + 64);
        out.extend_from_slice(&[0; PACKAGE_HEADER_LEN]);
        out.extend_from_slice(&len_u32(header_len).to_le_bytes());
        out.extend_from_slice(&len_u32(header_len).to_le_bytes());
        out.extend_from_slice(&[0; 32]);
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(self.language.as_bytes());
        out.push(0);

        for s in &self.strings {
            out.push(block_type::STRING_UCS2);
            out.extend_from_slice(&ucs2::encode_bytes(s));
        }
        out.push(block_type::END);

        let header = PackageHeader::new()
            .with_length(len_u32(out.len()))
            .with_ty(package_type::STRINGS);
        out[..PACKAGE_HEADER_LEN].copy_from_slice(&header.into_bits().to_le_bytes());
        out
    }
}

/// Builds an `EFI_HII_PACKAGE_LIST_HEADER` followed by packages and the
/// terminating end package.
#[derive(Debug, Clone)]
pub struct PackageListBuilder {
    guid: Guid,
    packages: Vec<u8>,
}

impl PackageListBuilder {
    #[must_use]
    pub const fn new(guid: Guid) -> Self {
        Self {
            guid,
            packages: Vec::new(),
        }
    }

    pub fn push_package(&mut self, package: &[u8]) -> &mut Self {
        self.packages.extend_from_slice(package);
        self
    }

    #[must_use]
    pub fn build(&self) -> Vec<u8> {
        let len = PACKAGE_LIST_HEADER_LEN + self.packages.len() + PACKAGE_HEADER_LEN;
        let end = PackageHeader::new()
            .with_length(len_u32(PACKAGE_HEADER_LEN))
            .with_ty(package_type::END);

        let mut out = Vec::with_capacity(len);
        out.extend_from_slice(&self.guid.to_bytes());
        out.extend_from_slice(&len_u32(len).to_le_bytes());
        out.extend_from_slice(&self.packages);
        out.extend_from_slice(&end.into_bits().to_le_bytes());
        out
    }
}

/// Whether the `;` separated `languages` returned by `GetLanguages` hold
/// `language`. RFC 4646 tags compare case-insensitively.
#[must_use]
pub fn has_language(languages: &str, language: &str) -> bool {
    languages
        .split(';')
        .any(|tag| tag.trim().eq_ignore_ascii_case(language))
}

#[allow(clippy::cast_possible_truncation)]
const fn len_u32(len: usize) -> u32 {
    len as u32
}

/// A decoded string package.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StringPackage {
    pub language: String,
    /// Strings by id in ascending order. Skipped ids are absent.
    pub strings: Vec<(u16, String)>,
}

impl StringPackage {
    /// Decodes a complete string package including its package header.
    ///
    /// # Errors
    /// Fails on other package types, truncated data and unknown block types.
    pub fn parse(package: &[u8]) -> Result<Self, StringPackageError> {
        let raw = read_u32(package, 0).ok_or(StringPackageError::TruncatedHeader)?;
        if PackageHeader::from_bits(raw).ty() != package_type::STRINGS {
            return Err(StringPackageError::NotAStringPackage);
        }
        let info_offset =
            read_u32(package, 8).ok_or(StringPackageError::TruncatedHeader)? as usize;
        let language = package
            .get(LANGUAGE_OFFSET..)
            .and_then(|tail| tail.iter().position(|&b| b == 0).map(|n| &tail[..n]))
            .ok_or(StringPackageError::TruncatedHeader)?;
        let language = language.iter().map(|&b| char::from(b)).collect();

        let mut strings = Vec::new();
        let mut id: u16 = 1;
        let mut offset = info_offset;
        loop {
            let truncated = StringPackageError::TruncatedBlock(offset);
            let ty = *package.get(offset).ok_or(StringPackageError::MissingEnd)?;
            match ty {
                block_type::END => break,
                block_type::STRING_UCS2 | block_type::STRING_UCS2_FONT => {
                    let start = offset + 1 + usize::from(ty == block_type::STRING_UCS2_FONT);
                    let (s, len) = package
                        .get(start..)
                        .and_then(ucs2::decode_bytes)
                        .ok_or(truncated)?;
                    strings.push((id, s));
                    id = id.wrapping_add(1);
                    offset = start + len;
                }
                block_type::STRINGS_UCS2 | block_type::STRINGS_UCS2_FONT => {
                    let count_at = offset + 1 + usize::from(ty == block_type::STRINGS_UCS2_FONT);
                    let count = read_u16(package, count_at).ok_or(truncated)?;
                    offset = count_at + 2;
                    for _ in 0..count {
                        let (s, len) = package
                            .get(offset..)
                            .and_then(ucs2::decode_bytes)
                            .ok_or(StringPackageError::TruncatedBlock(offset))?;
                        strings.push((id, s));
                        id = id.wrapping_add(1);
                        offset += len;
                    }
                }
                block_type::STRING_SCSU | block_type::STRING_SCSU_FONT => {
                    let start = offset + 1 + usize::from(ty == block_type::STRING_SCSU_FONT);
                    let (s, len) = scsu_string(package, start).ok_or(truncated)?;
                    strings.push((id, s));
                    id = id.wrapping_add(1);
                    offset = start + len;
                }
                block_type::STRINGS_SCSU | block_type::STRINGS_SCSU_FONT => {
                    let count_at = offset + 1 + usize::from(ty == block_type::STRINGS_SCSU_FONT);
                    let count = read_u16(package, count_at).ok_or(truncated)?;
                    offset = count_at + 2;
                    for _ in 0..count {
                        let (s, len) = scsu_string(package, offset)
                            .ok_or(StringPackageError::TruncatedBlock(offset))?;
                        strings.push((id, s));
                        id = id.wrapping_add(1);
                        offset += len;
                    }
                }
                block_type::DUPLICATE => {
                    let source = read_u16(package, offset + 1).ok_or(truncated)?;
                    if let Some((_, s)) = strings.iter().find(|(i, _)| *i == source) {
                        let s = s.clone();
                        strings.push((id, s));
                    }
                    id = id.wrapping_add(1);
                    offset += 3;
                }
                block_type::SKIP2 => {
                    let skip = read_u16(package, offset + 1).ok_or(truncated)?;
                    id = id.wrapping_add(skip);
                    offset += 3;
                }
                block_type::SKIP1 => {
                    let skip = *package.get(offset + 1).ok_or(truncated)?;
                    id = id.wrapping_add(u16::from(skip));
                    offset += 2;
                }
                block_type::EXT1 => {
                    let len = *package.get(offset + 2).ok_or(truncated)?;
                    offset += usize::from(len).max(3);
                }
                block_type::EXT2 => {
                    let len = read_u16(package, offset + 2).ok_or(truncated)?;
                    offset += usize::from(len).max(4);
                }
                block_type::EXT4 => {
                    let len = read_u32(package, offset + 2).ok_or(truncated)?;
                    offset += (len as usize).max(6);
                }
                _ => return Err(StringPackageError::UnsupportedBlock { offset, ty }),
            }
        }

        Ok(Self { language, strings })
    }

    #[must_use]
    pub fn get(&self, id: u16) -> Option<&str> {
        self.strings
            .iter()
            .find(|(i, _)| *i == id)
            .map(|(_, s)| s.as_str())
    }
}

/// Reads a NUL-terminated single-byte string. Only the ASCII subset of SCSU
/// is decoded faithfully.
fn scsu_string(bytes: &[u8], start: usize) -> Option<(String, usize)> {
    let tail = bytes.get(start..)?;
    let len = tail.iter().position(|&b| b == 0)?;
    Some((tail[..len].iter().map(|&b| char::from(b)).collect(), len + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::PackageList;
    use firmware_types::guid;

    #[test]
    fn string_package_layout() {
        let mut en = StringPackageBuilder::new("en-US");
        assert_eq!(en.push("English"), 1);
        assert_eq!(en.push("Hello"), 2);
        let bytes = en.build();

        let header_len = LANGUAGE_OFFSET + "en-US".len() + 1;
        assert_eq!(read_u32(&bytes, 4), Some(u32::try_from(header_len).unwrap()));
        assert_eq!(read_u32(&bytes, 8), Some(u32::try_from(header_len).unwrap()));
        assert_eq!(read_u16(&bytes, 0x2C), Some(1));
        assert_eq!(&bytes[LANGUAGE_OFFSET..header_len], b"en-US\0");
        assert_eq!(bytes[header_len], block_type::STRING_UCS2);
        assert_eq!(*bytes.last().unwrap(), block_type::END);

        let expected = header_len + (1 + 8 * 2) + (1 + 6 * 2) + 1;
        let header = PackageHeader::from_bits(read_u32(&bytes, 0).unwrap());
        assert_eq!(header.length() as usize, expected);
        assert_eq!(header.ty(), package_type::STRINGS);
    }

    #[test]
    fn reads_back_built_package() {
        let mut fr = StringPackageBuilder::new("fr-FR");
        fr.push("French");
        fr.push("Bonjour");
        let parsed = StringPackage::parse(&fr.build()).unwrap();
        assert_eq!(parsed.language, "fr-FR");
        assert_eq!(parsed.get(1), Some("French"));
        assert_eq!(parsed.get(2), Some("Bonjour"));
        assert_eq!(parsed.get(3), None);
    }

    #[test]
    fn skip_and_duplicate_blocks() {
        let mut bytes = StringPackageBuilder::new("en").build();
        bytes.pop();
        bytes.push(block_type::SKIP1);
        bytes.push(2);
        bytes.push(block_type::STRING_UCS2);
        bytes.extend_from_slice(&ucs2::encode_bytes("Third"));
        bytes.push(block_type::DUPLICATE);
        bytes.extend_from_slice(&3u16.to_le_bytes());
        bytes.push(block_type::STRINGS_SCSU);
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(b"a\0b\0");
        bytes.push(block_type::END);

        let parsed = StringPackage::parse(&bytes).unwrap();
        assert_eq!(
            parsed.strings,
            [
                (3, String::from("Third")),
                (4, String::from("Third")),
                (5, String::from("a")),
                (6, String::from("b")),
            ]
        );
    }

    #[test]
    fn rejects_bad_packages() {
        let mut bytes = StringPackageBuilder::new("en").build();
        bytes.pop();
        assert_eq!(StringPackage::parse(&bytes), Err(StringPackageError::MissingEnd));

        let end = PackageHeader::new().with_length(4).with_ty(package_type::END);
        assert_eq!(
            StringPackage::parse(&end.into_bits().to_le_bytes()),
            Err(StringPackageError::NotAStringPackage)
        );
    }

    #[test]
    fn package_list_has_end_package() {
        let guid = guid!("8f6b4d5c-8d0a-4e6b-9a57-a11f6d3c21ab");
        let mut en = StringPackageBuilder::new("en-US");
        en.push("English");
        let package = en.build();
        let list = PackageListBuilder::new(guid).push_package(&package).build();

        assert_eq!(list.len(), 20 + package.len() + 4);
        assert_eq!(&list[list.len() - 4..], &[4, 0, 0, 0xDF]);
        let parsed = PackageList::parse(&list).unwrap();
        assert_eq!(parsed.guid, guid);
        assert_eq!(parsed.packages().count(), 2);
    }

    #[test]
    fn language_lists() {
        assert!(has_language("en;fr;en-US;fr-FR", "fr-FR"));
        assert!(has_language("en-US;FR-fr", "fr-FR"));
        assert!(!has_language("en;fr;en-US", "fr-FR"));
        assert!(!has_language("en-US;fr-FR-x", "fr-FR"));
        assert!(!has_language("", "en-US"));
    }
}
