//! HII package lists as exported by `EFI_HII_DATABASE_PROTOCOL.ExportPackageLists`.
//!
//! ```text
//! EFI_HII_PACKAGE_LIST_HEADER  { EFI_GUID PackageListGuid; UINT32 PackageLength; }
//!   EFI_HII_PACKAGE_HEADER     { UINT32 Length:24; UINT32 Type:8; }  data...
//!   EFI_HII_PACKAGE_HEADER     ...
//!   EFI_HII_PACKAGE_HEADER     END
//! EFI_HII_PACKAGE_LIST_HEADER  next list
//! ```

use alloc::string::String;
use bitfield_struct::bitfield;
use firmware_types::{Guid, read_guid, read_u32};

/// Size of `EFI_HII_PACKAGE_LIST_HEADER`.
pub const PACKAGE_LIST_HEADER_LEN: usize = 20;
/// Size of `EFI_HII_PACKAGE_HEADER`.
pub const PACKAGE_HEADER_LEN: usize = 4;

/// Package types.
pub mod package_type {
    pub const ALL: u8 = 0x00;
    pub const GUID: u8 = 0x01;
    pub const FORMS: u8 = 0x02;
    pub const STRINGS: u8 = 0x04;
    pub const FONTS: u8 = 0x05;
    pub const IMAGES: u8 = 0x06;
    pub const SIMPLE_FONTS: u8 = 0x07;
    pub const DEVICE_PATH: u8 = 0x08;
    pub const KEYBOARD_LAYOUT: u8 = 0x09;
    pub const ANIMATIONS: u8 = 0x0A;
    pub const END: u8 = 0xDF;
    pub const SYSTEM_BEGIN: u8 = 0xE0;
    pub const SYSTEM_END: u8 = 0xFF;
}

#[must_use]
pub const fn package_type_name(ty: u8) -> &'static str {
    match ty {
        package_type::ALL => "ALL",
        package_type::GUID => "GUID",
        package_type::FORMS => "FORMS",
        package_type::STRINGS => "STRINGS",
        package_type::FONTS => "FONTS",
        package_type::IMAGES => "IMAGES",
        package_type::SIMPLE_FONTS => "SIMPLE_FONTS",
        package_type::DEVICE_PATH => "DEVICE_PATH",
        package_type::KEYBOARD_LAYOUT => "KEYBOARD_LAYOUT",
        package_type::ANIMATIONS => "ANIMATIONS",
        package_type::END => "END",
        package_type::SYSTEM_BEGIN => "SYSTEM_BEGIN",
        package_type::SYSTEM_END => "SYSTEM_END",
        _ => "UNKNOWN",
    }
}

/// `EFI_HII_PACKAGE_HEADER`.
#[bitfield(u32)]
#[derive(Eq, PartialEq)]
pub struct PackageHeader {
    /// Bits 0–23: package length including this header.
    #[bits(24)]
    pub length: u32,
    /// Bits 24–31: package type.
    #[bits(8)]
    pub ty: u8,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum PackageError {
    #[error("package list at offset {0} is truncated")]
    TruncatedList(usize),
    #[error("package at offset {0} is truncated")]
    TruncatedPackage(usize),
    #[error("package at offset {0} has a length shorter than its header")]
    InvalidPackageLength(usize),
}

/// A package list borrowed from an export buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PackageList<'a> {
    pub guid: Guid,
    /// The complete list including its header.
    pub bytes: &'a [u8],
}

impl<'a> PackageList<'a> {
    /// Parses the list at the start of `bytes`.
    ///
    /// # Errors
    /// Fails if the header or the declared length does not fit.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, PackageError> {
        let guid = read_guid(bytes, 0).ok_or(PackageError::TruncatedList(0))?;
        let length = read_u32(bytes, 16).ok_or(PackageError::TruncatedList(0))? as usize;
        if length < PACKAGE_LIST_HEADER_LEN {
            return Err(PackageError::TruncatedList(0));
        }
        let bytes = bytes.get(..length).ok_or(PackageError::TruncatedList(0))?;
        Ok(Self { guid, bytes })
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn length(&self) -> u32 {
        self.bytes.len() as u32
    }

    #[must_use]
    pub fn packages(&self) -> Packages<'a> {
        Packages {
            bytes: self.bytes,
            offset: PACKAGE_LIST_HEADER_LEN,
            failed: false,
        }
    }

    /// File name used when saving the list, e.g. `0003_<guid>`.
    #[must_use]
    pub fn file_name(&self, index: usize) -> String {
        alloc::format!("{index:04}_{}", self.guid)
    }
}

/// Iterator over the package lists in an export buffer.
///
/// Iteration ends at the end of the buffer or at a list with zero length.
pub struct PackageLists<'a> {
    bytes: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> PackageLists<'a> {
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: 0,
            failed: false,
        }
    }
}

impl<'a> Iterator for PackageLists<'a> {
    type Item = Result<PackageList<'a>, PackageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.bytes.len() {
            return None;
        }
        if read_u32(&self.bytes[self.offset..], 16) == Some(0) {
            return None;
        }
        match PackageList::parse(&self.bytes[self.offset..]) {
            Ok(list) => {
                self.offset += list.bytes.len();
                Some(Ok(list))
            }
            Err(_) => {
                self.failed = true;
                Some(Err(PackageError::TruncatedList(self.offset)))
            }
        }
    }
}

/// A single package inside a list.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Package<'a> {
    pub header: PackageHeader,
    /// The complete package including its header.
    pub bytes: &'a [u8],
}

impl<'a> Package<'a> {
    #[must_use]
    pub const fn ty(&self) -> u8 {
        self.header.ty()
    }

    /// Package contents after the generic header.
    #[must_use]
    pub fn body(&self) -> &'a [u8] {
        &self.bytes[PACKAGE_HEADER_LEN..]
    }
}

/// Iterator over the packages of a [`PackageList`].
pub struct Packages<'a> {
    bytes: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> Iterator for Packages<'a> {
    type Item = Result<Package<'a>, PackageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.bytes.len() {
            return None;
        }
        let offset = self.offset;
        let Some(raw) = read_u32(self.bytes, offset) else {
            self.failed = true;
            return Some(Err(PackageError::TruncatedPackage(offset)));
        };
        let header = PackageHeader::from_bits(raw);
        let len = header.length() as usize;
        if len < PACKAGE_HEADER_LEN {
            self.failed = true;
            return Some(Err(PackageError::InvalidPackageLength(offset)));
        }
        let Some(bytes) = self.bytes.get(offset..offset + len) else {
            self.failed = true;
            return Some(Err(PackageError::TruncatedPackage(offset)));
        };
        self.offset += len;
        Some(Ok(Package { header, bytes }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strings::{PackageListBuilder, StringPackageBuilder};
    use alloc::vec::Vec;
    use firmware_types::guid;

    const LIST_GUID: Guid = guid!("a04a27f4-df00-4d42-b552-39511302113d");

    fn sample_list() -> Vec<u8> {
        let mut en = StringPackageBuilder::new("en-US");
        en.push("English");
        let mut builder = PackageListBuilder::new(LIST_GUID);
        builder.push_package(&en.build());
        builder.build()
    }

    #[test]
    fn header_bits() {
        let header = PackageHeader::from_bits(0xDF00_0004);
        assert_eq!(header.length(), 4);
        assert_eq!(header.ty(), package_type::END);
        let built = PackageHeader::new().with_length(0x12345).with_ty(4);
        assert_eq!(built.into_bits(), 0x0401_2345);
    }

    #[test]
    fn type_names() {
        assert_eq!(package_type_name(package_type::FORMS), "FORMS");
        assert_eq!(package_type_name(package_type::STRINGS), "STRINGS");
        assert_eq!(package_type_name(0xDF), "END");
        assert_eq!(package_type_name(0x42), "UNKNOWN");
    }

    #[test]
    fn walks_lists_and_packages() {
        let mut db = sample_list();
        db.extend_from_slice(&sample_list());

        let lists: Vec<_> = PackageLists::new(&db).collect::<Result<_, _>>().unwrap();
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].guid, LIST_GUID);
        assert_eq!(lists[0].length() as usize, db.len() / 2);

        let types: Vec<_> = lists[1].packages().map(|p| p.unwrap().ty()).collect();
        assert_eq!(types, [package_type::STRINGS, package_type::END]);
        assert_eq!(
            lists[0].file_name(3),
            "0003_a04a27f4-df00-4d42-b552-39511302113d"
        );
    }

    #[test]
    fn zero_length_list_ends_iteration() {
        let mut db = sample_list();
        db.extend_from_slice(&[0u8; 20]);
        assert_eq!(PackageLists::new(&db).count(), 1);
    }

    #[test]
    fn malformed_packages() {
        let mut list = sample_list();
        // corrupt the first package length to 2
        let short = PackageHeader::new().with_length(2).with_ty(4);
        list[20..24].copy_from_slice(&short.into_bits().to_le_bytes());
        let parsed = PackageList::parse(&list).unwrap();
        let mut packages = parsed.packages();
        assert_eq!(packages.next(), Some(Err(PackageError::InvalidPackageLength(20))));
        assert_eq!(packages.next(), None);

        let whole = sample_list();
        assert_eq!(
            PackageLists::new(&whole[..30]).next(),
            Some(Err(PackageError::TruncatedList(0)))
        );
    }
}
