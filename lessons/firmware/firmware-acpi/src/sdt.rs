//! # System Description Tables
//!
//! Every ACPI table except the RSDP and the FACS starts with the same
//! 36-byte description header. The XSDT and RSDT bodies are arrays of
//! physical table addresses, 64 and 32 bits wide respectively.

use crate::rsdp::AcpiRoots;
use crate::{AcpiError, PhysMapRo, le, sum};
use alloc::vec::Vec;
use core::fmt;

/// Size of the common description header.
pub const HEADER_LEN: usize = 36;

/// A four character table signature such as `FACP` or `BGRT`.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Signature(pub [u8; 4]);

impl Signature {
    pub const XSDT: Self = Self(*b"XSDT");
    pub const RSDT: Self = Self(*b"RSDT");
    pub const BGRT: Self = Self(*b"BGRT");

    /// File name used when a table is saved, e.g. `FACP.aml`.
    #[must_use]
    pub fn file_name(&self) -> alloc::string::String {
        alloc::format!("{self}.aml")
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = if b.is_ascii_graphic() || b == b' ' { char::from(b) } else { '?' };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

/// The common description header.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SdtHeader {
    pub signature: Signature,
    /// Length of the whole table including this header.
    pub length: u32,
    pub revision: u8,
    pub checksum: u8,
    pub oem_id: [u8; 6],
    pub oem_table_id: [u8; 8],
    pub oem_revision: u32,
    pub creator_id: [u8; 4],
    pub creator_revision: u32,
}

impl SdtHeader {
    /// Decodes the header at the start of `bytes`.
    ///
    /// # Errors
    /// Fails if fewer than [`HEADER_LEN`] bytes are available.
    pub fn parse(bytes: &[u8]) -> Result<Self, AcpiError> {
        let truncated = AcpiError::Truncated("description header");
        if bytes.len() < HEADER_LEN {
            return Err(truncated);
        }
        Ok(Self {
            signature: Signature(le(bytes, 0).ok_or(truncated)?),
            length: u32::from_le_bytes(le(bytes, 4).ok_or(truncated)?),
            revision: bytes[8],
            checksum: bytes[9],
            oem_id: le(bytes, 10).ok_or(truncated)?,
            oem_table_id: le(bytes, 16).ok_or(truncated)?,
            oem_revision: u32::from_le_bytes(le(bytes, 24).ok_or(truncated)?),
            creator_id: le(bytes, 28).ok_or(truncated)?,
            creator_revision: u32::from_le_bytes(le(bytes, 32).ok_or(truncated)?),
        })
    }
}

/// Verifies the byte sum of a complete table.
#[must_use]
pub fn checksum_valid(table: &[u8]) -> bool {
    sum(table) == 0
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RootKind {
    /// 64-bit entries.
    Xsdt,
    /// 32-bit entries.
    Rsdt,
}

impl RootKind {
    #[must_use]
    pub const fn signature(self) -> Signature {
        match self {
            Self::Xsdt => Signature::XSDT,
            Self::Rsdt => Signature::RSDT,
        }
    }

    const fn entry_len(self) -> usize {
        match self {
            Self::Xsdt => 8,
            Self::Rsdt => 4,
        }
    }
}

/// Table addresses listed in the body of an XSDT or RSDT.
///
/// # Errors
/// Fails if the signature does not match `kind` or the table is truncated.
pub fn root_entries(table: &[u8], kind: RootKind) -> Result<Vec<u64>, AcpiError> {
    let header = SdtHeader::parse(table)?;
    if header.signature != kind.signature() {
        return Err(AcpiError::InvalidSignature {
            expected: match kind {
                RootKind::Xsdt => "XSDT",
                RootKind::Rsdt => "RSDT",
            },
        });
    }
    let body = table
        .get(HEADER_LEN..header.length as usize)
        .ok_or(AcpiError::Truncated("root table"))?;
    Ok(body
        .chunks_exact(kind.entry_len())
        .map(|entry| {
            let mut raw = [0u8; 8];
            raw[..entry.len()].copy_from_slice(entry);
            u64::from_le_bytes(raw)
        })
        .collect())
}

/// A table referenced from the root table.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Table {
    pub address: u64,
    pub header: SdtHeader,
}

impl Table {
    /// Maps the whole table including its header.
    ///
    /// # Safety
    /// `map` must be able to map the table's address range.
    #[must_use]
    pub unsafe fn bytes<'a>(&self, map: &impl PhysMapRo) -> &'a [u8] {
        unsafe { map.map_ro(self.address, self.header.length as usize) }
    }
}

/// Maps a full table at `address`: header first, then `length` bytes.
///
/// # Safety
/// `map` must be able to map the table's address range.
unsafe fn map_table<'a>(map: &impl PhysMapRo, address: u64) -> Result<&'a [u8], AcpiError> {
    if address == 0 {
        return Err(AcpiError::NullAddress);
    }
    let header = SdtHeader::parse(unsafe { map.map_ro(address, HEADER_LEN) })?;
    let bytes = unsafe { map.map_ro(address, header.length as usize) };
    if bytes.len() < header.length as usize {
        return Err(AcpiError::Truncated("table"));
    }
    Ok(bytes)
}

/// Lists every table referenced from the XSDT, or from the RSDT on ACPI 1.0
/// systems.
///
/// # Errors
/// Fails if the root table is missing or malformed. Individual entries with
/// a null address are skipped.
///
/// # Safety
/// `map` must be able to map all table addresses.
pub unsafe fn tables(map: &impl PhysMapRo, roots: &AcpiRoots) -> Result<Vec<Table>, AcpiError> {
    let (root_addr, kind) = roots.root().ok_or(AcpiError::NullAddress)?;
    let root = unsafe { map_table(map, root_addr)? };
    let mut out = Vec::new();
    for address in root_entries(root, kind)? {
        if address == 0 {
            continue;
        }
        let header = SdtHeader::parse(unsafe { map.map_ro(address, HEADER_LEN) })?;
        out.push(Table { address, header });
    }
    Ok(out)
}

/// Finds the first table carrying `signature`.
///
/// # Errors
/// See [`tables`].
///
/// # Safety
/// See [`tables`].
pub unsafe fn find_table(
    map: &impl PhysMapRo,
    roots: &AcpiRoots,
    signature: Signature,
) -> Result<Option<Table>, AcpiError> {
    let tables = unsafe { tables(map, roots)? };
    Ok(tables.into_iter().find(|t| t.header.signature == signature))
}

/// Builds a table with a valid checksum for tests in this crate.
#[cfg(test)]
pub(crate) fn build(signature: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(signature);
    bytes.extend_from_slice(&u32::try_from(HEADER_LEN + body.len()).unwrap().to_le_bytes());
    bytes.push(1);
    bytes.push(0);
    bytes.extend_from_slice(b"BOCHS ");
    bytes.extend_from_slice(b"BXPC    ");
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(b"BXPC");
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(body);
    crate::testing::fix_checksum(&mut bytes, 9);
    bytes
}
