//! # SMBIOS
//!
//! The System Management BIOS table describes the platform: firmware vendor
//! and version, system and board identity, processors, memory devices and
//! slots. The firmware publishes an entry point structure through the UEFI
//! configuration table; the entry point in turn locates the structure table.
//!
//! ```text
//! EFI_SYSTEM_TABLE.ConfigurationTable (SMBIOS / SMBIOS3 GUID)
//!     ↓
//! Entry point ("_SM_" + "_DMI_", or "_SM3_")
//!     ↓
//! Structure table: header | formatted area | "str1\0str2\0\0" | header ...
//!     ↓
//! End-of-table structure (type 127)
//! ```
//!
//! * [`entry`]: the 32-bit and 64-bit entry points with checksum validation.
//! * [`structure`]: walking structures and resolving their strings.
//! * [`records`]: decoded BIOS, system and baseboard information plus the
//!   names of all standard structure types.

#![cfg_attr(not(any(test, doctest)), no_std)]
extern crate alloc;

pub mod entry;
pub mod records;
pub mod structure;

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum SmbiosError {
    #[error("no SMBIOS anchor string")]
    InvalidAnchor,
    #[error("checksum mismatch in the {0} entry point")]
    Checksum(&'static str),
    #[error("entry point is truncated")]
    TruncatedEntryPoint,
    #[error("structure at offset {0} is truncated")]
    TruncatedStructure(usize),
    #[error("structure type {ty} is shorter than its fields ({length} bytes)")]
    ShortStructure { ty: u8, length: u8 },
}

fn sum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |a, &b| a.wrapping_add(b))
}
