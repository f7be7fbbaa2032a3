//! # ACPI Table Discovery
//!
//! Parsing of the ACPI structures the firmware publishes through the UEFI
//! configuration table, from the root pointer down to individual tables.
//!
//! ## Architecture
//!
//! ```text
//! EFI_SYSTEM_TABLE.ConfigurationTable (ACPI 2.0 / ACPI 1.0 GUID)
//!     ↓
//! RSDP/XSDP (Root System Description Pointer)
//!     ↓
//! RSDT/XSDT (Root/Extended System Description Table)
//!     ↓
//! Individual ACPI Tables (FACP, APIC, HPET, BGRT, ...)
//! ```
//!
//! ## Key Components
//!
//! ### Physical Memory Mapping ([`PhysMapRo`])
//! Every table is referenced by physical address. The parsers never
//! dereference an address themselves; they ask a [`PhysMapRo`] for a byte
//! slice. Boot-time UEFI applications run identity mapped, kernels usually
//! provide a higher-half direct map.
//!
//! ### RSDP Discovery and Parsing ([`rsdp`])
//! * **RSDP (ACPI 1.0)**: 20-byte Root System Description Pointer
//! * **XSDP (ACPI 2.0+)**: Extended version carrying a 64-bit XSDT address
//! * **Validation**: `RSD PTR ` signature, 20-byte checksum, extended checksum
//!
//! ### System Description Tables ([`sdt`])
//! * **Header**: the common 36-byte description header and its checksum
//! * **Root tables**: XSDT (64-bit entries) preferred over RSDT (32-bit)
//! * **Lookup**: enumerate all tables or find one by signature
//!
//! ### Boot Graphics Resource Table ([`bgrt`])
//! * **BGRT**: the boot logo location left behind by the firmware
//! * **BMP**: the bitmap file header of that logo
//!
//! ## Usage
//! ```rust,no_run
//! use firmware_acpi::{PhysMapRo, rsdp::AcpiRoots, sdt};
//!
//! struct Identity;
//! impl PhysMapRo for Identity {
//!     unsafe fn map_ro<'a>(&self, paddr: u64, len: usize) -> &'a [u8] {
//!         unsafe { core::slice::from_raw_parts(paddr as *const u8, len) }
//!     }
//! }
//!
//! let rsdp_addr = 0x7f7_7014; // from the UEFI configuration table
//! let roots = unsafe { AcpiRoots::parse(&Identity, rsdp_addr) }.unwrap();
//! for table in unsafe { sdt::tables(&Identity, &roots) }.unwrap() {
//!     println!("{} at 0x{:x}", table.header.signature, table.address);
//! }
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]
extern crate alloc;

pub mod bgrt;
pub mod rsdp;
pub mod sdt;

/// Map a physical region and return a *read-only* byte slice for its contents.
/// You provide the implementation (identity map, kmap, etc.).
pub trait PhysMapRo {
    /// # Safety
    /// The implementor must ensure the returned slice is valid for `len` bytes.
    unsafe fn map_ro<'a>(&self, paddr: u64, len: usize) -> &'a [u8];
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum AcpiError {
    #[error("table address is null")]
    NullAddress,
    #[error("invalid signature, expected {expected}")]
    InvalidSignature { expected: &'static str },
    #[error("checksum mismatch in {0}")]
    Checksum(&'static str),
    #[error("{0} is truncated")]
    Truncated(&'static str),
    #[error("unsupported RSDP revision {0}")]
    UnsupportedRevision(u8),
}

fn sum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |a, &b| a.wrapping_add(b))
}

/// Reads a little-endian integer from `bytes` at `offset`.
fn le<const N: usize>(bytes: &[u8], offset: usize) -> Option<[u8; N]> {
    bytes.get(offset..offset.checked_add(N)?)?.try_into().ok()
}

#[cfg(test)]
pub(crate) mod testing {
    use super::PhysMapRo;
    use std::cell::RefCell;

    /// A sparse physical address space backed by heap buffers.
    #[derive(Default)]
    pub struct FakeMemory {
        regions: RefCell<Vec<(u64, &'static [u8])>>,
    }

    impl FakeMemory {
        pub fn place(&self, paddr: u64, bytes: Vec<u8>) {
            self.regions
                .borrow_mut()
                .push((paddr, Box::leak(bytes.into_boxed_slice())));
        }
    }

    impl PhysMapRo for FakeMemory {
        unsafe fn map_ro<'a>(&self, paddr: u64, len: usize) -> &'a [u8] {
            for &(base, bytes) in self.regions.borrow().iter() {
                let Some(offset) = paddr.checked_sub(base) else {
                    continue;
                };
                let offset = usize::try_from(offset).unwrap();
                if offset < bytes.len() {
                    let end = (offset + len).min(bytes.len());
                    return &bytes[offset..end];
                }
            }
            &[]
        }
    }

    /// Fixes up byte `at` so that `bytes` sums to zero.
    pub fn fix_checksum(bytes: &mut [u8], at: usize) {
        bytes[at] = 0;
        bytes[at] = 0u8.wrapping_sub(super::sum(bytes));
    }
}
