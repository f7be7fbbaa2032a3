//! # PCI
//!
//! Decoding helpers for the PCI lessons:
//!
//! * [`config`]: configuration space addressing for
//!   `EFI_PCI_ROOT_BRIDGE_IO_PROTOCOL.Pci.Read` and the device independent
//!   header every function starts with.
//! * [`resources`]: the ACPI QWORD address space descriptors a root bridge
//!   reports from `Configuration()`, used to learn its bus range.
//! * [`ids`]: vendor and device names from a `pci.ids` database.
//! * [`rom`]: option ROM image chains as exposed by `EFI_PCI_IO_PROTOCOL`.

#![cfg_attr(not(any(test, doctest)), no_std)]
extern crate alloc;

pub mod config;
pub mod ids;
pub mod resources;
pub mod rom;

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum PciError {
    #[error("configuration header is truncated")]
    TruncatedHeader,
    #[error("resource descriptor at offset {0} is malformed")]
    BadDescriptor(usize),
    #[error("resource list has no end tag")]
    MissingEndTag,
    #[error("option ROM image at offset {0:#x} has a wrong signature")]
    BadRomSignature(usize),
    #[error("option ROM image at offset {0:#x} has a wrong PCI data structure signature")]
    BadPcirSignature(usize),
    #[error("option ROM image at offset {0:#x} is truncated")]
    TruncatedRom(usize),
    #[error("option ROM image at offset {0:#x} has zero length")]
    ZeroLengthRom(usize),
}
