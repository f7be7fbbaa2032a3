//! # Lesson Support
//!
//! Glue between the UEFI lesson applications and the firmware they run on.
//! Everything that touches boot services lives here, so the lessons
//! themselves stay short and the parsing crates under `lessons/firmware`
//! stay host-testable.
//!
//! ## Overview
//!
//! ```text
//! lesson main()
//!     ↓
//! lesson_support::init()        uefi helpers, LessonLogger
//!     ↓
//! args / tables / file_system   shell arguments, config table, ESP files
//!     ↓
//! protocols::*                  raw HII, PCI, FV2, SMBIOS interfaces
//!     ↓
//! firmware-* crates             decoding of whatever came back
//! ```
//!
//! ## Modules
//!
//! * `allocator`: the global allocator, backed by boot services pool memory.
//! * [`logger`]: `log` backend printing `[LEVEL] target: message` to the
//!   console and, with the `qemu` feature, to the QEMU debug console
//!   ([`debugcon`]).
//! * [`args`]: `argv` from the UEFI Shell.
//! * [`file_system`]: load and save whole files on the image's volume.
//! * [`tables`]: configuration table lookup (ACPI, SMBIOS, ...).
//! * [`phys`]: identity mapped access to firmware tables.
//! * [`device_path`]: device path text conversion and handle lookup.
//! * [`protocols`]: `#[repr(C)]` protocol definitions with safe wrappers.
//! * [`hii`]: HII database lookups shared by several lessons.
//!
//! ## Usage
//!
//! ```rust,no_run
//! #![no_std]
//! #![no_main]
//!
//! use log::LevelFilter;
//! use uefi::prelude::*;
//!
//! #[entry]
//! fn efi_main() -> Status {
//!     if lesson_support::init(LevelFilter::Info).is_err() {
//!         return Status::UNSUPPORTED;
//!     }
//!     uefi::println!("Hello from a lesson");
//!     Status::SUCCESS
//! }
//! ```
//!
//! ## Features
//!
//! * `qemu` (default): mirror log output to I/O port `0x402`. Run QEMU with
//!   `-debugcon file:debug.log` to capture it.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]
extern crate alloc;

mod allocator;
pub mod args;
pub mod debugcon;
pub mod device_path;
pub mod file_system;
pub mod hii;
pub mod logger;
pub mod phys;
pub mod protocols;
pub mod tables;

use alloc::vec::Vec;
use log::{LevelFilter, debug};
use uefi::boot::{self, OpenProtocolAttributes, OpenProtocolParams, ScopedProtocol, SearchType};
use uefi::proto::ProtocolPointer;
use uefi::{Handle, Identify, Status};

pub use logger::LessonLogger;

/// Initializes the `uefi` helpers and installs the [`LessonLogger`].
///
/// # Errors
/// Returns [`Status::UNSUPPORTED`] if either step fails.
pub fn init(max_level: LevelFilter) -> Result<(), Status> {
    uefi::helpers::init().map_err(|_| Status::UNSUPPORTED)?;
    LessonLogger::new(max_level)
        .init()
        .map_err(|_| Status::UNSUPPORTED)
}

/// Opens `P` on `handle` without taking it away from its driver.
///
/// # Errors
/// Returns the firmware status.
pub fn open_shared<P: ProtocolPointer + ?Sized>(handle: Handle) -> Result<ScopedProtocol<P>, Status> {
    // SAFETY: lessons only read through the interface and close it before
    // returning, so the owning driver is not disturbed.
    unsafe {
        boot::open_protocol::<P>(
            OpenProtocolParams {
                handle,
                agent: boot::image_handle(),
                controller: None,
            },
            OpenProtocolAttributes::GetProtocol,
        )
    }
    .map_err(|e| e.status())
}

/// Opens the first instance of `P` in the system.
///
/// # Errors
/// Returns the firmware status, [`Status::NOT_FOUND`] if nobody installed `P`.
pub fn locate<P: ProtocolPointer + ?Sized>() -> Result<ScopedProtocol<P>, Status> {
    let handle = boot::get_handle_for_protocol::<P>().map_err(|e| {
        debug!("No handle for protocol {}: {:?}", P::GUID, e.status());
        e.status()
    })?;
    open_shared(handle)
}

/// All handles carrying `P`.
///
/// # Errors
/// Returns the firmware status, [`Status::NOT_FOUND`] if nobody installed `P`.
pub fn handles<P: ProtocolPointer + ?Sized>() -> Result<Vec<Handle>, Status> {
    boot::locate_handle_buffer(SearchType::ByProtocol(&P::GUID))
        .map(|buffer| buffer.to_vec())
        .map_err(|e| e.status())
}
