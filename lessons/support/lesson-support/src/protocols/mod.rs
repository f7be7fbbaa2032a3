//! Raw protocol definitions for interfaces `uefi` does not wrap.
//!
//! Each protocol is a `#[repr(C)]` function table tagged with its GUID
//! through [`unsafe_protocol`](uefi::proto::unsafe_protocol), so it can be
//! located and opened with the regular [`uefi::boot`] functions. Safe
//! wrapper methods copy firmware-owned data into Rust values and release
//! pool allocations before returning.

pub mod config_routing;
pub mod firmware_volume;
pub mod form_browser;
pub mod hii_database;
pub mod hii_string;
pub mod keyword_handler;
pub mod pci_io;
pub mod pci_root_bridge_io;
pub mod smbios;

use alloc::string::String;
use alloc::vec::Vec;
use core::ffi::c_void;
use core::ptr::{self, NonNull};
use log::warn;
use uefi::boot;

pub use config_routing::HiiConfigRouting;
pub use firmware_volume::FirmwareVolume2;
pub use form_browser::FormBrowser2;
pub use hii_database::HiiDatabase;
pub use hii_string::HiiString;
pub use keyword_handler::ConfigKeywordHandler;
pub use pci_io::PciIo;
pub use pci_root_bridge_io::PciRootBridgeIo;
pub use smbios::Smbios;

/// `EFI_HII_HANDLE`, an opaque package list reference.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct HiiHandle(NonNull<c_void>);

impl HiiHandle {
    #[must_use]
    pub const fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }

    /// # Safety
    /// `ptr` must be an HII handle issued by the HII database.
    #[must_use]
    pub unsafe fn from_ptr(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }
}

/// `EFI_PCI_IO_PROTOCOL_WIDTH` and `EFI_PCI_ROOT_BRIDGE_IO_PROTOCOL_WIDTH`.
#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IoWidth {
    Uint8 = 0,
    Uint16 = 1,
    Uint32 = 2,
    Uint64 = 3,
}

/// A NUL-terminated UCS-2 string for passing to firmware.
pub(crate) fn wide(s: &str) -> Vec<u16> {
    firmware_types::ucs2::encode(s)
}

/// Reads a NUL-terminated UCS-2 string.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
pub(crate) unsafe fn read_wide(ptr: *const u16) -> String {
    if ptr.is_null() {
        return String::new();
    }
    let mut len = 0;
    // SAFETY: the string is terminated.
    while unsafe { *ptr.add(len) } != 0 {
        len += 1;
    }
    firmware_types::ucs2::decode(unsafe { core::slice::from_raw_parts(ptr, len) })
}

/// Number of UCS-2 characters between `start` and `progress`.
///
/// # Safety
/// Both pointers must be into the same string.
pub(crate) unsafe fn progress_offset(start: *const u16, progress: *const u16) -> usize {
    if progress.is_null() {
        return 0;
    }
    usize::try_from(unsafe { progress.offset_from(start) }).unwrap_or(0)
}

/// Takes ownership of a pool-allocated UCS-2 string returned by firmware.
///
/// # Safety
/// `ptr` must be null or a NUL-terminated string allocated from pool.
pub(crate) unsafe fn take_pool_string(ptr: *mut u16) -> String {
    let text = unsafe { read_wide(ptr) };
    unsafe { free_pool(ptr.cast()) };
    text
}

/// Releases a pool allocation made by firmware on our behalf.
///
/// # Safety
/// `ptr` must be null or a live pool allocation.
pub(crate) unsafe fn free_pool(ptr: *mut u8) {
    if let Some(ptr) = NonNull::new(ptr) {
        if let Err(e) = unsafe { boot::free_pool(ptr) } {
            warn!("FreePool({:p}) failed: {}", ptr.as_ptr(), e.status());
        }
    }
}

pub(crate) const fn null<T>() -> *mut T {
    ptr::null_mut()
}
