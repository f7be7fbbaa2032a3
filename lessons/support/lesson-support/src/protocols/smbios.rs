//! `EFI_SMBIOS_PROTOCOL`.

use super::null;
use alloc::vec::Vec;
use core::ffi::c_void;
use firmware_smbios::structure::{HEADER_LEN, structure_size};
use uefi::proto::unsafe_protocol;
use uefi::Status;

/// `SMBIOS_HANDLE_PI_RESERVED`, starts a `GetNext` walk.
pub const HANDLE_PI_RESERVED: u16 = 0xFFFE;

#[repr(C)]
#[unsafe_protocol("03583ff6-cb36-4940-947e-b9b39f4afaf7")]
pub struct Smbios {
    pub add: *const c_void,
    pub update_string: *const c_void,
    pub remove: *const c_void,
    pub get_next: unsafe extern "efiapi" fn(
        this: *const Self,
        smbios_handle: *mut u16,
        ty: *mut u8,
        record: *mut *const u8,
        producer_handle: *mut *mut c_void,
    ) -> Status,
    pub major_version: u8,
    pub minor_version: u8,
}

impl Smbios {
    /// Walks every record the protocol holds, in handle order.
    #[must_use]
    pub const fn records(&self) -> Records<'_> {
        Records {
            smbios: self,
            handle: HANDLE_PI_RESERVED,
            done: false,
        }
    }
}

/// Copies of the records returned by `GetNext`, string set included.
pub struct Records<'a> {
    smbios: &'a Smbios,
    handle: u16,
    done: bool,
}

impl Iterator for Records<'_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut record: *const u8 = core::ptr::null();
        let status = unsafe {
            (self.smbios.get_next)(
                self.smbios,
                &raw mut self.handle,
                null(),
                &raw mut record,
                null(),
            )
        };
        if status.is_error() || record.is_null() {
            self.done = true;
            return None;
        }
        // SAFETY: the firmware hands out a complete record.
        Some(unsafe { copy_record(record) })
    }
}

/// Copies the formatted area and the double-NUL terminated string set.
///
/// # Safety
/// `record` must point to a well-formed SMBIOS structure.
unsafe fn copy_record(record: *const u8) -> Vec<u8> {
    let mut window = usize::from(unsafe { *record.add(1) }).max(HEADER_LEN) + 2;
    loop {
        // SAFETY: the window never extends past the record's terminator.
        let bytes = unsafe { core::slice::from_raw_parts(record, window) };
        if let Some(size) = structure_size(bytes) {
            return bytes[..size].to_vec();
        }
        window += 1;
    }
}
