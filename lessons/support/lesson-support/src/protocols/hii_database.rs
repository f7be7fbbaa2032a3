//! `EFI_HII_DATABASE_PROTOCOL`.

use super::{HiiHandle, null};
use alloc::vec;
use alloc::vec::Vec;
use core::ffi::c_void;
use uefi::proto::unsafe_protocol;
use uefi::{Guid, Status, StatusExt};

#[repr(C)]
#[unsafe_protocol("ef9fc172-a1b2-4693-b327-6d32fc416042")]
pub struct HiiDatabase {
    pub new_package_list: unsafe extern "efiapi" fn(
        this: *const Self,
        package_list: *const u8,
        driver_handle: *mut c_void,
        handle: *mut *mut c_void,
    ) -> Status,
    pub remove_package_list: unsafe extern "efiapi" fn(this: *const Self, handle: *mut c_void) -> Status,
    pub update_package_list: *const c_void,
    pub list_package_lists: unsafe extern "efiapi" fn(
        this: *const Self,
        package_type: u8,
        package_guid: *const Guid,
        handle_buffer_length: *mut usize,
        handle: *mut *mut c_void,
    ) -> Status,
    pub export_package_lists: unsafe extern "efiapi" fn(
        this: *const Self,
        handle: *mut c_void,
        buffer_size: *mut usize,
        buffer: *mut u8,
    ) -> Status,
    pub register_package_notify: *const c_void,
    pub unregister_package_notify: *const c_void,
    pub find_keyboard_layouts: *const c_void,
    pub get_keyboard_layout: *const c_void,
    pub set_keyboard_layout: *const c_void,
    pub get_package_list_handle: *const c_void,
}

impl HiiDatabase {
    /// Registers a package list built in memory.
    ///
    /// # Errors
    /// Returns the firmware status, e.g. [`Status::INVALID_PARAMETER`] when
    /// a list with the same GUID exists.
    pub fn new_package_list(&self, package_list: &[u8]) -> Result<HiiHandle, Status> {
        let mut handle = null();
        // SAFETY: the list stays alive for the call and firmware copies it.
        unsafe { (self.new_package_list)(self, package_list.as_ptr(), null(), &raw mut handle) }
            .to_result()
            .map_err(|e| e.status())?;
        // SAFETY: issued by the database just now.
        unsafe { HiiHandle::from_ptr(handle) }.ok_or(Status::NOT_FOUND)
    }

    /// # Errors
    /// Returns the firmware status for unknown handles.
    pub fn remove_package_list(&self, handle: HiiHandle) -> Result<(), Status> {
        unsafe { (self.remove_package_list)(self, handle.as_ptr()) }
            .to_result()
            .map_err(|e| e.status())
    }

    /// Handles of all package lists that contain a package of `package_type`.
    ///
    /// # Errors
    /// Returns the firmware status, [`Status::NOT_FOUND`] if nothing matched.
    pub fn list_package_lists(&self, package_type: u8) -> Result<Vec<HiiHandle>, Status> {
        let mut size = 0usize;
        let status = unsafe {
            (self.list_package_lists)(self, package_type, core::ptr::null(), &raw mut size, null())
        };
        if status != Status::BUFFER_TOO_SMALL {
            return Err(if status.is_success() { Status::NOT_FOUND } else { status });
        }

        let count = size / size_of::<*mut c_void>();
        let mut raw: Vec<*mut c_void> = vec![null(); count];
        unsafe {
            (self.list_package_lists)(
                self,
                package_type,
                core::ptr::null(),
                &raw mut size,
                raw.as_mut_ptr(),
            )
        }
        .to_result()
        .map_err(|e| e.status())?;

        raw.truncate(size / size_of::<*mut c_void>());
        Ok(raw
            .into_iter()
            .filter_map(|h| unsafe { HiiHandle::from_ptr(h) })
            .collect())
    }

    /// Exports one package list, or the whole database for `None`.
    ///
    /// # Errors
    /// Returns the firmware status.
    pub fn export_package_lists(&self, handle: Option<HiiHandle>) -> Result<Vec<u8>, Status> {
        let handle = handle.map_or(null(), HiiHandle::as_ptr);
        let mut size = 0usize;
        let status = unsafe { (self.export_package_lists)(self, handle, &raw mut size, null()) };
        if status != Status::BUFFER_TOO_SMALL {
            return Err(if status.is_success() { Status::NOT_FOUND } else { status });
        }

        let mut buffer = vec![0u8; size];
        unsafe { (self.export_package_lists)(self, handle, &raw mut size, buffer.as_mut_ptr()) }
            .to_result()
            .map_err(|e| e.status())?;
        buffer.truncate(size);
        Ok(buffer)
    }
}
