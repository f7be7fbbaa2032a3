//! `EFI_FIRMWARE_VOLUME2_PROTOCOL`.

use super::{free_pool, null};
use alloc::vec::Vec;
use core::ffi::c_void;
use firmware_types::ffs::AuthenticationStatus;
use uefi::proto::unsafe_protocol;
use uefi::{Guid, Status, StatusExt};

#[repr(C)]
#[unsafe_protocol("220e73b6-6bdb-4413-8405-b974b108619a")]
pub struct FirmwareVolume2 {
    pub get_volume_attributes: *const c_void,
    pub set_volume_attributes: *const c_void,
    pub read_file: unsafe extern "efiapi" fn(
        this: *const Self,
        name_guid: *const Guid,
        buffer: *mut *mut u8,
        buffer_size: *mut usize,
        found_type: *mut u8,
        file_attributes: *mut u32,
        authentication_status: *mut u32,
    ) -> Status,
    pub read_section: unsafe extern "efiapi" fn(
        this: *const Self,
        name_guid: *const Guid,
        section_type: u8,
        section_instance: usize,
        buffer: *mut *mut u8,
        buffer_size: *mut usize,
        authentication_status: *mut u32,
    ) -> Status,
    pub write_file: *const c_void,
    pub get_next_file: unsafe extern "efiapi" fn(
        this: *const Self,
        key: *mut u8,
        file_type: *mut u8,
        name_guid: *mut Guid,
        attributes: *mut u32,
        size: *mut usize,
    ) -> Status,
    pub key_size: u32,
    pub parent_handle: *mut c_void,
    pub get_info: *const c_void,
    pub set_info: *const c_void,
}

/// A file header as reported by `GetNextFile`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FileEntry {
    pub name: Guid,
    pub file_type: u8,
    pub attributes: u32,
    pub size: usize,
}

/// A file read back from the volume.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FileData {
    pub file_type: u8,
    pub attributes: u32,
    pub auth_status: AuthenticationStatus,
    pub data: Vec<u8>,
}

/// A section body read back from the volume.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SectionData {
    pub auth_status: AuthenticationStatus,
    pub data: Vec<u8>,
}

/// Type value that matches every file in `GetNextFile`.
pub const FILETYPE_ALL: u8 = 0x00;

/// Copies a pool buffer returned by firmware and frees it.
unsafe fn take_pool_buffer(buffer: *mut u8, size: usize) -> Vec<u8> {
    if buffer.is_null() {
        return Vec::new();
    }
    let data = unsafe { core::slice::from_raw_parts(buffer, size) }.to_vec();
    unsafe { free_pool(buffer) };
    data
}

impl FirmwareVolume2 {
    /// Every file in the volume.
    ///
    /// # Errors
    /// Returns the firmware status of a failed lookup.
    pub fn files(&self) -> Result<Vec<FileEntry>, Status> {
        let key_size = usize::try_from(self.key_size).map_err(|_| Status::UNSUPPORTED)?;
        let mut key = alloc::vec![0u8; key_size];
        let mut files = Vec::new();
        loop {
            let mut entry = FileEntry {
                name: Guid::ZERO,
                file_type: FILETYPE_ALL,
                attributes: 0,
                size: 0,
            };
            let status = unsafe {
                (self.get_next_file)(
                    self,
                    key.as_mut_ptr(),
                    &raw mut entry.file_type,
                    &raw mut entry.name,
                    &raw mut entry.attributes,
                    &raw mut entry.size,
                )
            };
            if status == Status::NOT_FOUND {
                return Ok(files);
            }
            status.to_result().map_err(|e| e.status())?;
            files.push(entry);
        }
    }

    /// Reads a whole file including its sections.
    ///
    /// # Errors
    /// Returns the firmware status, [`Status::NOT_FOUND`] for unknown files.
    pub fn read_file(&self, name: &Guid) -> Result<FileData, Status> {
        let mut buffer = null();
        let mut size = 0usize;
        let mut file_type = 0u8;
        let mut attributes = 0u32;
        let mut auth = 0u32;
        unsafe {
            (self.read_file)(
                self,
                name,
                &raw mut buffer,
                &raw mut size,
                &raw mut file_type,
                &raw mut attributes,
                &raw mut auth,
            )
        }
        .to_result()
        .map_err(|e| e.status())?;
        Ok(FileData {
            file_type,
            attributes,
            auth_status: AuthenticationStatus::from_bits(auth),
            data: unsafe { take_pool_buffer(buffer, size) },
        })
    }

    /// Reads the body of the `instance`-th section of `section_type`.
    ///
    /// # Errors
    /// Returns the firmware status, [`Status::NOT_FOUND`] if the section does
    /// not exist.
    pub fn read_section(
        &self,
        name: &Guid,
        section_type: u8,
        instance: usize,
    ) -> Result<SectionData, Status> {
        let mut buffer = null();
        let mut size = 0usize;
        let mut auth = 0u32;
        unsafe {
            (self.read_section)(
                self,
                name,
                section_type,
                instance,
                &raw mut buffer,
                &raw mut size,
                &raw mut auth,
            )
        }
        .to_result()
        .map_err(|e| e.status())?;
        Ok(SectionData {
            auth_status: AuthenticationStatus::from_bits(auth),
            data: unsafe { take_pool_buffer(buffer, size) },
        })
    }
}
