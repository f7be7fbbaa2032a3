//! `EFI_HII_STRING_PROTOCOL`.

use super::{HiiHandle, null, wide};
use alloc::ffi::CString;
use alloc::string::String;
use alloc::vec;
use core::ffi::{c_char, c_void};
use uefi::proto::unsafe_protocol;
use uefi::{Status, StatusExt};

#[repr(C)]
#[unsafe_protocol("0fd96974-23aa-4cdc-b9cb-98d17750322a")]
pub struct HiiString {
    pub new_string: unsafe extern "efiapi" fn(
        this: *const Self,
        package_list: *mut c_void,
        string_id: *mut u16,
        language: *const c_char,
        language_name: *const u16,
        string: *const u16,
        string_font_info: *const c_void,
    ) -> Status,
    pub get_string: unsafe extern "efiapi" fn(
        this: *const Self,
        language: *const c_char,
        package_list: *mut c_void,
        string_id: u16,
        string: *mut u16,
        string_size: *mut usize,
        string_font_info: *mut *mut c_void,
    ) -> Status,
    pub set_string: unsafe extern "efiapi" fn(
        this: *const Self,
        package_list: *mut c_void,
        string_id: u16,
        language: *const c_char,
        string: *const u16,
        string_font_info: *const c_void,
    ) -> Status,
    pub get_languages: unsafe extern "efiapi" fn(
        this: *const Self,
        package_list: *mut c_void,
        languages: *mut c_char,
        languages_size: *mut usize,
    ) -> Status,
    pub get_secondary_languages: *const c_void,
}

impl HiiString {
    /// Adds `text` to every string package of `package_list`, creating the
    /// `language` package (named `language_name`) when it is missing.
    /// Returns the id of the new string.
    ///
    /// # Errors
    /// Returns the firmware status.
    pub fn new_string(
        &self,
        package_list: HiiHandle,
        language: &str,
        language_name: &str,
        text: &str,
    ) -> Result<u16, Status> {
        let language = CString::new(language).map_err(|_| Status::INVALID_PARAMETER)?;
        let language_name = wide(language_name);
        let text = wide(text);
        let mut id = 0u16;
        unsafe {
            (self.new_string)(
                self,
                package_list.as_ptr(),
                &raw mut id,
                language.as_ptr(),
                language_name.as_ptr(),
                text.as_ptr(),
                null(),
            )
        }
        .to_result()
        .map_err(|e| e.status())?;
        Ok(id)
    }

    /// Replaces string `id` of `package_list` in `language`.
    ///
    /// # Errors
    /// Returns the firmware status, e.g. [`Status::NOT_FOUND`] for an id the
    /// package does not hold.
    pub fn set_string(
        &self,
        package_list: HiiHandle,
        id: u16,
        language: &str,
        text: &str,
    ) -> Result<(), Status> {
        let language = CString::new(language).map_err(|_| Status::INVALID_PARAMETER)?;
        let text = wide(text);
        unsafe {
            (self.set_string)(
                self,
                package_list.as_ptr(),
                id,
                language.as_ptr(),
                text.as_ptr(),
                null(),
            )
        }
        .to_result()
        .map_err(|e| e.status())
    }

    /// Reads string `id` of `package_list` in `language` (RFC 4646, e.g. `en-US`).
    ///
    /// # Errors
    /// Returns the firmware status, e.g. [`Status::NOT_FOUND`] for unknown ids
    /// and `INVALID_LANGUAGE` for missing languages.
    pub fn get_string(
        &self,
        language: &str,
        package_list: HiiHandle,
        id: u16,
    ) -> Result<String, Status> {
        let language = CString::new(language).map_err(|_| Status::INVALID_PARAMETER)?;
        let mut size = 0usize;
        let status = unsafe {
            (self.get_string)(
                self,
                language.as_ptr(),
                package_list.as_ptr(),
                id,
                null(),
                &raw mut size,
                null(),
            )
        };
        if status != Status::BUFFER_TOO_SMALL {
            return Err(if status.is_success() { Status::NOT_FOUND } else { status });
        }

        let mut buffer = vec![0u16; size.div_ceil(2)];
        unsafe {
            (self.get_string)(
                self,
                language.as_ptr(),
                package_list.as_ptr(),
                id,
                buffer.as_mut_ptr(),
                &raw mut size,
                null(),
            )
        }
        .to_result()
        .map_err(|e| e.status())?;
        Ok(firmware_types::ucs2::decode(&buffer))
    }

    /// The `;` separated languages of a package list.
    ///
    /// # Errors
    /// Returns the firmware status.
    pub fn get_languages(&self, package_list: HiiHandle) -> Result<String, Status> {
        let mut size = 0usize;
        let status =
            unsafe { (self.get_languages)(self, package_list.as_ptr(), null(), &raw mut size) };
        if status != Status::BUFFER_TOO_SMALL {
            return Err(if status.is_success() { Status::NOT_FOUND } else { status });
        }

        let mut buffer = vec![0u8; size];
        unsafe {
            (self.get_languages)(self, package_list.as_ptr(), buffer.as_mut_ptr().cast(), &raw mut size)
        }
        .to_result()
        .map_err(|e| e.status())?;
        let end = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
        Ok(String::from_utf8_lossy(&buffer[..end]).into_owned())
    }
}
