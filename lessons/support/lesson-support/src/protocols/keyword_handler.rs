//! `EFI_CONFIG_KEYWORD_HANDLER_PROTOCOL`.

use super::{null, progress_offset, take_pool_string, wide};
use alloc::string::String;
use firmware_hii::keyword::KeywordProgress;
use uefi::proto::unsafe_protocol;
use uefi::Status;

#[repr(C)]
#[unsafe_protocol("0a8badd5-03b8-4d19-b128-7b8f0edaa596")]
pub struct ConfigKeywordHandler {
    pub set_data: unsafe extern "efiapi" fn(
        this: *const Self,
        keyword_string: *const u16,
        progress: *mut *const u16,
        progress_err: *mut u32,
    ) -> Status,
    pub get_data: unsafe extern "efiapi" fn(
        this: *const Self,
        namespace_id: *const u16,
        keyword_string: *const u16,
        progress: *mut *const u16,
        progress_err: *mut u32,
        results: *mut *mut u16,
    ) -> Status,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct KeywordError {
    pub status: Status,
    pub progress: usize,
    pub progress_err: KeywordProgress,
}

impl ConfigKeywordHandler {
    /// Reads keywords. `None` matches every namespace or keyword.
    ///
    /// # Errors
    /// Returns the status together with the handler's progress bits.
    pub fn get_data(
        &self,
        namespace: Option<&str>,
        keyword: Option<&str>,
    ) -> Result<String, KeywordError> {
        let namespace = namespace.map(wide);
        let keyword = keyword.map(wide);
        let keyword_ptr = keyword.as_ref().map_or(core::ptr::null(), |k| k.as_ptr());
        let mut progress = core::ptr::null();
        let mut progress_err = 0u32;
        let mut results = null();
        let status = unsafe {
            (self.get_data)(
                self,
                namespace.as_ref().map_or(core::ptr::null(), |n| n.as_ptr()),
                keyword_ptr,
                &raw mut progress,
                &raw mut progress_err,
                &raw mut results,
            )
        };
        let text = unsafe { take_pool_string(results) };
        if status.is_error() {
            return Err(KeywordError {
                status,
                progress: unsafe { progress_offset(keyword_ptr, progress) },
                progress_err: KeywordProgress::from_bits(progress_err),
            });
        }
        Ok(text)
    }

    /// Writes `NAMESPACE=..&PATH=..&KEYWORD=..&VALUE=..` strings.
    ///
    /// # Errors
    /// Returns the status together with the handler's progress bits.
    pub fn set_data(&self, keyword_string: &str) -> Result<(), KeywordError> {
        let keyword = wide(keyword_string);
        let mut progress = core::ptr::null();
        let mut progress_err = 0u32;
        let status = unsafe {
            (self.set_data)(self, keyword.as_ptr(), &raw mut progress, &raw mut progress_err)
        };
        if status.is_error() {
            return Err(KeywordError {
                status,
                progress: unsafe { progress_offset(keyword.as_ptr(), progress) },
                progress_err: KeywordProgress::from_bits(progress_err),
            });
        }
        Ok(())
    }
}
