//! `EFI_HII_CONFIG_ROUTING_PROTOCOL`.

use super::{null, progress_offset, take_pool_string, wide};
use alloc::string::String;
use core::ffi::c_void;
use uefi::proto::unsafe_protocol;
use uefi::{Status, StatusExt};

#[repr(C)]
#[unsafe_protocol("587e72d7-cc50-4f79-8209-ca291fc1a10f")]
pub struct HiiConfigRouting {
    pub extract_config: unsafe extern "efiapi" fn(
        this: *const Self,
        request: *const u16,
        progress: *mut *const u16,
        results: *mut *mut u16,
    ) -> Status,
    pub export_config: unsafe extern "efiapi" fn(this: *const Self, results: *mut *mut u16) -> Status,
    pub route_config: unsafe extern "efiapi" fn(
        this: *const Self,
        configuration: *const u16,
        progress: *mut *const u16,
    ) -> Status,
    pub block_to_config: *const c_void,
    pub config_to_block: *const c_void,
    pub get_alt_config: *const c_void,
}

/// Failure of a request that reports how far it got.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RoutingError {
    pub status: Status,
    /// Characters of the request consumed before the failure.
    pub progress: usize,
}

impl HiiConfigRouting {
    /// Every storage of every driver as one `&`-joined string.
    ///
    /// # Errors
    /// Returns the firmware status.
    pub fn export_config(&self) -> Result<String, Status> {
        let mut results = null();
        unsafe { (self.export_config)(self, &raw mut results) }
            .to_result()
            .map_err(|e| e.status())?;
        Ok(unsafe { take_pool_string(results) })
    }

    /// Asks the owning driver for the values named in `request`.
    ///
    /// # Errors
    /// Returns the status and how much of `request` was processed.
    pub fn extract_config(&self, request: &str) -> Result<String, RoutingError> {
        let request = wide(request);
        let mut progress = core::ptr::null();
        let mut results = null();
        let status =
            unsafe { (self.extract_config)(self, request.as_ptr(), &raw mut progress, &raw mut results) };
        // Results may be partially filled even on failure.
        let text = unsafe { take_pool_string(results) };
        if status.is_error() {
            return Err(RoutingError {
                status,
                progress: unsafe { progress_offset(request.as_ptr(), progress) },
            });
        }
        Ok(text)
    }

    /// Hands `config` to the owning driver for storage.
    ///
    /// # Errors
    /// Returns the status and how much of `config` was processed.
    pub fn route_config(&self, config: &str) -> Result<(), RoutingError> {
        let config = wide(config);
        let mut progress = core::ptr::null();
        let status = unsafe { (self.route_config)(self, config.as_ptr(), &raw mut progress) };
        if status.is_error() {
            return Err(RoutingError {
                status,
                progress: unsafe { progress_offset(config.as_ptr(), progress) },
            });
        }
        Ok(())
    }
}
