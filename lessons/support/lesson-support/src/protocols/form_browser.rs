//! `EFI_FORM_BROWSER2_PROTOCOL`.

use super::HiiHandle;
use core::ffi::c_void;
use uefi::proto::unsafe_protocol;
use uefi::{Guid, Status, StatusExt};

#[repr(C)]
#[unsafe_protocol("b9d4c360-bcfb-4f9b-9298-53c136982258")]
pub struct FormBrowser2 {
    pub send_form: unsafe extern "efiapi" fn(
        this: *const Self,
        handles: *const HiiHandle,
        handle_count: usize,
        form_set_guid: *const Guid,
        form_id: u16,
        screen_dimensions: *const c_void,
        action_request: *mut u32,
    ) -> Status,
    pub browser_callback: *const c_void,
}

impl FormBrowser2 {
    /// Shows the forms of `handles` and blocks until the user leaves.
    ///
    /// # Errors
    /// Returns the firmware status.
    pub fn send_form(&self, handles: &[HiiHandle]) -> Result<u32, Status> {
        let mut action = 0u32;
        unsafe {
            (self.send_form)(
                self,
                handles.as_ptr(),
                handles.len(),
                core::ptr::null(),
                0,
                core::ptr::null(),
                &raw mut action,
            )
        }
        .to_result()
        .map_err(|e| e.status())?;
        Ok(action)
    }
}
