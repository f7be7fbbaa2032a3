//! Device paths through the firmware's device path protocols.
//!
//! Text conversion goes through `EFI_DEVICE_PATH_TO_TEXT_PROTOCOL` and
//! `EFI_DEVICE_PATH_FROM_TEXT_PROTOCOL`, so the output matches what the UEFI
//! Shell prints for the same path.

use alloc::string::String;
use alloc::vec::Vec;
use log::debug;
use uefi::proto::device_path::text::{AllowShortcuts, DevicePathFromText, DisplayOnly};
use uefi::proto::device_path::{DevicePath, DevicePathNode, PoolDevicePath, PoolDevicePathNode};
use uefi::{CString16, Status, boot};

/// `ConvertDevicePathToText(path, FALSE, FALSE)`.
///
/// # Errors
/// [`Status::UNSUPPORTED`] if the firmware has no device path to text
/// protocol or the conversion fails.
pub fn path_text(path: &DevicePath) -> Result<String, Status> {
    let text = path
        .to_string(DisplayOnly(false), AllowShortcuts(false))
        .map_err(|e| {
            debug!("ConvertDevicePathToText failed: {e:?}");
            Status::UNSUPPORTED
        })?;
    Ok(alloc::format!("{}", &*text))
}

/// `ConvertDeviceNodeToText(node, FALSE, FALSE)`.
///
/// # Errors
/// Same as [`path_text`].
pub fn node_text(node: &DevicePathNode) -> Result<String, Status> {
    let text = node
        .to_string(DisplayOnly(false), AllowShortcuts(false))
        .map_err(|e| {
            debug!("ConvertDeviceNodeToText failed: {e:?}");
            Status::UNSUPPORTED
        })?;
    Ok(alloc::format!("{}", &*text))
}

/// Text of a device path stored in a byte buffer, such as a load option's
/// file path list. `None` for a malformed path or a failed conversion.
#[must_use]
pub fn text_of(bytes: &[u8]) -> Option<String> {
    let path = <&DevicePath>::try_from(bytes).ok()?;
    path_text(path).ok()
}

fn to_ucs2(text: &str) -> Result<CString16, Status> {
    CString16::try_from(text).map_err(|_| Status::INVALID_PARAMETER)
}

/// `ConvertTextToDevicePath`.
///
/// # Errors
/// [`Status::INVALID_PARAMETER`] for text that is not UCS-2, otherwise the
/// status of locating the protocol or of the conversion.
pub fn path_from_text(text: &str) -> Result<PoolDevicePath, Status> {
    let from_text = crate::locate::<DevicePathFromText>()?;
    from_text
        .convert_text_to_device_path(&to_ucs2(text)?)
        .map_err(|e| e.status())
}

/// `ConvertTextToDeviceNode`.
///
/// # Errors
/// Same as [`path_from_text`].
pub fn node_from_text(text: &str) -> Result<PoolDevicePathNode, Status> {
    let from_text = crate::locate::<DevicePathFromText>()?;
    from_text
        .convert_text_to_device_node(&to_ucs2(text)?)
        .map_err(|e| e.status())
}

/// Finds the handle whose device path is the closest match for `text` and
/// returns that handle's complete device path.
///
/// # Errors
/// The status of the text conversion or of the lookup.
pub fn installed_path(text: &str) -> Result<Vec<u8>, Status> {
    let path = path_from_text(text).inspect_err(|status| {
        debug!("Can't convert {text} to a device path: {status}");
    })?;
    let mut remaining: &DevicePath = &path;
    let handle =
        boot::locate_device_path::<DevicePath>(&mut remaining).map_err(|e| e.status())?;
    let installed = crate::open_shared::<DevicePath>(handle)?;
    Ok(installed.as_bytes().to_vec())
}
