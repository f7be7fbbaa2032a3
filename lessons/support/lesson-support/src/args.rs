//! Command line arguments from the UEFI Shell.

use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use log::debug;
use uefi::boot;
use uefi::proto::shell_params::ShellParameters;

/// Returns `argv`, including the program name at index 0.
///
/// Images started outside the shell have no `ShellParameters` installed and
/// see only `program`.
#[must_use]
pub fn shell_args(program: &str) -> Vec<String> {
    match boot::open_protocol_exclusive::<ShellParameters>(boot::image_handle()) {
        Ok(params) => params.args().map(|arg| arg.to_string()).collect(),
        Err(e) => {
            debug!("No shell parameters: {:?}", e.status());
            vec![program.to_string()]
        }
    }
}

/// Parses a GUID argument in registry format.
#[must_use]
pub fn parse_guid(arg: &str) -> Option<uefi::Guid> {
    uefi::Guid::try_parse(arg).ok()
}
