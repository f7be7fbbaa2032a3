//! # Set Variable
//!
//! ```text
//! SetVariable <variable name>                        delete the variable
//! SetVariable <variable name> <attributes> <value>   create or update it
//! ```
//!
//! `<attributes>` is any combination of `n` (non-volatile), `b` (boot
//! service access) and `r` (runtime access). The value is stored as a
//! NUL-terminated UCS-2 string under [`VENDOR_GUID`].

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]
extern crate alloc;

use firmware_types::ucs2;
use firmware_types::variable::parse_attribute_letters;
use lesson_support::args::shell_args;
use log::{LevelFilter, error};
use uefi::prelude::*;
use uefi::println;
use uefi::runtime::{VariableAttributes, VariableVendor};
use uefi::{CString16, Guid, guid};

/// Vendor GUID the lesson's variables are stored under.
const VENDOR_GUID: Guid = guid!("bb2a829f-7943-4691-a03a-f1f48519d7e6");

fn usage() {
    println!("Delete variable");
    println!("   SetVariable <variable name>");
    println!();
    println!("Set variable");
    println!("   SetVariable <variable name> <attributes> <value>");
    println!();
    println!("<attributes> can be <n|b|r>");
    println!("n - NON_VOLATILE");
    println!("b - BOOTSERVICE_ACCESS");
    println!("r - RUNTIME_ACCESS");
}

#[entry]
fn efi_main() -> Status {
    if lesson_support::init(LevelFilter::Info).is_err() {
        return Status::UNSUPPORTED;
    }

    let args = shell_args("SetVariable");
    let vendor = VariableVendor(VENDOR_GUID);
    match args.as_slice() {
        [_, name] => {
            let Ok(wide) = CString16::try_from(name.as_str()) else {
                return Status::INVALID_PARAMETER;
            };
            match runtime::delete_variable(&wide, &vendor) {
                Ok(()) => {
                    println!("Variable {name} was successfully deleted");
                    Status::SUCCESS
                }
                Err(e) => {
                    println!("{:?}", e.status());
                    e.status()
                }
            }
        }
        [_, name, letters, value] => {
            let attributes = match parse_attribute_letters(letters) {
                Ok(attributes) => attributes,
                Err(e) => {
                    error!("Error! {e}");
                    return Status::INVALID_PARAMETER;
                }
            };
            let Ok(wide) = CString16::try_from(name.as_str()) else {
                return Status::INVALID_PARAMETER;
            };
            let data = ucs2::encode_bytes(value);
            let attributes = VariableAttributes::from_bits_retain(attributes.into_bits());
            match runtime::set_variable(&wide, &vendor, attributes, &data) {
                Ok(()) => {
                    println!("Variable {name} was successfully changed");
                    Status::SUCCESS
                }
                Err(e) => {
                    println!("{:?}", e.status());
                    e.status()
                }
            }
        }
        _ => {
            usage();
            Status::SUCCESS
        }
    }
}
