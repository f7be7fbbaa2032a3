//! # Show Boot Variables
//!
//! Walks `BootOrder` and prints each `Boot####` option with its description
//! and device path. The option the system booted from (`BootCurrent`) is
//! marked with `*`.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]
extern crate alloc;

use alloc::boxed::Box;
use firmware_types::load_option::LoadOption;
use firmware_types::variable::{boot_option_name, parse_u16_array};
use lesson_support::device_path::text_of;
use log::{LevelFilter, error, warn};
use uefi::prelude::*;
use uefi::println;
use uefi::runtime::VariableVendor;
use uefi::{CStr16, CString16};

fn global_variable(name: &CStr16) -> Result<Box<[u8]>, Status> {
    runtime::get_variable_boxed(name, &VariableVendor::GLOBAL_VARIABLE)
        .map(|(data, _)| data)
        .map_err(|e| e.status())
}

#[entry]
fn efi_main() -> Status {
    if lesson_support::init(LevelFilter::Info).is_err() {
        return Status::UNSUPPORTED;
    }

    let current = match global_variable(cstr16!("BootCurrent")) {
        Ok(data) => parse_u16_array(&data).ok().and_then(|v| v.first().copied()),
        Err(status) => {
            warn!("Can't get BootCurrent variable: {status}");
            None
        }
    };

    let order = match global_variable(cstr16!("BootOrder")) {
        Ok(data) => data,
        Err(status) => {
            error!("Can't get BootOrder variable: {status}");
            return Status::SUCCESS;
        }
    };
    let Ok(order) = parse_u16_array(&order) else {
        error!("BootOrder has an odd length");
        return Status::COMPROMISED_DATA;
    };

    for number in order {
        let name = boot_option_name(number);
        let marker = if Some(number) == current { "*" } else { "" };
        println!("{name}{marker}");
        print_boot_option(&name);
        println!();
    }
    Status::SUCCESS
}

fn print_boot_option(name: &str) {
    let data = match CString16::try_from(name)
        .map_err(|_| Status::INVALID_PARAMETER)
        .and_then(|name| global_variable(&name))
    {
        Ok(data) => data,
        Err(_) => {
            println!("Can't get {name} variable");
            return;
        }
    };
    match LoadOption::parse(&data) {
        Ok(option) => {
            println!("{}", option.description);
            if !option.file_path.as_bytes().is_empty() {
                match text_of(option.file_path.as_bytes()) {
                    Some(text) => println!("{text}"),
                    None => println!("<device path of {} bytes>", option.file_path.as_bytes().len()),
                }
            }
        }
        Err(e) => error!("{name} is malformed: {e}"),
    }
}
