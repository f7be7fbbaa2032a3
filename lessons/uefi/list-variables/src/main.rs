//! # List Variables
//!
//! Prints `<vendor guid>: <name>` for every variable in the store.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]

use log::{LevelFilter, error};
use uefi::prelude::*;
use uefi::println;

#[entry]
fn efi_main() -> Status {
    if lesson_support::init(LevelFilter::Info).is_err() {
        return Status::UNSUPPORTED;
    }

    for key in runtime::variable_keys() {
        match key {
            Ok(key) => println!("{}: {}", key.vendor.0, key.name),
            Err(e) => {
                error!("Error on 'GetNextVariableName' call: {:?}", e.status());
                return e.status();
            }
        }
    }
    Status::SUCCESS
}
