//! # Show Tables
//!
//! Lists the vendor tables in the system configuration table.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]

use lesson_support::tables;
use log::LevelFilter;
use uefi::prelude::*;
use uefi::println;

#[entry]
fn efi_main() -> Status {
    if lesson_support::init(LevelFilter::Info).is_err() {
        return Status::UNSUPPORTED;
    }

    for (guid, address) in tables::entries() {
        match tables::table_name(&guid) {
            Some(name) => println!("{guid}, {address:016X}  {name}"),
            None => println!("{guid}, {address:016X}"),
        }
    }
    Status::SUCCESS
}
