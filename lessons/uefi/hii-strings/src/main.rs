//! # HII Strings
//!
//! Builds a package list with an English and a French string package in
//! memory, registers it with the HII database and reads the strings back
//! through `EFI_HII_STRING_PROTOCOL`.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]
extern crate alloc;

use alloc::vec::Vec;
use firmware_hii::strings::{PackageListBuilder, StringPackageBuilder};
use firmware_types::{Guid, guid};
use lesson_support::protocols::{HiiDatabase, HiiHandle, HiiString};
use log::{LevelFilter, error};
use uefi::prelude::*;
use uefi::println;

const PACKAGE_LIST_GUID: Guid = guid!("5a8a4d4e-5b25-4d8e-9f31-8b7e1c4a2f60");

const LANGUAGES: [(&str, [&str; 2]); 2] = [
    ("en-US", ["English", "Hello"]),
    ("fr-FR", ["French", "Bonjour"]),
];

#[entry]
fn efi_main() -> Status {
    if lesson_support::init(LevelFilter::Info).is_err() {
        return Status::UNSUPPORTED;
    }

    let (db, strings) = match (
        lesson_support::locate::<HiiDatabase>(),
        lesson_support::locate::<HiiString>(),
    ) {
        (Ok(db), Ok(strings)) => (db, strings),
        (Err(status), _) | (_, Err(status)) => {
            error!("Can't locate HII protocols: {status}");
            return status;
        }
    };

    let handle = match db.new_package_list(&package_list()) {
        Ok(handle) => handle,
        Err(status) => {
            println!("Can't register HII Package list {PACKAGE_LIST_GUID}, status = {status}");
            return status;
        }
    };

    for (language, _) in LANGUAGES {
        for id in 1..=2 {
            print_string(&strings, handle, language, id);
        }
    }

    if let Err(status) = db.remove_package_list(handle) {
        error!("Can't remove HII Package list: {status}");
    }
    Status::SUCCESS
}

fn package_list() -> Vec<u8> {
    let mut builder = PackageListBuilder::new(PACKAGE_LIST_GUID);
    for (language, texts) in LANGUAGES {
        let mut package = StringPackageBuilder::new(language);
        for text in texts {
            package.push(text);
        }
        builder.push_package(&package.build());
    }
    builder.build()
}

fn print_string(strings: &HiiString, handle: HiiHandle, language: &str, id: u16) {
    match strings.get_string(language, handle, id) {
        Ok(text) => println!("Status = {}, {text}", Status::SUCCESS),
        Err(status) => println!("Status = {status}, "),
    }
}
