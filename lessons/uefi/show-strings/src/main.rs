//! # Show Strings
//!
//! Prints every `en-US` string of the HII package list registered under a
//! GUID.
//!
//! ```text
//! ShowStrings <Package GUID>
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]
extern crate alloc;

use lesson_support::args::{parse_guid, shell_args};
use lesson_support::hii::handles_for_guid;
use lesson_support::protocols::{HiiDatabase, HiiString};
use log::{LevelFilter, error};
use uefi::prelude::*;
use uefi::println;

const LANGUAGE: &str = "en-US";

#[entry]
fn efi_main() -> Status {
    if lesson_support::init(LevelFilter::Info).is_err() {
        return Status::UNSUPPORTED;
    }

    let args = shell_args("ShowStrings");
    if args.len() != 2 {
        println!("Usage:");
        println!("  ShowStrings [Package GUID]");
        return Status::INVALID_PARAMETER;
    }
    let Some(guid) = parse_guid(&args[1]) else {
        println!("Error! Can't convert <Package GUID> argument to GUID");
        return Status::INVALID_PARAMETER;
    };

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
    let handle = match handles_for_guid(&db, &guid) {
        Ok(handles) if !handles.is_empty() => handles[0],
        Ok(_) => {
            println!("No package list with GUID {guid}");
            return Status::NOT_FOUND;
        }
        Err(status) => return status,
    };

    for id in 1..u16::MAX {
        if let Ok(text) = strings.get_string(LANGUAGE, handle, id) {
            println!("ID={id}, {text}");
        }
    }
    Status::SUCCESS
}
