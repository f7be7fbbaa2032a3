//! # Display HII by GUID
//!
//! Collects the HII package lists registered under one or more GUIDs and
//! shows their forms in the Form Browser.
//!
//! ```text
//! DisplayHIIByGuid <GUID> [<GUID>...]
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]
extern crate alloc;

use alloc::vec::Vec;
use lesson_support::args::{parse_guid, shell_args};
use lesson_support::hii::handles_for_guid;
use lesson_support::protocols::{FormBrowser2, HiiDatabase};
use log::{LevelFilter, error, info};
use uefi::prelude::*;
use uefi::println;

#[entry]
fn efi_main() -> Status {
    if lesson_support::init(LevelFilter::Info).is_err() {
        return Status::UNSUPPORTED;
    }

    let args = shell_args("DisplayHIIByGuid");
    if args.len() < 2 {
        println!("Usage:");
        println!("  DisplayHIIByGuid <GUID> [<GUID>...]");
        return Status::INVALID_PARAMETER;
    }
    let mut guids = Vec::with_capacity(args.len() - 1);
    for arg in &args[1..] {
        let Some(guid) = parse_guid(arg) else {
            println!("Error! Can't convert input argument to GUID");
            return Status::INVALID_PARAMETER;
        };
        guids.push(guid);
    }

    let db = match lesson_support::locate::<HiiDatabase>() {
        Ok(db) => db,
        Err(status) => {
            error!("Error! Can't locate gEfiHiiDatabaseProtocol: {status}");
            return status;
        }
    };
    let mut handles = Vec::new();
    for guid in &guids {
        match handles_for_guid(&db, guid) {
            Ok(found) if found.is_empty() => info!("No package list with GUID {guid}"),
            Ok(found) => handles.extend(found),
            Err(status) => return status,
        }
    }
    if handles.is_empty() {
        println!("Error! No HII package lists were found");
        return Status::NOT_FOUND;
    }

    let browser = match lesson_support::locate::<FormBrowser2>() {
        Ok(browser) => browser,
        Err(status) => {
            println!("Error! Can't locate gEfiFormBrowser2Protocol");
            return status;
        }
    };
    if let Err(status) = browser.send_form(&handles) {
        println!("Error! SendForm returned {status}");
    }
    Status::SUCCESS
}
