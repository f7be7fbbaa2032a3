//! # Update dmpstore Dump
//!
//! Recomputes the record CRCs of a file written by `dmpstore -s`, so that a
//! hand-edited dump can be loaded back with `dmpstore -l`.
//!
//! ```text
//! UpdateDmpstoreDump <filename>
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]
extern crate alloc;

use firmware_types::dmpstore::{Records, update_crcs};
use lesson_support::args::shell_args;
use lesson_support::file_system::{file_name, load_file, save_file};
use log::{LevelFilter, debug, error};
use uefi::prelude::*;
use uefi::println;

#[entry]
fn efi_main() -> Status {
    if lesson_support::init(LevelFilter::Info).is_err() {
        return Status::UNSUPPORTED;
    }

    let args = shell_args("UpdateDmpstoreDump");
    let [_, name] = args.as_slice() else {
        println!("Recalculate CRCs for dmpstore command dump");
        println!();
        println!("  UpdateDmpstoreDump <filename>");
        return Status::INVALID_PARAMETER;
    };

    let path = match file_name(name) {
        Ok(path) => path,
        Err(status) => return status,
    };
    let mut dump = match load_file(&path) {
        Ok(dump) => dump,
        Err(_) => {
            println!("Error! Can't open file {name}");
            return Status::NOT_FOUND;
        }
    };

    for record in Records::new(&dump).map_while(Result::ok) {
        if !record.crc_valid() {
            debug!(
                "{}:{} CRC {:08x} -> {:08x}",
                record.guid,
                record.name(),
                record.stored_crc,
                record.computed_crc
            );
        }
    }

    let changed = match update_crcs(&mut dump) {
        Ok(changed) => changed,
        Err(e) => {
            println!("Error! {e}");
            return Status::VOLUME_CORRUPTED;
        }
    };
    if let Err(status) = save_file(&path, &dump) {
        error!("Error! Not all data was written: {status}");
        return status;
    }
    println!("Updated {changed} record CRC(s) in {name}");
    Status::SUCCESS
}
