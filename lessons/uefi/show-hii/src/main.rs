//! # Show HII
//!
//! Lists the package lists of the HII database and the packages inside
//! them, or saves the lists to files named `<index>_<guid>`.
//!
//! ```text
//! ShowHII                 list everything
//! ShowHII save            save every package list
//! ShowHII save <index>    save one package list
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]
extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use firmware_hii::package::{PackageList, PackageLists, package_type_name};
use lesson_support::args::shell_args;
use lesson_support::file_system::{file_name, save_file};
use lesson_support::protocols::HiiDatabase;
use log::{LevelFilter, error};
use uefi::prelude::*;
use uefi::println;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Mode {
    List,
    /// Save all lists, or only the one with the given index.
    Save(Option<usize>),
}

#[entry]
fn efi_main() -> Status {
    if lesson_support::init(LevelFilter::Info).is_err() {
        return Status::UNSUPPORTED;
    }

    let args = shell_args("ShowHII");
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let mode = match args.as_slice() {
        [_] => Mode::List,
        [_, "save"] => Mode::Save(None),
        [_, "save", index] => match index.parse() {
            Ok(index) => Mode::Save(Some(index)),
            Err(_) => return usage(),
        },
        _ => return usage(),
    };

    let db = match lesson_support::locate::<HiiDatabase>() {
        Ok(db) => db,
        Err(status) => {
            error!("ERROR: Could not find HII Database protocol: {status}");
            return status;
        }
    };
    let export = match db.export_package_lists(None) {
        Ok(export) => export,
        Err(status) => {
            error!("ERROR: Could not retrieve the package list: {status}");
            return status;
        }
    };

    for (index, list) in PackageLists::new(&export).enumerate() {
        let list = match list {
            Ok(list) => list,
            Err(e) => {
                error!("{e}");
                return Status::COMPROMISED_DATA;
            }
        };
        match mode {
            Mode::List => print_list(index, &list),
            Mode::Save(only) if only.is_none_or(|only| only == index) => save_list(index, &list),
            Mode::Save(_) => {}
        }
    }
    Status::SUCCESS
}

fn usage() -> Status {
    println!("Usage:");
    println!("  ShowHII [save [<PackageList index>]]");
    Status::INVALID_PARAMETER
}

fn print_list(index: usize, list: &PackageList<'_>) {
    println!(
        "PackageList[{index}]: GUID={}; size=0x{:X}",
        list.guid,
        list.length()
    );
    for (j, package) in list.packages().enumerate() {
        match package {
            Ok(package) => println!(
                "\tPackage[{j}]: type={}; size=0x{:X}",
                package_type_name(package.ty()),
                package.header.length()
            ),
            Err(e) => {
                error!("\t{e}");
                break;
            }
        }
    }
}

fn save_list(index: usize, list: &PackageList<'_>) {
    let name = list.file_name(index);
    println!("Save file as {name}");
    if let Err(status) = file_name(&name).and_then(|path| save_file(&path, list.bytes)) {
        error!("Error! Failed to write PackageList {index}: {status}");
    }
}
