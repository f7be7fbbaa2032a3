//! # ACPI Info
//!
//! Finds the RSDP in the configuration table, prints the root tables and
//! every table listed in the XSDT.
//!
//! ```text
//! AcpiInfo          list tables
//! AcpiInfo save     also write each table to <SIGNATURE>.aml
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]
extern crate alloc;

use firmware_acpi::rsdp::AcpiRoots;
use firmware_acpi::sdt::{self, Table};
use lesson_support::args::shell_args;
use lesson_support::file_system::{file_name, save_file};
use lesson_support::phys::IdentityMap;
use lesson_support::tables::find_rsdp_addr;
use log::{LevelFilter, error};
use uefi::prelude::*;
use uefi::println;

#[entry]
fn efi_main() -> Status {
    if lesson_support::init(LevelFilter::Info).is_err() {
        return Status::UNSUPPORTED;
    }

    let save = shell_args("AcpiInfo").get(1).is_some_and(|arg| arg == "save");

    let Some(rsdp_addr) = find_rsdp_addr() else {
        println!("No ACPI2.0 table was found in the system");
        return Status::SUCCESS;
    };
    println!("RSDP table is placed at {rsdp_addr:016X}\n");

    // SAFETY: firmware tables are identity mapped while boot services run.
    let roots = match unsafe { AcpiRoots::parse(&IdentityMap, rsdp_addr) } {
        Ok(roots) => roots,
        Err(e) => {
            error!("Error! RSDP is not valid: {e}");
            return Status::COMPROMISED_DATA;
        }
    };

    println!("System description tables:");
    println!("\tRSDT table is placed at address {:016X}", roots.rsdt_addr.unwrap_or(0));
    println!("\tXSDT table is placed at address {:016X}", roots.xsdt_addr.unwrap_or(0));
    println!();

    let tables = match unsafe { sdt::tables(&IdentityMap, &roots) } {
        Ok(tables) => tables,
        Err(e) => {
            error!("Error! Root table is not valid: {e}");
            return Status::COMPROMISED_DATA;
        }
    };

    println!("Main ACPI tables:");
    for table in &tables {
        println!(
            "\t{} table is placed at address {:016X} with length 0x{:x}",
            table.header.signature, table.address, table.header.length
        );
        if save {
            save_table(table);
        }
    }
    Status::SUCCESS
}

fn save_table(table: &Table) {
    let name = table.header.signature.file_name();
    // SAFETY: the header was read from the same identity mapped address.
    let bytes = unsafe { table.bytes(&IdentityMap) };
    if let Err(status) = file_name(&name).and_then(|path| save_file(&path, bytes)) {
        error!("Error in WriteFile: {status}");
    }
}
