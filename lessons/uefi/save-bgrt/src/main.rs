//! # Save BGRT
//!
//! Writes the boot logo referenced by the ACPI BGRT table to `BGRT.bmp`.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]
extern crate alloc;

use firmware_acpi::bgrt::{BMP_HEADER_LEN, Bgrt, BmpHeader};
use firmware_acpi::rsdp::AcpiRoots;
use firmware_acpi::sdt::{Signature, find_table};
use lesson_support::file_system::{file_name, save_file};
use lesson_support::phys::{IdentityMap, bytes_at};
use lesson_support::tables::find_rsdp_addr;
use log::{LevelFilter, error};
use uefi::prelude::*;
use uefi::println;

const FILE_NAME: &str = "BGRT.bmp";

#[entry]
fn efi_main() -> Status {
    if lesson_support::init(LevelFilter::Info).is_err() {
        return Status::UNSUPPORTED;
    }

    let Some(bgrt) = find_bgrt() else {
        println!("BGRT table is not present in the system");
        return Status::UNSUPPORTED;
    };
    if !bgrt.is_bmp() || bgrt.image_address == 0 {
        println!("BGRT table does not reference a BMP image");
        return Status::UNSUPPORTED;
    }

    // SAFETY: the BGRT image lives in boot services memory which stays
    // identity mapped while the application runs.
    let header = unsafe { bytes_at(bgrt.image_address, BMP_HEADER_LEN) };
    let bmp = match BmpHeader::parse(header) {
        Ok(bmp) => bmp,
        Err(_) => {
            println!("BMP image has wrong signature!");
            return Status::UNSUPPORTED;
        }
    };
    println!(
        "BGRT contains BMP image with {}x{} resolution",
        bmp.width, bmp.height
    );

    // SAFETY: as above, for the size the image declares.
    let image = unsafe { bytes_at(bgrt.image_address, bmp.size as usize) };
    let path = match file_name(FILE_NAME) {
        Ok(path) => path,
        Err(status) => return status,
    };
    println!("Save it to {FILE_NAME}");
    match save_file(&path, image) {
        Ok(()) => Status::SUCCESS,
        Err(status) => {
            error!("Can't write file: {status}");
            status
        }
    }
}

fn find_bgrt() -> Option<Bgrt> {
    let rsdp_addr = find_rsdp_addr()?;
    // SAFETY: firmware tables are identity mapped while boot services run.
    let roots = unsafe { AcpiRoots::parse(&IdentityMap, rsdp_addr) }.ok()?;
    let table = unsafe { find_table(&IdentityMap, &roots, Signature::BGRT) }.ok()??;
    let bytes = unsafe { table.bytes(&IdentityMap) };
    match Bgrt::parse(bytes) {
        Ok(bgrt) => Some(bgrt),
        Err(e) => {
            error!("BGRT table is malformed: {e}");
            None
        }
    }
}
