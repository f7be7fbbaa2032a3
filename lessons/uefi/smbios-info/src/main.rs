//! # SMBIOS Info
//!
//! Walks the SMBIOS structure table and decodes the BIOS, system and
//! baseboard information structures, then walks the same records a second
//! time through `EFI_SMBIOS_PROTOCOL.GetNext`.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]
extern crate alloc;

use firmware_smbios::entry::{ENTRY_V2_LEN, EntryPoint};
use firmware_smbios::records::{
    BaseboardInformation, BiosInformation, SystemInformation, board_type_name, structure_type,
    type_name, wake_up_type_name,
};
use firmware_smbios::structure::{Structure, Structures};
use lesson_support::phys::bytes_at;
use lesson_support::protocols::Smbios;
use lesson_support::tables::find_smbios_addr;
use log::{LevelFilter, error};
use uefi::prelude::*;
use uefi::println;

#[entry]
fn efi_main() -> Status {
    if lesson_support::init(LevelFilter::Info).is_err() {
        return Status::UNSUPPORTED;
    }

    let Some(addr) = find_smbios_addr() else {
        println!("No SMBIOS table was found in the system");
        return Status::NOT_FOUND;
    };
    println!("SMBIOS table is placed at {addr:016X}\n");

    // SAFETY: the entry point is identity mapped; the 2.1 layout is the
    // longer of the two.
    let entry = match EntryPoint::parse(unsafe { bytes_at(addr, ENTRY_V2_LEN) }) {
        Ok(entry) => entry,
        Err(e) => {
            error!("SMBIOS entry point is not valid: {e}");
            return Status::COMPROMISED_DATA;
        }
    };
    let (major, minor) = entry.version();
    println!("SMBIOS version {major}.{minor}\n");

    // SAFETY: the entry point describes the structure table's extent.
    let table = unsafe { bytes_at(entry.table_address(), entry.table_length()) };
    for structure in Structures::new(table) {
        match structure {
            Ok(structure) => print_structure(&structure),
            Err(e) => {
                error!("{e}");
                return Status::COMPROMISED_DATA;
            }
        }
    }

    walk_protocol()
}

fn walk_protocol() -> Status {
    let smbios = match lesson_support::locate::<Smbios>() {
        Ok(smbios) => smbios,
        Err(status) => {
            error!("Can't locate EFI_SMBIOS_PROTOCOL: {status}");
            return status;
        }
    };
    println!(
        "\nEFI_SMBIOS_PROTOCOL, SMBIOS version {}.{}\n",
        smbios.major_version, smbios.minor_version
    );
    for record in smbios.records() {
        match Structures::new(&record).next() {
            Some(Ok(structure)) => print_structure(&structure),
            Some(Err(e)) => error!("{e}"),
            None => error!("Empty SMBIOS record"),
        }
    }
    Status::SUCCESS
}

fn print_structure(s: &Structure<'_>) {
    println!("SMBIOS Type {} ", s.ty);
    let decoded = match s.ty {
        structure_type::BIOS_INFORMATION => BiosInformation::parse(s).map(|bios| {
            let (major, minor) = bios.system_bios_release.unwrap_or_default();
            println!("\tVendor={}", bios.vendor);
            println!("\tBiosVersion={}", bios.bios_version);
            println!("\tBiosReleaseDate={}", bios.bios_release_date);
            println!("\tBiosSegment=0x{:x}", bios.bios_segment);
            println!("\tSystemBiosMajorRelease=0x{major:x}");
            println!("\tSystemBiosMinorRelease=0x{minor:x}");
        }),
        structure_type::SYSTEM_INFORMATION => SystemInformation::parse(s).map(|system| {
            let wake_up = system.wake_up_type.unwrap_or_default();
            println!("\tManufacturer={}", system.manufacturer);
            println!("\tProductName={}", system.product_name);
            println!("\tVersion={}", system.version);
            println!("\tSerialNumber={}", system.serial_number);
            if let Some(uuid) = system.uuid {
                println!("\tUUID={uuid}");
            }
            println!("\tWakeUpType={wake_up} ({})", wake_up_type_name(wake_up));
            println!("\tSKUNumber={}", system.sku_number);
            println!("\tFamily={}", system.family);
        }),
        structure_type::BASEBOARD_INFORMATION => BaseboardInformation::parse(s).map(|board| {
            println!("\tManufacturer={}", board.manufacturer);
            println!("\tProduct={}", board.product);
            println!("\tVersion={}", board.version);
            println!("\tSerialNumber={}", board.serial_number);
            println!("\tAssetTag={}", board.asset_tag);
            println!("\tLocationInChassis={}", board.location_in_chassis);
            if let Some(ty) = board.board_type {
                println!("\tBoardType=0x{ty:x} ({})", board_type_name(ty));
            }
        }),
        ty => {
            println!("\t{}", type_name(ty));
            Ok(())
        }
    };
    if let Err(e) = decoded {
        error!("\tHandle 0x{:04x}: {e}", s.handle);
    }
}
