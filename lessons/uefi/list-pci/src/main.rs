//! # List PCI
//!
//! Scans the buses of every PCI root bridge and names the functions found
//! with the help of a `pci.ids` database next to the application.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]
extern crate alloc;

use alloc::string::String;
use firmware_pci::config::scan;
use firmware_pci::ids::PciIds;
use firmware_pci::resources::bus_ranges;
use lesson_support::file_system::{file_name, load_file};
use lesson_support::protocols::PciRootBridgeIo;
use log::{LevelFilter, error};
use uefi::prelude::*;
use uefi::{print, println};

const PCI_IDS: &str = "pci.ids";

#[entry]
fn efi_main() -> Status {
    if lesson_support::init(LevelFilter::Info).is_err() {
        return Status::UNSUPPORTED;
    }

    let handles = match lesson_support::handles::<PciRootBridgeIo>() {
        Ok(handles) => handles,
        Err(status) => {
            error!("Can't locate EFI_PCI_ROOT_BRIDGE_IO_PROTOCOL: {status}");
            return status;
        }
    };
    println!("Number of PCI root bridges in the system: {}", handles.len());

    let ids = load_ids();
    let ids = ids.as_deref().map(PciIds::new);

    for (index, handle) in handles.into_iter().enumerate() {
        let bridge = match lesson_support::open_shared::<PciRootBridgeIo>(handle) {
            Ok(bridge) => bridge,
            Err(status) => {
                error!("Can't open protocol: {status}");
                return status;
            }
        };
        println!("\nPCI Root Bridge {index}");
        print_root_bridge(&bridge, ids.as_ref());
    }
    Status::SUCCESS
}

fn load_ids() -> Option<String> {
    let path = file_name(PCI_IDS).ok()?;
    match load_file(&path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(status) => {
            println!("No file {PCI_IDS}: {status}");
            None
        }
    }
}

fn print_root_bridge(bridge: &PciRootBridgeIo, ids: Option<&PciIds<'_>>) {
    let spaces = match bridge.configuration() {
        Ok(spaces) => spaces,
        Err(status) => {
            println!("\tError! Can't get EFI_ACPI_ADDRESS_SPACE_DESCRIPTOR: {status}");
            return;
        }
    };
    for range in bus_ranges(&spaces) {
        for mut location in scan(range) {
            location.segment = bridge.segment_number();
            let header = match bridge.read_header(location.config_address(0)) {
                Ok(header) => header,
                Err(status) => {
                    println!("\tError in PCI read: {status}");
                    continue;
                }
            };
            if !header.is_present() {
                continue;
            }
            print!(
                "  {location} - Vendor:{:04x}, Device:{:04x}",
                header.vendor_id, header.device_id
            );
            match ids {
                Some(ids) => {
                    let names = ids.lookup(header.vendor_id, header.device_id);
                    println!(
                        ":    {}, {}",
                        names.vendor_or_undefined(),
                        names.device_or_undefined()
                    );
                }
                None => println!(),
            }
        }
    }
}
