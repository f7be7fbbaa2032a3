//! # Dump PCI ROMs
//!
//! Lists every PCI function whose option ROM was copied to memory by the
//! PCI bus driver and decodes the image chain of that ROM.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]
extern crate alloc;

use alloc::string::String;
use firmware_pci::PciError;
use firmware_pci::ids::PciIds;
use firmware_pci::rom::{
    RomImage, RomImages, code_type_name, compression_name, machine_type_name, subsystem_name,
};
use lesson_support::file_system::{file_name, load_file};
use lesson_support::protocols::PciIo;
use log::{LevelFilter, error};
use uefi::prelude::*;
use uefi::{print, println};

const PCI_IDS: &str = "pci.ids";

#[entry]
fn efi_main() -> Status {
    if lesson_support::init(LevelFilter::Info).is_err() {
        return Status::UNSUPPORTED;
    }

    let handles = match lesson_support::handles::<PciIo>() {
        Ok(handles) => handles,
        Err(status) => {
            error!("Can't locate EFI_PCI_IO_PROTOCOL: {status}");
            return status;
        }
    };

    let ids = load_ids();
    let ids = ids.as_deref().map(PciIds::new);

    for handle in handles {
        let pci_io = match lesson_support::open_shared::<PciIo>(handle) {
            Ok(pci_io) => pci_io,
            Err(status) => {
                error!("Can't open protocol: {status}");
                return status;
            }
        };
        if let Err(status) = print_function(&pci_io, ids.as_ref()) {
            error!("Error in PCI printing: {status}");
        }
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

fn print_function(pci_io: &PciIo, ids: Option<&PciIds<'_>>) -> Result<(), Status> {
    let Some(rom) = pci_io.rom() else {
        return Ok(());
    };
    let location = pci_io.location()?;
    let header = pci_io.read_header()?;

    print!(
        "{location} - Vendor:{:04x}, Device:{:04x}",
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

    let base = pci_io.rom_address();
    println!(
        "Has OptionROM at memory {base:016X}-{:016X}",
        base + rom.len() as u64
    );
    for (index, image) in RomImages::new(rom).enumerate() {
        match image {
            Ok(image) => print_image(base, index, &image),
            Err(PciError::BadRomSignature(0)) => println!("Error! OptionROM has a wrong signature"),
            Err(PciError::BadRomSignature(_) | PciError::BadPcirSignature(_)) => {
                println!("Error! OptionROM image has wrong signature");
            }
            Err(e) => println!("Error! {e}"),
        }
    }
    println!("------------------");
    Ok(())
}

fn print_image(base: u64, index: usize, image: &RomImage) {
    let start = base + image.offset as u64;
    println!("---Code Image {}---", index + 1);
    println!("Address: {start:016X}-{:016X}", start + image.length as u64);
    println!(
        "VendorId: {:04x}, DeviceId: {:04x}",
        image.vendor_id, image.device_id
    );
    println!("Type: {}", code_type_name(image.code_type));
    let Some(efi) = image.efi else {
        return;
    };
    if efi.signature_valid() {
        println!("Subsystem: {}", subsystem_name(efi.subsystem));
        println!("Machine type: {}", machine_type_name(efi.machine_type));
        println!("{}", compression_name(efi.compression_type));
    } else {
        println!("EFI signature is incorrect!");
    }
}
