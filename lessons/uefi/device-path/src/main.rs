//! # Device Path
//!
//! Builds PCI device path nodes and paths statically, dynamically and from
//! text, combines them with `EFI_DEVICE_PATH_UTILITIES_PROTOCOL` and prints
//! them through `EFI_DEVICE_PATH_TO_TEXT_PROTOCOL`.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]
extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use firmware_types::device_path::{END_ENTIRE, pci_node};
use lesson_support::device_path::{node_from_text, node_text, path_from_text, path_text};
use log::{LevelFilter, error};
use uefi::prelude::*;
use uefi::println;
use uefi::proto::device_path::build::{self, DevicePathBuilder};
use uefi::proto::device_path::util::DevicePathUtilities;
use uefi::proto::device_path::{DevicePath, DevicePathNode, DeviceSubType, DeviceType};

const EXAMPLE_PCI_DEVICE: u8 = 3;
const EXAMPLE_PCI_FUNCTION: u8 = 5;

const PCI_NODE_STATIC: [u8; 6] = pci_node(EXAMPLE_PCI_DEVICE, EXAMPLE_PCI_FUNCTION);

/// `Pci(0x3,0x5)` followed by End Entire, laid out at compile time.
const PCI_PATH_STATIC: [u8; 10] = [
    PCI_NODE_STATIC[0], PCI_NODE_STATIC[1], PCI_NODE_STATIC[2], PCI_NODE_STATIC[3],
    PCI_NODE_STATIC[4], PCI_NODE_STATIC[5],
    END_ENTIRE[0], END_ENTIRE[1], END_ENTIRE[2], END_ENTIRE[3],
];

#[entry]
fn efi_main() -> Status {
    if lesson_support::init(LevelFilter::Info).is_err() {
        return Status::UNSUPPORTED;
    }
    match run() {
        Ok(()) => Status::SUCCESS,
        Err(status) => {
            error!("Device path lesson failed: {status}");
            status
        }
    }
}

fn run() -> Result<(), Status> {
    let node_static = <&DevicePathNode>::try_from(PCI_NODE_STATIC.as_slice())
        .map_err(|_| Status::INVALID_PARAMETER)?;
    println!("PciDevicePathNodeStatic: {}", node_text(node_static)?);

    let mut node_buf = Vec::new();
    let single = DevicePathBuilder::with_vec(&mut node_buf)
        .push(&build::hardware::Pci {
            function: EXAMPLE_PCI_FUNCTION,
            device: EXAMPLE_PCI_DEVICE,
        })
        .and_then(DevicePathBuilder::finalize)
        .map_err(|e| {
            error!("Can't build the PCI node: {e:?}");
            Status::BUFFER_TOO_SMALL
        })?;
    let node_dynamic = single.node_iter().next().ok_or(Status::NOT_FOUND)?;
    println!("PciDevicePathNodeDynamic: {}", node_text(node_dynamic)?);

    let static_path = <&DevicePath>::try_from(PCI_PATH_STATIC.as_slice())
        .map_err(|_| Status::INVALID_PARAMETER)?;
    println!("PciDevicePathStatic: {}", path_text(static_path)?);

    let utilities = lesson_support::locate::<DevicePathUtilities>().inspect_err(|status| {
        error!("Can't locate EFI_DEVICE_PATH_UTILITIES_PROTOCOL: {status}");
    })?;
    let empty =
        <&DevicePath>::try_from(END_ENTIRE.as_slice()).map_err(|_| Status::INVALID_PARAMETER)?;
    let path_dynamic = utilities
        .append_node(empty, node_dynamic)
        .map_err(|e| e.status())?;
    println!("PciDevicePathDynamic: {}", path_text(&path_dynamic)?);
    println!("_____________________\n");

    let mut multi = path_dynamic;
    for _ in 0..3 {
        multi = utilities
            .append_node(&multi, node_dynamic)
            .map_err(|e| e.status())?;
    }
    println!(
        "Complicated DevicePath (AppendDevicePathNode): {}",
        path_text(&multi)?
    );

    let doubled = utilities
        .append_path(&multi, &multi)
        .map_err(|e| e.status())?;
    println!(
        "Complicated DevicePath (AppendDevicePath): {}",
        path_text(&doubled)?
    );
    println!("_____________________\n");

    let pci_nodes = doubled
        .node_iter()
        .filter(|node| node.full_type() == (DeviceType::HARDWARE, DeviceSubType::HARDWARE_PCI))
        .count();
    println!("Last device path has {pci_nodes} PCI nodes");
    println!("_____________________\n");

    let node_from = node_from_text("Pci(0x3,0x5)")?;
    println!("PciDevicePathNodeFromText: {}", node_text(&node_from)?);
    let path_from = path_from_text("Pci(0x3,0x5)")?;
    println!("PciDevicePathFromText: {}", show(&path_from));
    Ok(())
}

fn show(path: &DevicePath) -> String {
    path_text(path).unwrap_or_else(|status| alloc::format!("<{status}>"))
}
