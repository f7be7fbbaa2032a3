//! # FFS File
//!
//! Browses the files of the firmware volumes through
//! `EFI_FIRMWARE_VOLUME2_PROTOCOL`.
//!
//! ```text
//! FfsFile                                   list all files
//! FfsFile <FileGUID>                        dump a file and its sections
//! FfsFile <FileGUID> <SectionType> <N>      dump one section
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]
extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use firmware_types::Guid;
use firmware_types::ffs::{
    SECTION_ARGUMENTS, Sections, file_type, file_type_name, parse_section_type,
    section_type_name,
};
use firmware_types::hexdump::HexDump;
use lesson_support::args::{parse_guid, shell_args};
use lesson_support::protocols::FirmwareVolume2;
use lesson_support::protocols::firmware_volume::{FileData, SectionData};
use log::{LevelFilter, error};
use uefi::boot::ScopedProtocol;
use uefi::prelude::*;
use uefi::{print, println};

#[entry]
fn efi_main() -> Status {
    if lesson_support::init(LevelFilter::Info).is_err() {
        return Status::UNSUPPORTED;
    }

    let args = shell_args("FfsFile");
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    if !matches!(args.len(), 1 | 2 | 4) {
        return usage();
    }
    let file = match args.get(1).map(|arg| parse_guid(arg)) {
        Some(Some(guid)) => Some(guid),
        Some(None) => {
            println!("Error! Can't convert <File GUID> argument to GUID");
            return Status::INVALID_PARAMETER;
        }
        None => None,
    };
    let section = match args.get(2..4) {
        Some([ty, instance]) => {
            let Some(ty) = parse_section_type(ty) else {
                println!("Error! Wrong <SectionType>");
                return Status::INVALID_PARAMETER;
            };
            let Ok(instance) = instance.parse::<usize>() else {
                return usage();
            };
            Some((ty, instance))
        }
        _ => None,
    };

    let volumes = match volumes() {
        Ok(volumes) => volumes,
        Err(status) => {
            error!("Error! Can't locate EFI_FIRMWARE_VOLUME2_PROTOCOL: {status}");
            return status;
        }
    };

    match (file, section) {
        (None, _) => {
            for volume in &volumes {
                print_files(volume);
            }
            Status::SUCCESS
        }
        (Some(name), None) => match find_file(&volumes, &name) {
            Ok(file) => {
                print_file(&file);
                Status::SUCCESS
            }
            Err(status) => {
                println!("Error! ReadFile returned error: {status}");
                status
            }
        },
        (Some(name), Some((ty, instance))) => {
            println!("Section {} {instance}", section_type_name(ty));
            match find_section(&volumes, &name, ty, instance) {
                Ok(section) => {
                    println!(
                        "AuthenticationStatus=0x{:08x} ({})",
                        section.auth_status.into_bits(),
                        section.auth_status
                    );
                    print!("{}", HexDump::offset(&section.data));
                    Status::SUCCESS
                }
                Err(status) => {
                    println!("Error! ReadSection returned error: {status}");
                    status
                }
            }
        }
    }
}

fn usage() -> Status {
    println!("Usage:");
    println!("  FfsFile [<FileGUID> [<SectionType> <SectionInstance>]]");
    println!();
    println!("<FileGUID>:");
    println!("GUID name of the File in FFS");
    println!();
    println!("<SectionType>:");
    println!("{SECTION_ARGUMENTS}");
    println!();
    println!("<SectionInstance>: section instance number in a target file");
    Status::INVALID_PARAMETER
}

fn volumes() -> Result<Vec<ScopedProtocol<FirmwareVolume2>>, Status> {
    lesson_support::handles::<FirmwareVolume2>()?
        .into_iter()
        .map(lesson_support::open_shared::<FirmwareVolume2>)
        .collect()
}

fn print_files(volume: &FirmwareVolume2) {
    match volume.files() {
        Ok(files) => {
            for file in files {
                println!(
                    "{} - {} - {} bytes",
                    file.name,
                    file_type_name(file.file_type),
                    file.size
                );
            }
        }
        Err(status) => error!("Error! GetNextFile returned error: {status}"),
    }
}

/// Reads `name` from the first volume that has it.
fn find_file(volumes: &[ScopedProtocol<FirmwareVolume2>], name: &Guid) -> Result<FileData, Status> {
    let mut last = Status::NOT_FOUND;
    for volume in volumes {
        match volume.read_file(name) {
            Ok(file) => return Ok(file),
            Err(status) => last = status,
        }
    }
    Err(last)
}

fn find_section(
    volumes: &[ScopedProtocol<FirmwareVolume2>],
    name: &Guid,
    ty: u8,
    instance: usize,
) -> Result<SectionData, Status> {
    let mut last = Status::NOT_FOUND;
    for volume in volumes {
        match volume.read_section(name, ty, instance) {
            Ok(section) => return Ok(section),
            Err(status) => last = status,
        }
    }
    Err(last)
}

fn print_file(file: &FileData) {
    println!("FileType={}", file_type_name(file.file_type));
    println!("FileAttributes=0x{:08x}", file.attributes);
    println!(
        "AuthenticationStatus=0x{:08x} ({})",
        file.auth_status.into_bits(),
        file.auth_status
    );
    println!();
    println!("Raw Data:");
    print!("{}", HexDump::offset(&file.data));
    println!("-------------------------------------");
    if file.file_type == file_type::RAW {
        return;
    }

    println!("Parsed Data:\n");
    for section in Sections::new(&file.data) {
        match section {
            Ok(section) => {
                println!(
                    "Section {}, size 0x{:08x}",
                    section_type_name(section.ty),
                    section.size
                );
                if let Some(name) = section.user_interface() {
                    println!("Name: {name}");
                } else if let Some((build, version)) = section.version() {
                    println!("Build: {build}, Version: {version}");
                }
                println!("Data:");
                print!("{}", HexDump::offset(section.data));
            }
            Err(e) => {
                error!("{e}");
                break;
            }
        }
    }
}
