//! # Image Handle
//!
//! Looks at the handle the firmware gave this image: the handle database
//! signature stored at the start of the handle and every protocol installed
//! on it.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]

use log::{LevelFilter, error};
use uefi::prelude::*;
use uefi::proto::device_path::{DevicePath, LoadedImageDevicePath};
use uefi::proto::loaded_image::LoadedImage;
use uefi::{Guid, Identify, boot, println};

/// `SIGNATURE_32('h','n','d','l')` of an EDK2 `IHANDLE`.
const HANDLE_SIGNATURE: u32 = u32::from_le_bytes(*b"hndl");

const KNOWN_PROTOCOLS: [(Guid, &str); 3] = [
    (LoadedImage::GUID, "EFI_LOADED_IMAGE_PROTOCOL"),
    (LoadedImageDevicePath::GUID, "EFI_LOADED_IMAGE_DEVICE_PATH_PROTOCOL"),
    (DevicePath::GUID, "EFI_DEVICE_PATH_PROTOCOL"),
];

#[entry]
fn efi_main() -> Status {
    if lesson_support::init(LevelFilter::Info).is_err() {
        return Status::UNSUPPORTED;
    }

    let image = boot::image_handle();
    println!("Image handle: {:p}", image.as_ptr());

    // SAFETY: EDK2 handles point at an IHANDLE whose first field is a UINTN
    // signature. Its low 32 bits come first on little-endian targets.
    let signature = unsafe { image.as_ptr().cast::<u32>().read_unaligned() };
    let [a, b, c, d] = signature.to_le_bytes();
    println!(
        "Signature: {} {} {} {}",
        char::from(a),
        char::from(b),
        char::from(c),
        char::from(d)
    );
    if signature != HANDLE_SIGNATURE {
        println!("Not an EDK2 handle database entry");
    }

    let protocols = match boot::protocols_per_handle(image) {
        Ok(protocols) => protocols,
        Err(e) => {
            error!("Can't get the protocols on the image handle: {}", e.status());
            return e.status();
        }
    };
    println!();
    for guid in protocols.iter() {
        match KNOWN_PROTOCOLS.iter().find(|(known, _)| known == *guid) {
            Some((_, name)) => println!("GUID={guid}  {name}"),
            None => println!("GUID={guid}"),
        }
    }
    Status::SUCCESS
}
