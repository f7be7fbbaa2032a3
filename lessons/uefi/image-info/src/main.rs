//! # Image Info
//!
//! Prints where the running image was loaded from and where it lives in
//! memory.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]
extern crate alloc;

use lesson_support::device_path::path_text;
use log::{LevelFilter, error};
use uefi::boot;
use uefi::prelude::*;
use uefi::println;
use uefi::proto::device_path::{DevicePath, LoadedImageDevicePath};
use uefi::proto::loaded_image::LoadedImage;

#[entry]
fn efi_main() -> Status {
    if lesson_support::init(LevelFilter::Info).is_err() {
        return Status::UNSUPPORTED;
    }

    let image = boot::image_handle();
    let loaded_image = match lesson_support::open_shared::<LoadedImage>(image) {
        Ok(loaded_image) => loaded_image,
        Err(status) => {
            error!("Can't get EFI_LOADED_IMAGE_PROTOCOL, Status={status}");
            return Status::SUCCESS;
        }
    };
    let device_path = match lesson_support::open_shared::<LoadedImageDevicePath>(image) {
        Ok(device_path) => device_path,
        Err(status) => {
            error!("Can't get EFI_LOADED_IMAGE_DEVICE_PATH_PROTOCOL, Status={status}");
            return Status::SUCCESS;
        }
    };

    println!("Image device: {}", show(&device_path));
    match loaded_image.file_path() {
        Some(path) => println!("Image file: {}", show(path)),
        None => println!("Image file: <none>"),
    }
    let (base, size) = loaded_image.info();
    println!("Image Base: {:X}", base as usize);
    println!("Image Size: {size:X}");
    Status::SUCCESS
}

fn show(path: &DevicePath) -> alloc::string::String {
    path_text(path).unwrap_or_else(|status| alloc::format!("<{status}>"))
}
