//! # HII Config
//!
//! Talks to `EFI_HII_CONFIG_ROUTING_PROTOCOL`: dumps the configuration of
//! every storage, extracts single storages or blocks, and routes new values
//! back to their drivers.
//!
//! ```text
//! HIIConfig dump
//! HIIConfig extract <ConfigStr>
//! HIIConfig extract <Guid> <Name> <Path> [<Offset> <Width>]
//! HIIConfig route <ConfigStr>
//! HIIConfig route <Guid> <Name> <Path> <Offset> <Width> <Value>
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]
extern crate alloc;

use alloc::string::String;
use firmware_hii::config::{
    ConfigRender, LongString, Progress, block_config, block_request, config_header,
};
use lesson_support::args::{parse_guid, shell_args};
use lesson_support::device_path::{installed_path, text_of};
use lesson_support::protocols::HiiConfigRouting;
use log::{LevelFilter, error};
use uefi::prelude::*;
use uefi::println;

#[entry]
fn efi_main() -> Status {
    if lesson_support::init(LevelFilter::Info).is_err() {
        return Status::UNSUPPORTED;
    }

    let routing = match lesson_support::locate::<HiiConfigRouting>() {
        Ok(routing) => routing,
        Err(status) => {
            error!("Error! Can't locate gEfiHiiConfigRoutingProtocolGuid: {status}");
            return status;
        }
    };

    let args = shell_args("HIIConfig");
    let args: alloc::vec::Vec<&str> = args.iter().map(String::as_str).collect();
    let result = match args.as_slice() {
        [_] => {
            usage();
            Ok(())
        }
        [_, "dump"] => dump(&routing),
        [_, "extract", request] => extract(&routing, request),
        [_, "extract", guid, name, path] => {
            header(guid, name, path).and_then(|request| extract(&routing, &request))
        }
        [_, "extract", guid, name, path, offset, width] => header(guid, name, path)
            .and_then(|header| extract(&routing, &block_request(&header, offset, width))),
        [_, "route", config] => route(&routing, config),
        [_, "route", guid, name, path, offset, width, value] => header(guid, name, path)
            .and_then(|header| route(&routing, &block_config(&header, offset, width, value))),
        _ => {
            println!("Error! Wrong arguments");
            usage();
            Err(Status::INVALID_PARAMETER)
        }
    };
    match result {
        Ok(()) => Status::SUCCESS,
        Err(status) => status,
    }
}

fn usage() {
    println!("Usage:");
    println!("HIIConfig.efi dump");
    println!("HIIConfig.efi extract <ConfigStr>");
    println!("HIIConfig.efi extract <Guid> <Name> <Path>");
    println!("HIIConfig.efi extract <Guid> <Name> <Path> <Offset> <Width>");
    println!("HIIConfig.efi route <ConfigStr>");
    println!("HIIConfig.efi route <Guid> <Name> <Path> <Offset> <Width> <Value>");
}

/// Builds the `<ConfigHdr>` for a storage of the driver owning `path`.
fn header(guid: &str, name: &str, path: &str) -> Result<String, Status> {
    let Some(guid) = parse_guid(guid) else {
        println!("Error! Can't convert <FormsetGuid> argument to GUID");
        return Err(Status::INVALID_PARAMETER);
    };
    let Ok(device_path) = installed_path(path) else {
        println!("Error! Can't get DriverHandle");
        return Err(Status::INVALID_PARAMETER);
    };
    Ok(config_header(&guid, name, &device_path))
}

fn dump(routing: &HiiConfigRouting) -> Result<(), Status> {
    let config = routing.export_config()?;
    println!(
        "Full configuration for the HII Database (Size = {}):",
        config.chars().count()
    );
    println!("{}", ConfigRender::new(&config).with_path_text(text_of));
    Ok(())
}

fn extract(routing: &HiiConfigRouting, request: &str) -> Result<(), Status> {
    println!("Request: {request}");
    let response = routing.extract_config(request).map_err(|e| {
        let progress = Progress::new(request, e.progress);
        if !progress.is_complete() {
            println!("Part of string was unparsed {}", progress.unparsed());
        }
        println!("Error! ExtractConfig returned {}", e.status);
        e.status
    })?;
    println!("Response: {}\n", LongString::new(&response));
    println!("{}", ConfigRender::new(&response).with_path_text(text_of));
    Ok(())
}

fn route(routing: &HiiConfigRouting, config: &str) -> Result<(), Status> {
    println!("Request: {config}");
    routing.route_config(config).map_err(|e| {
        let progress = Progress::new(config, e.progress);
        if !progress.is_complete() {
            println!("Part of string was unparsed: {}", progress.unparsed());
            if progress.partially_applied() {
                println!("IMPORTANT: part of the data was written!");
            }
        }
        println!("Error! RouteConfig returned {}", e.status);
        e.status
    })
}
