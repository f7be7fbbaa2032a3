//! # Memory Info
//!
//! Prints the UEFI memory map.
//!
//! ```text
//! MemoryInfo          condensed OS view, contiguous runs merged
//! MemoryInfo full     every descriptor with type and attributes
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]
extern crate alloc;

use alloc::vec::Vec;
use firmware_types::memory::{
    self, MemoryAttributes, MemoryRegion, PAGE_SIZE, coalesce, summarize,
};
use lesson_support::args::shell_args;
use log::{LevelFilter, error};
use uefi::boot::MemoryType;
use uefi::mem::memory_map::MemoryMap;
use uefi::prelude::*;
use uefi::println;

#[entry]
fn efi_main() -> Status {
    if lesson_support::init(LevelFilter::Info).is_err() {
        return Status::UNSUPPORTED;
    }

    let args = shell_args("MemoryInfo");
    let full = args.get(1).is_some_and(|arg| arg == "full");

    let regions = match read_memory_map() {
        Ok(regions) => regions,
        Err(status) => return status,
    };

    if full {
        for (i, region) in regions.iter().enumerate() {
            println!("{}", region.describe(i));
        }
        print_summary(&regions);
    } else {
        for range in coalesce(&regions) {
            println!("{range}");
        }
    }
    Status::SUCCESS
}

fn read_memory_map() -> Result<Vec<MemoryRegion>, Status> {
    let map = boot::memory_map(MemoryType::LOADER_DATA).map_err(|e| {
        error!("GetMemoryMap error: {:?}", e.status());
        e.status()
    })?;

    Ok(map
        .entries()
        .map(|desc| MemoryRegion {
            ty: desc.ty.0,
            phys_start: desc.phys_start,
            page_count: desc.page_count,
            attributes: MemoryAttributes::from_bits(desc.att.bits()),
        })
        .collect())
}

fn print_summary(regions: &[MemoryRegion]) {
    println!();
    let mut total = 0u64;
    for (ty, pages) in summarize(regions) {
        total += pages;
        println!(
            "{:<28}{:>10} pages {:>8} KiB",
            memory::memory_type_name(ty),
            pages,
            pages * PAGE_SIZE / 1024
        );
    }
    println!("{:<28}{:>10} pages {:>8} MiB", "Total", total, total * PAGE_SIZE / (1024 * 1024));
}
