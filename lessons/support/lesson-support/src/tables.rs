//! # System Configuration Table
//!
//! Lookup of vendor tables published in `EFI_SYSTEM_TABLE.ConfigurationTable`.

use alloc::vec::Vec;
use firmware_types::guid;
use uefi::prelude::*;
use uefi::table::cfg::{ACPI_GUID, ACPI2_GUID, SMBIOS_GUID, SMBIOS3_GUID};
use uefi::Guid;

const KNOWN_TABLES: &[(Guid, &str)] = &[
    (ACPI_GUID, "ACPI 1.0 RSDP"),
    (ACPI2_GUID, "ACPI 2.0 RSDP"),
    (SMBIOS_GUID, "SMBIOS"),
    (SMBIOS3_GUID, "SMBIOS 3.0"),
    (guid!("05ad34ba-6f02-4214-952e-4da0398e2bb9"), "DXE Services"),
    (guid!("7739f24c-93d7-11d4-9a3a-0090273fc14d"), "HOB List"),
    (guid!("4c19049f-4137-4dd3-9c10-8b97a83ffdfa"), "Memory Type Information"),
    (guid!("49152e77-1ada-4764-b7a2-7afefed95e8b"), "Debug Image Info"),
    (guid!("ee4e5898-3914-4259-9d6e-dc7bd79403cf"), "LZMA Custom Decompress"),
    (guid!("dcfa911d-26eb-469f-a220-38b7dc461220"), "Memory Attributes"),
    (guid!("b122a263-3661-4f68-9929-78f8b0d62180"), "ESRT"),
    (guid!("060cc026-4c0d-4dda-8f41-595fef00a502"), "Memory Status Code Record"),
    (guid!("eb66918a-7eef-402a-842e-931d21c38ae9"), "Runtime Properties"),
    (guid!("1e2ed096-30e2-4254-bd89-863bbef82325"), "TCG2 Final Events"),
    (guid!("b1b621d5-f19c-41a5-830b-d9152c69aae0"), "Device Tree"),
];

/// Human readable name of a configuration table GUID.
#[must_use]
pub fn table_name(guid: &Guid) -> Option<&'static str> {
    KNOWN_TABLES
        .iter()
        .find(|(known, _)| known == guid)
        .map(|&(_, name)| name)
}

/// All entries as `(guid, address)` pairs.
#[must_use]
pub fn entries() -> Vec<(Guid, u64)> {
    system::with_config_table(|table| {
        table
            .iter()
            .map(|entry| (entry.guid, entry.address as usize as u64))
            .collect()
    })
}

/// Address of the table registered under `guid`.
#[must_use]
pub fn find(guid: &Guid) -> Option<u64> {
    system::with_config_table(|table| {
        table
            .iter()
            .find(|entry| entry.guid == *guid)
            .map(|entry| entry.address as usize as u64)
    })
}

/// Physical address of the RSDP, preferring the ACPI 2.0 entry.
#[must_use]
pub fn find_rsdp_addr() -> Option<u64> {
    find(&ACPI2_GUID).or_else(|| find(&ACPI_GUID))
}

/// Address of the SMBIOS entry point, preferring the 3.0 entry.
#[must_use]
pub fn find_smbios_addr() -> Option<u64> {
    find(&SMBIOS3_GUID).or_else(|| find(&SMBIOS_GUID))
}
