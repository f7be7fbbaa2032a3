//! Decoded structure types and structure type names.

use crate::SmbiosError;
use crate::structure::Structure;
use alloc::string::String;
use firmware_types::{Guid, read_guid};

pub mod structure_type {
    pub const BIOS_INFORMATION: u8 = 0;
    pub const SYSTEM_INFORMATION: u8 = 1;
    pub const BASEBOARD_INFORMATION: u8 = 2;
}

const TYPE_NAMES: [&str; 47] = [
    "BIOS Information",
    "System Information",
    "Baseboard Information",
    "System Enclosure",
    "Processor Information",
    "Memory Controller Information",
    "Memory Module Information",
    "Cache Information",
    "Port Connector Information",
    "System Slots",
    "On Board Devices Information",
    "OEM Strings",
    "System Configuration Options",
    "BIOS Language Information",
    "Group Associations",
    "System Event Log",
    "Physical Memory Array",
    "Memory Device",
    "32-Bit Memory Error Information",
    "Memory Array Mapped Address",
    "Memory Device Mapped Address",
    "Built-in Pointing Device",
    "Portable Battery",
    "System Reset",
    "Hardware Security",
    "System Power Controls",
    "Voltage Probe",
    "Cooling Device",
    "Temperature Probe",
    "Electrical Current Probe",
    "Out-of-Band Remote Access",
    "Boot Integrity Services Entry Point",
    "System Boot Information",
    "64-Bit Memory Error Information",
    "Management Device",
    "Management Device Component",
    "Management Device Threshold Data",
    "Memory Channel",
    "IPMI Device Information",
    "System Power Supply",
    "Additional Information",
    "Onboard Devices Extended Information",
    "Management Controller Host Interface",
    "TPM Device",
    "Processor Additional Information",
    "Firmware Inventory Information",
    "String Property",
];

#[must_use]
pub fn type_name(ty: u8) -> &'static str {
    match ty {
        126 => "Inactive",
        127 => "End-of-Table",
        128.. => "OEM-specific",
        _ => TYPE_NAMES.get(usize::from(ty)).copied().unwrap_or("Unknown"),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn require(s: &Structure<'_>, min_len: usize) -> Result<(), SmbiosError> {
    if s.formatted.len() < min_len {
        return Err(SmbiosError::ShortStructure {
            ty: s.ty,
            length: s.formatted.len() as u8,
        });
    }
    Ok(())
}

fn string_at(s: &Structure<'_>, offset: usize) -> String {
    s.byte(offset).map(|n| s.string(n)).unwrap_or_default()
}

/// Type 0.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BiosInformation {
    pub vendor: String,
    pub bios_version: String,
    pub bios_segment: u16,
    pub bios_release_date: String,
    /// `SystemBiosMajorRelease`/`MinorRelease`, SMBIOS 2.4 and later.
    pub system_bios_release: Option<(u8, u8)>,
    /// `EmbeddedControllerFirmware` major/minor, SMBIOS 2.4 and later.
    pub ec_firmware_release: Option<(u8, u8)>,
}

impl BiosInformation {
    /// # Errors
    /// Fails if the structure is shorter than the 2.0 layout.
    pub fn parse(s: &Structure<'_>) -> Result<Self, SmbiosError> {
        require(s, 0x12)?;
        let pair = |at: usize| Some((s.byte(at)?, s.byte(at + 1)?));
        Ok(Self {
            vendor: string_at(s, 0x04),
            bios_version: string_at(s, 0x05),
            bios_segment: s.word(0x06).unwrap_or_default(),
            bios_release_date: string_at(s, 0x08),
            system_bios_release: pair(0x14),
            ec_firmware_release: pair(0x16),
        })
    }
}

/// Type 1.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SystemInformation {
    pub manufacturer: String,
    pub product_name: String,
    pub version: String,
    pub serial_number: String,
    /// SMBIOS 2.1 and later. Stored in the same byte order as an EFI GUID.
    pub uuid: Option<Guid>,
    pub wake_up_type: Option<u8>,
    /// SMBIOS 2.4 and later.
    pub sku_number: String,
    pub family: String,
}

impl SystemInformation {
    /// # Errors
    /// Fails if the structure is shorter than the 2.0 layout.
    pub fn parse(s: &Structure<'_>) -> Result<Self, SmbiosError> {
        require(s, 0x08)?;
        Ok(Self {
            manufacturer: string_at(s, 0x04),
            product_name: string_at(s, 0x05),
            version: string_at(s, 0x06),
            serial_number: string_at(s, 0x07),
            uuid: read_guid(s.formatted, 0x08),
            wake_up_type: s.byte(0x18),
            sku_number: string_at(s, 0x19),
            family: string_at(s, 0x1A),
        })
    }
}

#[must_use]
pub const fn wake_up_type_name(ty: u8) -> &'static str {
    match ty {
        0 => "Reserved",
        1 => "Other",
        2 => "Unknown",
        3 => "APM Timer",
        4 => "Modem Ring",
        5 => "LAN Remote",
        6 => "Power Switch",
        7 => "PCI PME#",
        8 => "AC Power Restored",
        _ => "Undefined",
    }
}

/// Type 2.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BaseboardInformation {
    pub manufacturer: String,
    pub product: String,
    pub version: String,
    pub serial_number: String,
    pub asset_tag: String,
    pub feature_flags: Option<u8>,
    pub location_in_chassis: String,
    pub chassis_handle: Option<u16>,
    pub board_type: Option<u8>,
}

impl BaseboardInformation {
    /// # Errors
    /// Fails if the structure does not carry the four identity strings.
    pub fn parse(s: &Structure<'_>) -> Result<Self, SmbiosError> {
        require(s, 0x08)?;
        Ok(Self {
            manufacturer: string_at(s, 0x04),
            product: string_at(s, 0x05),
            version: string_at(s, 0x06),
            serial_number: string_at(s, 0x07),
            asset_tag: string_at(s, 0x08),
            feature_flags: s.byte(0x09),
            location_in_chassis: string_at(s, 0x0A),
            chassis_handle: s.word(0x0B),
            board_type: s.byte(0x0D),
        })
    }
}

#[must_use]
pub const fn board_type_name(ty: u8) -> &'static str {
    match ty {
        0x01 => "Unknown",
        0x02 => "Other",
        0x03 => "Server Blade",
        0x04 => "Connectivity Switch",
        0x05 => "System Management Module",
        0x06 => "Processor Module",
        0x07 => "I/O Module",
        0x08 => "Memory Module",
        0x09 => "Daughter board",
        0x0A => "Motherboard",
        0x0B => "Processor/Memory Module",
        0x0C => "Processor/IO Module",
        0x0D => "Interconnect board",
        _ => "Undefined",
    }
}
