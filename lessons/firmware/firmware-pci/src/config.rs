//! Configuration space addressing and the device independent header.

use crate::PciError;
use bitfield_struct::bitfield;
use core::fmt;
use firmware_types::read_u16;

pub const MAX_BUS: u8 = 255;
pub const MAX_DEVICE: u8 = 31;
pub const MAX_FUNCTION: u8 = 7;

/// Size of `PCI_DEVICE_INDEPENDENT_REGION`.
pub const HEADER_LEN: usize = 16;

/// Address format of `EFI_PCI_ROOT_BRIDGE_IO_PROTOCOL.Pci.Read`.
///
/// Registers above `0xFF` go into the extended register field instead of
/// the low byte.
#[bitfield(u64)]
#[derive(Eq, PartialEq)]
pub struct ConfigAddress {
    pub register: u8,
    pub function: u8,
    pub device: u8,
    pub bus: u8,
    pub extended_register: u32,
}

impl ConfigAddress {
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn of(bus: u8, device: u8, function: u8, register: u32) -> Self {
        let base = Self::new().with_bus(bus).with_device(device).with_function(function);
        if register & 0xFFFF_FF00 != 0 {
            base.with_extended_register(register)
        } else {
            base.with_register(register as u8)
        }
    }
}

/// Bus, device and function of a PCI function.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct Location {
    pub segment: u32,
    pub bus: u8,
    pub device: u8,
    pub function: u8,
}

impl Location {
    #[must_use]
    pub const fn config_address(&self, register: u32) -> ConfigAddress {
        ConfigAddress::of(self.bus, self.device, self.function, register)
    }
}

/// `BB:DD.FF` in lowercase hex.
impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}:{:02x}.{:02x}", self.bus, self.device, self.function)
    }
}

/// Every bus, device and function triple in `buses`, in scan order.
pub fn scan(buses: core::ops::RangeInclusive<u8>) -> impl Iterator<Item = Location> {
    buses.flat_map(|bus| {
        (0..=MAX_DEVICE).flat_map(move |device| {
            (0..=MAX_FUNCTION).map(move |function| Location {
                segment: 0,
                bus,
                device,
                function,
            })
        })
    })
}

/// `PCI_DEVICE_INDEPENDENT_REGION`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PciHeader {
    pub vendor_id: u16,
    pub device_id: u16,
    pub command: u16,
    pub status: u16,
    pub revision_id: u8,
    pub prog_if: u8,
    pub subclass: u8,
    pub class_code: u8,
    pub cache_line_size: u8,
    pub latency_timer: u8,
    pub header_type: u8,
    pub bist: u8,
}

impl PciHeader {
    /// # Errors
    /// Fails on fewer than [`HEADER_LEN`] bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self, PciError> {
        if bytes.len() < HEADER_LEN {
            return Err(PciError::TruncatedHeader);
        }
        let word = |at| read_u16(bytes, at).ok_or(PciError::TruncatedHeader);
        Ok(Self {
            vendor_id: word(0)?,
            device_id: word(2)?,
            command: word(4)?,
            status: word(6)?,
            revision_id: bytes[8],
            prog_if: bytes[9],
            subclass: bytes[10],
            class_code: bytes[11],
            cache_line_size: bytes[12],
            latency_timer: bytes[13],
            header_type: bytes[14],
            bist: bytes[15],
        })
    }

    /// Reads of absent functions return all ones.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.vendor_id != 0xFFFF
    }

    #[must_use]
    pub const fn is_multi_function(&self) -> bool {
        self.header_type & 0x80 != 0
    }

    #[must_use]
    pub const fn class_name(&self) -> &'static str {
        class_name(self.class_code)
    }
}

#[must_use]
pub const fn class_name(class_code: u8) -> &'static str {
    match class_code {
        0x00 => "Unclassified device",
        0x01 => "Mass storage controller",
        0x02 => "Network controller",
        0x03 => "Display controller",
        0x04 => "Multimedia controller",
        0x05 => "Memory controller",
        0x06 => "Bridge",
        0x07 => "Communication controller",
        0x08 => "Generic system peripheral",
        0x09 => "Input device controller",
        0x0A => "Docking station",
        0x0B => "Processor",
        0x0C => "Serial bus controller",
        0x0D => "Wireless controller",
        0x0E => "Intelligent controller",
        0x0F => "Satellite communications controller",
        0x10 => "Encryption controller",
        0x11 => "Signal processing controller",
        0x12 => "Processing accelerators",
        0x13 => "Non-Essential Instrumentation",
        0x40 => "Coprocessor",
        0xFF => "Unassigned class",
        _ => "Unknown",
    }
}
