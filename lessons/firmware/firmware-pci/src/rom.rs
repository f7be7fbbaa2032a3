//! PCI option ROM images.
//!
//! A ROM holds a chain of images. Each starts with the expansion ROM header
//! (`0xAA55`), whose word at `0x18` points at the PCI data structure
//! (`PCIR`). The data structure gives the image length in 512 byte units
//! and flags the last image with bit 7 of the indicator byte.
//!
//! Images with code type 3 carry the EFI fields in their ROM header.

use crate::PciError;
use firmware_types::{read_u16, read_u32};

pub const ROM_SIGNATURE: u16 = 0xAA55;
pub const PCIR_SIGNATURE: u32 = u32::from_le_bytes(*b"PCIR");
pub const EFI_SIGNATURE: u32 = 0x0EF1;
pub const IMAGE_UNIT: usize = 512;
pub const LAST_IMAGE: u8 = 0x80;

const PCIR_OFFSET_FIELD: usize = 0x18;

/// Code types found in the `PCIR` structure.
pub mod code_type {
    pub const PC_AT: u8 = 0x00;
    pub const OPEN_FIRMWARE: u8 = 0x01;
    pub const PA_RISC: u8 = 0x02;
    pub const EFI: u8 = 0x03;
}

#[must_use]
pub const fn code_type_name(ty: u8) -> &'static str {
    match ty {
        code_type::PC_AT => "IA-32, PC-AT compatible",
        code_type::OPEN_FIRMWARE => "Open Firmware standard for PCI",
        code_type::PA_RISC => "Hewlett-Packard PA RISC",
        code_type::EFI => "EFI Image",
        _ => "Unknown",
    }
}

#[must_use]
pub const fn subsystem_name(subsystem: u16) -> &'static str {
    match subsystem {
        10 => "EFI Application",
        11 => "EFI Boot Service Driver",
        12 => "EFI Runtime Driver",
        13 => "EFI SAL Runtime Driver",
        _ => "Unknown",
    }
}

#[must_use]
pub const fn machine_type_name(machine: u16) -> &'static str {
    match machine {
        0x014C => "IA-32",
        0x0200 => "Itanium",
        0x0EBC => "EFI Byte Code (EBC)",
        0x8664 => "X64",
        0x01C2 => "ARM",
        0xAA64 => "ARM 64-bit",
        0x5032 => "RISCV32",
        0x5064 => "RISCV64",
        0x5128 => "RISCV128",
        _ => "Unknown",
    }
}

#[must_use]
pub const fn compression_name(compression: u16) -> &'static str {
    match compression {
        0 => "Uncompressed",
        1 => "Compressed following the UEFI Compression Algorithm",
        _ => "Unknown compression type",
    }
}

/// EFI fields of an `EFI_PCI_EXPANSION_ROM_HEADER`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EfiImage {
    pub signature: u32,
    pub subsystem: u16,
    pub machine_type: u16,
    pub compression_type: u16,
}

impl EfiImage {
    #[must_use]
    pub const fn signature_valid(&self) -> bool {
        self.signature == EFI_SIGNATURE
    }
}

/// One image of the chain.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RomImage {
    /// Offset of the image from the start of the ROM.
    pub offset: usize,
    /// Image length in bytes.
    pub length: usize,
    pub vendor_id: u16,
    pub device_id: u16,
    pub code_type: u8,
    pub indicator: u8,
    /// Present for EFI images.
    pub efi: Option<EfiImage>,
}

impl RomImage {
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.indicator & LAST_IMAGE != 0
    }

    /// Offset one past the end of the image.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Iterator over the images of a ROM.
///
/// Stops after the image flagged as last, at the end of the buffer, or after
/// the first error.
pub struct RomImages<'a> {
    rom: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> RomImages<'a> {
    #[must_use]
    pub const fn new(rom: &'a [u8]) -> Self {
        Self {
            rom,
            offset: 0,
            done: false,
        }
    }

    fn parse_at(&self, offset: usize) -> Result<RomImage, PciError> {
        let image = &self.rom[offset..];
        let truncated = PciError::TruncatedRom(offset);
        if read_u16(image, 0).ok_or(truncated)? != ROM_SIGNATURE {
            return Err(PciError::BadRomSignature(offset));
        }
        let pcir = usize::from(read_u16(image, PCIR_OFFSET_FIELD).ok_or(truncated)?);
        if read_u32(image, pcir).ok_or(truncated)? != PCIR_SIGNATURE {
            return Err(PciError::BadPcirSignature(offset));
        }
        let field = |at: usize| read_u16(image, pcir + at).ok_or(truncated);
        let length = usize::from(field(0x10)?) * IMAGE_UNIT;
        if length == 0 {
            return Err(PciError::ZeroLengthRom(offset));
        }
        let code_type = *image.get(pcir + 0x14).ok_or(truncated)?;
        let indicator = *image.get(pcir + 0x15).ok_or(truncated)?;
        let efi = if code_type == code_type::EFI {
            let header = |at: usize| read_u16(image, at).ok_or(truncated);
            Some(EfiImage {
                signature: read_u32(image, 0x04).ok_or(truncated)?,
                subsystem: header(0x08)?,
                machine_type: header(0x0A)?,
                compression_type: header(0x0C)?,
            })
        } else {
            None
        };
        Ok(RomImage {
            offset,
            length,
            vendor_id: field(0x04)?,
            device_id: field(0x06)?,
            code_type,
            indicator,
            efi,
        })
    }
}

impl Iterator for RomImages<'_> {
    type Item = Result<RomImage, PciError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.rom.len() {
            return None;
        }
        let result = self.parse_at(self.offset);
        match &result {
            Ok(image) if !image.is_last() => self.offset = image.end(),
            _ => self.done = true,
        }
        Some(result)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn legacy_and_efi_chain() {
        let mut rom = build::image(0x8086, 0x100E, 2, code_type::PC_AT, false);
        let mut efi = build::image(0x8086, 0x100E, 1, code_type::EFI, true);
        build::efi(&mut efi, 11, 0x8664, 1);
        rom.extend(efi);

        let images: Vec<_> = RomImages::new(&rom).collect::<Result<_, _>>().unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].offset, 0);
        assert_eq!(images[0].length, 1024);
        assert_eq!(images[0].efi, None);
        assert_eq!(images[1].offset, 1024);
        assert!(images[1].is_last());

        let header = images[1].efi.unwrap();
        assert!(header.signature_valid());
        assert_eq!(subsystem_name(header.subsystem), "EFI Boot Service Driver");
        assert_eq!(machine_type_name(header.machine_type), "X64");
        assert_eq!(
            compression_name(header.compression_type),
            "Compressed following the UEFI Compression Algorithm"
        );
    }

    #[test]
    fn stops_after_last_image() {
        let mut rom = build::image(1, 2, 1, code_type::PC_AT, true);
        rom.extend(build::image(3, 4, 1, code_type::PC_AT, true));
        assert_eq!(RomImages::new(&rom).count(), 1);
    }

    #[test]
    fn signature_errors() {
        let mut rom = build::image(1, 2, 1, code_type::PC_AT, true);
        rom[0x1C] = b'X';
        assert_eq!(
            RomImages::new(&rom).next(),
            Some(Err(PciError::BadPcirSignature(0)))
        );
        rom[0] = 0;
        let mut images = RomImages::new(&rom);
        assert_eq!(images.next(), Some(Err(PciError::BadRomSignature(0))));
        assert_eq!(images.next(), None);
    }

    #[test]
    fn zero_length_image() {
        let rom = build::image(1, 2, 0, code_type::PC_AT, false);
        assert_eq!(
            RomImages::new(&rom).next(),
            Some(Err(PciError::ZeroLengthRom(0)))
        );
    }

    #[test]
    fn names() {
        assert_eq!(code_type_name(1), "Open Firmware standard for PCI");
        assert_eq!(code_type_name(9), "Unknown");
        assert_eq!(machine_type_name(0x0EBC), "EFI Byte Code (EBC)");
        assert_eq!(compression_name(0), "Uncompressed");
        assert_eq!(compression_name(7), "Unknown compression type");
    }
}
