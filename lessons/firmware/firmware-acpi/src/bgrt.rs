//! # Boot Graphics Resource Table
//!
//! ```text
//! 0x00  description header ("BGRT")
//! 0x24  UINT16 Version          1
//! 0x26  UINT8  Status           bit 0 displayed, bits 1-2 orientation
//! 0x27  UINT8  ImageType        0 = BMP
//! 0x28  UINT64 ImageAddress
//! 0x30  UINT32 ImageOffsetX
//! 0x34  UINT32 ImageOffsetY
//! ```

use crate::sdt::{HEADER_LEN, SdtHeader, Signature};
use crate::{AcpiError, le};
use bitfield_struct::bitfield;

pub const BGRT_LEN: usize = HEADER_LEN + 20;
pub const IMAGE_TYPE_BMP: u8 = 0;
/// Size of `BMP_IMAGE_HEADER`.
pub const BMP_HEADER_LEN: usize = 54;

#[bitfield(u8)]
#[derive(Eq, PartialEq)]
pub struct BgrtStatus {
    /// Bit 0: the image is currently on screen.
    pub displayed: bool,
    /// Bits 1–2: clockwise rotation in 90° steps.
    #[bits(2)]
    pub orientation: u8,
    #[bits(5)]
    __: u8,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Bgrt {
    pub version: u16,
    pub status: BgrtStatus,
    pub image_type: u8,
    pub image_address: u64,
    pub offset_x: u32,
    pub offset_y: u32,
}

impl Bgrt {
    /// Decodes a complete BGRT including its description header.
    ///
    /// # Errors
    /// Fails on another signature or a short table.
    pub fn parse(table: &[u8]) -> Result<Self, AcpiError> {
        let header = SdtHeader::parse(table)?;
        if header.signature != Signature::BGRT {
            return Err(AcpiError::InvalidSignature { expected: "BGRT" });
        }
        let truncated = AcpiError::Truncated("BGRT");
        if table.len() < BGRT_LEN || (header.length as usize) < BGRT_LEN {
            return Err(truncated);
        }
        Ok(Self {
            version: u16::from_le_bytes(le(table, 0x24).ok_or(truncated)?),
            status: BgrtStatus::from_bits(table[0x26]),
            image_type: table[0x27],
            image_address: u64::from_le_bytes(le(table, 0x28).ok_or(truncated)?),
            offset_x: u32::from_le_bytes(le(table, 0x30).ok_or(truncated)?),
            offset_y: u32::from_le_bytes(le(table, 0x34).ok_or(truncated)?),
        })
    }

    #[must_use]
    pub const fn is_bmp(&self) -> bool {
        self.image_type == IMAGE_TYPE_BMP
    }
}

/// The fields of `BMP_IMAGE_HEADER` the lessons care about.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BmpHeader {
    /// Size of the whole file, header included.
    pub size: u32,
    pub image_offset: u32,
    pub width: u32,
    pub height: u32,
    pub bits_per_pixel: u16,
}

impl BmpHeader {
    /// Decodes a bitmap file header.
    ///
    /// # Errors
    /// Fails without the `BM` magic or with fewer than [`BMP_HEADER_LEN`]
    /// bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self, AcpiError> {
        let truncated = AcpiError::Truncated("BMP header");
        if bytes.len() < BMP_HEADER_LEN {
            return Err(truncated);
        }
        if &bytes[..2] != b"BM" {
            return Err(AcpiError::InvalidSignature { expected: "BM" });
        }
        Ok(Self {
            size: u32::from_le_bytes(le(bytes, 2).ok_or(truncated)?),
            image_offset: u32::from_le_bytes(le(bytes, 10).ok_or(truncated)?),
            width: u32::from_le_bytes(le(bytes, 18).ok_or(truncated)?),
            height: u32::from_le_bytes(le(bytes, 22).ok_or(truncated)?),
            bits_per_pixel: u16::from_le_bytes(le(bytes, 28).ok_or(truncated)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bgrt_body(status: u8, image_type: u8) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&1u16.to_le_bytes());
        body.push(status);
        body.push(image_type);
        body.extend_from_slice(&0x7E5_0000u64.to_le_bytes());
        body.extend_from_slice(&412u32.to_le_bytes());
        body.extend_from_slice(&283u32.to_le_bytes());
        body
    }

    fn bmp(width: u32, height: u32) -> Vec<u8> {
        let size = u32::try_from(BMP_HEADER_LEN).unwrap() + width * height * 3;
        let mut bytes = vec![0u8; BMP_HEADER_LEN];
        bytes[..2].copy_from_slice(b"BM");
        bytes[2..6].copy_from_slice(&size.to_le_bytes());
        bytes[10..14].copy_from_slice(&54u32.to_le_bytes());
        bytes[14..18].copy_from_slice(&40u32.to_le_bytes());
        bytes[18..22].copy_from_slice(&width.to_le_bytes());
        bytes[22..26].copy_from_slice(&height.to_le_bytes());
        bytes[26..28].copy_from_slice(&1u16.to_le_bytes());
        bytes[28..30].copy_from_slice(&24u16.to_le_bytes());
        bytes
    }

    #[test]
    fn parses_bgrt() {
        let table = crate::sdt::build(b"BGRT", &bgrt_body(0b011, 0));
        let bgrt = Bgrt::parse(&table).unwrap();
        assert_eq!(bgrt.version, 1);
        assert!(bgrt.status.displayed());
        assert_eq!(bgrt.status.orientation(), 1);
        assert!(bgrt.is_bmp());
        assert_eq!(bgrt.image_address, 0x7E5_0000);
        assert_eq!((bgrt.offset_x, bgrt.offset_y), (412, 283));
    }

    #[test]
    fn rejects_other_tables() {
        let table = crate::sdt::build(b"FACP", &bgrt_body(0, 0));
        assert!(matches!(
            Bgrt::parse(&table),
            Err(AcpiError::InvalidSignature { expected: "BGRT" })
        ));
        let short = crate::sdt::build(b"BGRT", &[1, 0]);
        assert_eq!(Bgrt::parse(&short), Err(AcpiError::Truncated("BGRT")));
    }

    #[test]
    fn bmp_header() {
        let header = BmpHeader::parse(&bmp(193, 58)).unwrap();
        assert_eq!((header.width, header.height), (193, 58));
        assert_eq!(header.size, 54 + 193 * 58 * 3);
        assert_eq!(header.bits_per_pixel, 24);

        let mut wrong = bmp(1, 1);
        wrong[0] = b'X';
        assert!(BmpHeader::parse(&wrong).is_err());
    }
}
