//! # RSDP/XSDP (Root/Extended System Description Pointer)

use crate::{AcpiError, PhysMapRo, sum};

pub const SIGNATURE: &[u8; 8] = b"RSD PTR ";

/// Root table addresses found through the RSDP.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AcpiRoots {
    pub rsdp_addr: u64,
    /// `0` for ACPI 1.0, `2` and above for ACPI 2.0+.
    pub revision: u8,
    pub oem_id: [u8; 6],
    pub xsdt_addr: Option<u64>,
    pub rsdt_addr: Option<u64>,
}

/// ACPI 1.0 Root System Description Pointer (RSDP)
#[derive(Clone, Copy)]
#[repr(C, packed)]
struct Rsdp {
    signature: [u8; 8], // "RSD PTR "
    checksum: u8,       // sum of first 20 bytes == 0
    oem_id: [u8; 6],
    revision: u8, // 0 for ACPI 1.0
    rsdt_addr: u32,
}

/// ACPI 2.0 Extended System Description Pointer (XSDP)
#[derive(Clone, Copy)]
#[repr(C, packed)]
struct Xsdp {
    v1: Rsdp,
    length: u32,
    xsdt_addr: u64,
    ext_checksum: u8, // checksum of entire table
    reserved: [u8; 3],
}

impl AcpiRoots {
    /// Validates the RSDP/XSDP at `rsdp_addr` and extracts the root tables.
    ///
    /// A zero RSDT or XSDT address is reported as `None`.
    ///
    /// # Errors
    /// Fails on a null address, a bad signature, a checksum mismatch or an
    /// XSDP whose length is shorter than the structure itself.
    ///
    /// # Safety
    /// `map` must be able to map `rsdp_addr` and the following bytes.
    pub unsafe fn parse(map: &impl PhysMapRo, rsdp_addr: u64) -> Result<Self, AcpiError> {
        if rsdp_addr == 0 {
            return Err(AcpiError::NullAddress);
        }

        let v1 = unsafe { map.map_ro(rsdp_addr, size_of::<Rsdp>()) };
        let mut roots = Self::parse_v1(v1)?;
        roots.rsdp_addr = rsdp_addr;
        if roots.revision < 2 {
            return Ok(roots);
        }

        // Need full v2 to read length + xsdt
        let v2 = unsafe { map.map_ro(rsdp_addr, size_of::<Xsdp>()) };
        let len = Self::xsdp_length(v2)?;
        let full = unsafe { map.map_ro(rsdp_addr, len) };
        roots.xsdt_addr = Self::parse_v2(full)?;
        Ok(roots)
    }

    /// Parses an RSDP already copied into memory, as found in a table dump.
    ///
    /// # Errors
    /// Same as [`AcpiRoots::parse`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AcpiError> {
        let mut roots = Self::parse_v1(bytes)?;
        if roots.revision >= 2 {
            let len = Self::xsdp_length(bytes)?;
            let full = bytes.get(..len).ok_or(AcpiError::Truncated("XSDP"))?;
            roots.xsdt_addr = Self::parse_v2(full)?;
        }
        Ok(roots)
    }

    fn parse_v1(bytes: &[u8]) -> Result<Self, AcpiError> {
        if bytes.len() < size_of::<Rsdp>() {
            return Err(AcpiError::Truncated("RSDP"));
        }
        // SAFETY: packed struct, alignment 1, length checked above.
        let v1 = unsafe { bytes.as_ptr().cast::<Rsdp>().read_unaligned() };
        if &v1.signature != SIGNATURE {
            return Err(AcpiError::InvalidSignature { expected: "RSD PTR " });
        }
        if sum(&bytes[..size_of::<Rsdp>()]) != 0 {
            return Err(AcpiError::Checksum("RSDP"));
        }
        if v1.revision == 1 {
            return Err(AcpiError::UnsupportedRevision(1));
        }

        Ok(Self {
            rsdp_addr: 0,
            revision: v1.revision,
            oem_id: v1.oem_id,
            xsdt_addr: None,
            rsdt_addr: non_zero(u64::from(v1.rsdt_addr)),
        })
    }

    fn xsdp_length(bytes: &[u8]) -> Result<usize, AcpiError> {
        if bytes.len() < size_of::<Xsdp>() {
            return Err(AcpiError::Truncated("XSDP"));
        }
        // SAFETY: packed struct, alignment 1, length checked above.
        let v2 = unsafe { bytes.as_ptr().cast::<Xsdp>().read_unaligned() };
        let len = v2.length as usize;
        if len < size_of::<Xsdp>() {
            return Err(AcpiError::Truncated("XSDP"));
        }
        Ok(len)
    }

    fn parse_v2(full: &[u8]) -> Result<Option<u64>, AcpiError> {
        if full.len() < size_of::<Xsdp>() {
            return Err(AcpiError::Truncated("XSDP"));
        }
        if sum(full) != 0 {
            return Err(AcpiError::Checksum("XSDP"));
        }
        // SAFETY: packed struct, alignment 1, length checked above.
        let v2 = unsafe { full.as_ptr().cast::<Xsdp>().read_unaligned() };
        Ok(non_zero(v2.xsdt_addr))
    }

    /// The root table to walk: the XSDT when present, the RSDT otherwise.
    #[must_use]
    pub const fn root(&self) -> Option<(u64, crate::sdt::RootKind)> {
        match (self.xsdt_addr, self.rsdt_addr) {
            (Some(xsdt), _) => Some((xsdt, crate::sdt::RootKind::Xsdt)),
            (None, Some(rsdt)) => Some((rsdt, crate::sdt::RootKind::Rsdt)),
            (None, None) => None,
        }
    }
}

const fn non_zero(addr: u64) -> Option<u64> {
    if addr == 0 { None } else { Some(addr) }
}

/// Builds RSDP images for tests in this crate.
#[cfg(test)]
pub(crate) fn build(revision: u8, rsdt: u32, xsdt: u64) -> Vec<u8> {
    use crate::testing::fix_checksum;

    let mut bytes = Vec::new();
    bytes.extend_from_slice(SIGNATURE);
    bytes.push(0);
    bytes.extend_from_slice(b"BOCHS ");
    bytes.push(revision);
    bytes.extend_from_slice(&rsdt.to_le_bytes());
    fix_checksum(&mut bytes, 8);
    if revision >= 2 {
        bytes.extend_from_slice(&36u32.to_le_bytes());
        bytes.extend_from_slice(&xsdt.to_le_bytes());
        bytes.extend_from_slice(&[0; 4]);
        fix_checksum(&mut bytes, 32);
    }
    bytes
}
