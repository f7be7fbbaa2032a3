//! # UEFI Memory Map
//!
//! Names and attribute bits of `EFI_MEMORY_DESCRIPTOR` entries plus the two
//! presentations used by the memory lesson:
//!
//! * the full listing, one entry per descriptor with type and attributes, and
//! * the condensed "OS view" that merges physically contiguous descriptors
//!   an operating system would treat the same way (`usable`, `reserved`,
//!   `ACPI data`, `ACPI NVS`), similar to the `e820` dump Linux prints.

use alloc::vec::Vec;
use bitfield_struct::bitfield;
use core::fmt;

/// Size of a UEFI page in bytes.
pub const PAGE_SIZE: u64 = 4096;

const MEMORY_TYPES: [(&str, &str); 16] = [
    ("EfiReservedMemoryType", "reserved"),
    ("EfiLoaderCode", "usable"),
    ("EfiLoaderData", "usable"),
    ("EfiBootServicesCode", "usable"),
    ("EfiBootServicesData", "usable"),
    ("EfiRuntimeServicesCode", "reserved"),
    ("EfiRuntimeServicesData", "reserved"),
    ("EfiConventionalMemory", "usable"),
    ("EfiUnusableMemory", "reserved"),
    ("EfiACPIReclaimMemory", "ACPI data"),
    ("EfiACPIMemoryNVS", "ACPI NVS"),
    ("EfiMemoryMappedIO", "reserved"),
    ("EfiMemoryMappedIOPortSpace", "reserved"),
    ("EfiPalCode", "reserved"),
    ("EfiPersistentMemory", "usable"),
    ("EfiUnacceptedMemoryType", "usable"),
];

/// Start of the OEM-defined memory type range.
const OEM_RESERVED_MIN: u32 = 0x7000_0000;
/// Start of the OS-loader-defined memory type range.
const OS_RESERVED_MIN: u32 = 0x8000_0000;

/// Returns the `EFI_MEMORY_TYPE` enumerator name of `ty`.
#[must_use]
pub fn memory_type_name(ty: u32) -> &'static str {
    match usize::try_from(ty).ok().and_then(|i| MEMORY_TYPES.get(i)) {
        Some((name, _)) => name,
        None if ty >= OS_RESERVED_MIN => "EfiOsReserved",
        None if ty >= OEM_RESERVED_MIN => "EfiOemReserved",
        None => "Unknown",
    }
}

/// Returns how an operating system would classify memory of type `ty`.
#[must_use]
pub fn os_view(ty: u32) -> &'static str {
    match usize::try_from(ty).ok().and_then(|i| MEMORY_TYPES.get(i)) {
        Some((_, view)) => view,
        None if ty >= OEM_RESERVED_MIN => "reserved",
        None => "Unknown",
    }
}

/// `EFI_MEMORY_DESCRIPTOR.Attribute`.
#[bitfield(u64)]
#[derive(Eq, PartialEq)]
pub struct MemoryAttributes {
    /// Bit 0: UC, uncacheable.
    pub uc: bool,
    /// Bit 1: WC, write combining.
    pub wc: bool,
    /// Bit 2: WT, write through.
    pub wt: bool,
    /// Bit 3: WB, write back.
    pub wb: bool,
    /// Bit 4: UCE, uncacheable, exported, supports fetch-and-add semaphores.
    pub uce: bool,
    #[bits(7)]
    __: u8,
    /// Bit 12: WP, write protected.
    pub wp: bool,
    /// Bit 13: RP, read protected.
    pub rp: bool,
    /// Bit 14: XP, execute protected.
    pub xp: bool,
    /// Bit 15: NV, non-volatile (persistent) memory.
    pub nv: bool,
    /// Bit 16: higher reliability than other memory in the system.
    pub more_reliable: bool,
    /// Bit 17: RO, read only.
    pub ro: bool,
    /// Bit 18: SP, specific purpose memory.
    pub sp: bool,
    /// Bit 19: memory usable for CPU cryptographic operations.
    pub cpu_crypto: bool,
    #[bits(42)]
    __: u64,
    /// Bit 62: Itanium ISA attribute mask is valid.
    pub isa_valid: bool,
    /// Bit 63: region must be mapped for runtime services.
    pub runtime: bool,
}

impl MemoryAttributes {
    fn names(self) -> [(bool, &'static str); 15] {
        [
            (self.uc(), "UC"),
            (self.wc(), "WC"),
            (self.wt(), "WT"),
            (self.wb(), "WB"),
            (self.uce(), "UCE"),
            (self.wp(), "WP"),
            (self.rp(), "RP"),
            (self.xp(), "XP"),
            (self.nv(), "NV"),
            (self.more_reliable(), "MORE_RELIABLE"),
            (self.ro(), "RO"),
            (self.sp(), "SP"),
            (self.cpu_crypto(), "CPU_CRYPTO"),
            (self.isa_valid(), "ISA_VALID"),
            (self.runtime(), "RUNTIME"),
        ]
    }
}

/// Renders each set attribute as ` NAME`, e.g. `" UC WB RUNTIME"`.
impl fmt::Display for MemoryAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (_, name) in self.names().into_iter().filter(|(set, _)| *set) {
            write!(f, " {name}")?;
        }
        Ok(())
    }
}

/// One memory map descriptor.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MemoryRegion {
    pub ty: u32,
    pub phys_start: u64,
    pub page_count: u64,
    pub attributes: MemoryAttributes,
}

impl MemoryRegion {
    /// Size of the region in bytes.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.page_count.saturating_mul(PAGE_SIZE)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.page_count == 0
    }

    /// First address past the region.
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.phys_start.saturating_add(self.len())
    }

    /// Full listing entry, numbered `index`.
    #[must_use]
    pub const fn describe(&self, index: usize) -> RegionListing<'_> {
        RegionListing {
            index,
            region: self,
        }
    }
}

/// Two-line description of a [`MemoryRegion`].
pub struct RegionListing<'a> {
    index: usize,
    region: &'a MemoryRegion,
}

impl fmt::Display for RegionListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.region;
        writeln!(
            f,
            "[#{:02}] Type: {}  Attr: {}",
            self.index,
            memory_type_name(r.ty),
            r.attributes
        )?;
        write!(
            f,
            "      Phys: {:016x}-{:016x}",
            r.phys_start,
            r.end().wrapping_sub(1)
        )
    }
}

/// A merged run of contiguous regions sharing the same [`os_view`] label.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct OsViewRange {
    pub start: u64,
    /// Inclusive end address.
    pub last: u64,
    pub label: &'static str,
}

impl fmt::Display for OsViewRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " [mem: {:016x}-{:016x}] {}", self.start, self.last, self.label)
    }
}

/// Merges regions in map order into [`OsViewRange`]s.
///
/// Two neighbors are merged when the first ends exactly where the second
/// starts and both map to the same [`os_view`] label. Regions are not sorted
/// first, the firmware's ordering is kept.
#[must_use]
pub fn coalesce(regions: &[MemoryRegion]) -> Vec<OsViewRange> {
    let mut out: Vec<OsViewRange> = Vec::new();
    let mut prev_end: Option<u64> = None;

    for region in regions {
        let label = os_view(region.ty);
        let last = region.end().wrapping_sub(1);
        match out.last_mut() {
            Some(current) if prev_end == Some(region.phys_start) && current.label == label => {
                current.last = last;
            }
            _ => out.push(OsViewRange {
                start: region.phys_start,
                last,
                label,
            }),
        }
        prev_end = Some(region.end());
    }

    out
}

/// Pages per memory type, ordered by type.
#[must_use]
pub fn summarize(regions: &[MemoryRegion]) -> Vec<(u32, u64)> {
    let mut totals: Vec<(u32, u64)> = Vec::new();
    for region in regions {
        match totals.binary_search_by_key(&region.ty, |(ty, _)| *ty) {
            Ok(i) => totals[i].1 += region.page_count,
            Err(i) => totals.insert(i, (region.ty, region.page_count)),
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(ty: u32, phys_start: u64, page_count: u64) -> MemoryRegion {
        MemoryRegion {
            ty,
            phys_start,
            page_count,
            attributes: MemoryAttributes::new(),
        }
    }

    #[test]
    fn type_names() {
        assert_eq!(memory_type_name(0), "EfiReservedMemoryType");
        assert_eq!(memory_type_name(7), "EfiConventionalMemory");
        assert_eq!(memory_type_name(14), "EfiPersistentMemory");
        assert_eq!(memory_type_name(15), "EfiUnacceptedMemoryType");
        assert_eq!(memory_type_name(16), "Unknown");
        assert_eq!(memory_type_name(0x7000_0001), "EfiOemReserved");
        assert_eq!(memory_type_name(0x8000_0000), "EfiOsReserved");
        assert_eq!(os_view(9), "ACPI data");
        assert_eq!(os_view(10), "ACPI NVS");
        assert_eq!(os_view(4), "usable");
        assert_eq!(os_view(11), "reserved");
        assert_eq!(os_view(99), "Unknown");
    }

    #[test]
    fn attribute_rendering() {
        let attrs = MemoryAttributes::new()
            .with_uc(true)
            .with_wb(true)
            .with_xp(true)
            .with_runtime(true);
        assert_eq!(attrs.into_bits(), 0x8000_0000_0000_4009);
        assert_eq!(attrs.to_string(), " UC WB XP RUNTIME");
        assert_eq!(MemoryAttributes::from_bits(0x80000).to_string(), " CPU_CRYPTO");
        assert_eq!(MemoryAttributes::new().to_string(), "");
    }

    #[test]
    fn listing_format() {
        let mut r = region(7, 0x10_0000, 2);
        r.attributes = MemoryAttributes::new().with_uc(true).with_wb(true);
        assert_eq!(
            r.describe(3).to_string(),
            "[#03] Type: EfiConventionalMemory  Attr:  UC WB\n      Phys: 0000000000100000-0000000000101fff"
        );
    }

    #[test]
    fn coalesce_merges_contiguous_same_label() {
        let map = [
            region(3, 0x0, 1),      // usable
            region(7, 0x1000, 1),   // usable, contiguous
            region(0, 0x2000, 1),   // reserved
            region(6, 0x3000, 2),   // reserved, contiguous
            region(7, 0x10000, 1),  // usable, gap
            region(9, 0x11000, 1),  // ACPI data
        ];
        let ranges = coalesce(&map);
        assert_eq!(ranges.len(), 4);
        assert_eq!(ranges[0], OsViewRange { start: 0, last: 0x1fff, label: "usable" });
        assert_eq!(ranges[1], OsViewRange { start: 0x2000, last: 0x4fff, label: "reserved" });
        assert_eq!(ranges[2].start, 0x10000);
        assert_eq!(
            ranges[3].to_string(),
            " [mem: 0000000000011000-0000000000011fff] ACPI data"
        );
    }

    #[test]
    fn coalesce_does_not_merge_across_gaps() {
        let ranges = coalesce(&[region(7, 0, 1), region(7, 0x2000, 1)]);
        assert_eq!(ranges.len(), 2);
    }

    #[test]
    fn summary_counts_pages() {
        let map = [region(7, 0, 3), region(4, 0x3000, 1), region(7, 0x4000, 2)];
        assert_eq!(summarize(&map), vec![(4, 1), (7, 5)]);
    }
}
