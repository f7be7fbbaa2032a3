//! Physical memory access while boot services are active.

use firmware_acpi::PhysMapRo;

/// Firmware keeps physical memory identity mapped.
#[derive(Debug, Copy, Clone, Default)]
pub struct IdentityMap;

impl PhysMapRo for IdentityMap {
    unsafe fn map_ro<'a>(&self, paddr: u64, len: usize) -> &'a [u8] {
        // SAFETY: the caller guarantees that `paddr..paddr + len` is readable.
        unsafe { core::slice::from_raw_parts(paddr as usize as *const u8, len) }
    }
}

/// Views `len` bytes of firmware memory at `addr`.
///
/// # Safety
/// `addr..addr + len` must be readable for the lifetime `'a`.
#[must_use]
pub unsafe fn bytes_at<'a>(addr: u64, len: usize) -> &'a [u8] {
    unsafe { IdentityMap.map_ro(addr, len) }
}
