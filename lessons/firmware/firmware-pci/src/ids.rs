//! Vendor and device names from the `pci.ids` database.
//!
//! ```text
//! # comment
//! 8086  Intel Corporation
//! <TAB>2918  82801IB (ICH9) LPC Interface Controller
//! <TAB><TAB>1af4 1100  QEMU Virtual Machine       subsystem, ignored
//! ```
//!
//! Device lines only count inside the block of the matching vendor.

/// Names found for a vendor/device pair.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Description<'a> {
    pub vendor: Option<&'a str>,
    pub device: Option<&'a str>,
}

impl Description<'_> {
    /// Vendor name or `Undefined`.
    #[must_use]
    pub fn vendor_or_undefined(&self) -> &str {
        self.vendor.unwrap_or("Undefined")
    }

    /// Device name or `Undefined`.
    #[must_use]
    pub fn device_or_undefined(&self) -> &str {
        self.device.unwrap_or("Undefined")
    }
}

/// A `pci.ids` text held in memory.
#[derive(Debug, Copy, Clone)]
pub struct PciIds<'a> {
    text: &'a str,
}

impl<'a> PciIds<'a> {
    #[must_use]
    pub const fn new(text: &'a str) -> Self {
        Self { text }
    }

    #[must_use]
    pub fn lookup(&self, vendor_id: u16, device_id: u16) -> Description<'a> {
        let mut result = Description {
            vendor: None,
            device: None,
        };
        let mut in_vendor = false;
        for line in self.text.lines() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(device_line) = line.strip_prefix('\t') {
                if !in_vendor || device_line.starts_with('\t') {
                    continue;
                }
                if let Some(name) = entry(device_line, device_id) {
                    result.device = Some(name);
                    break;
                }
            } else if in_vendor {
                // next vendor block, the device is not listed
                break;
            } else if let Some(name) = entry(line, vendor_id) {
                result.vendor = Some(name);
                in_vendor = true;
            }
        }
        result
    }
}

/// Matches `xxxx  name` against `id` in lowercase hex.
fn entry(line: &str, id: u16) -> Option<&str> {
    let (hex, name) = line.split_at_checked(4)?;
    let parsed = u16::from_str_radix(hex, 16).ok()?;
    if parsed != id || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some(name.trim_start())
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDS: &str = "\
# pci.ids excerpt
1234  Technical Corp.
\t1111  QEMU Virtual Video Controller
\t\t1af4 1100  QEMU Virtual Machine
8086  Intel Corporation
\t10d3  82574L Gigabit Network Connection
\t2918  82801IB (ICH9) LPC Interface Controller
\t29c0  82G33/G31/P35/P31 Express DRAM Controller
8087  Intel Corporation
\t0a2a  Bluetooth wireless interface
C 0c  Serial bus controller
";

    #[test]
    fn vendor_and_device() {
        let ids = PciIds::new(IDS);
        let d = ids.lookup(0x8086, 0x2918);
        assert_eq!(d.vendor, Some("Intel Corporation"));
        assert_eq!(d.device, Some("82801IB (ICH9) LPC Interface Controller"));
    }

    #[test]
    fn device_search_stays_in_vendor_block() {
        let ids = PciIds::new(IDS);
        let d = ids.lookup(0x8086, 0x0a2a);
        assert_eq!(d.vendor, Some("Intel Corporation"));
        assert_eq!(d.device, None);
        assert_eq!(d.device_or_undefined(), "Undefined");
    }

    #[test]
    fn subsystem_lines_are_not_devices() {
        let ids = PciIds::new(IDS);
        assert_eq!(ids.lookup(0x1234, 0x1af4).device, None);
        assert_eq!(ids.lookup(0x1234, 0x1111).device, Some("QEMU Virtual Video Controller"));
    }

    #[test]
    fn unknown_vendor() {
        let d = PciIds::new(IDS).lookup(0x1af4, 0x1000);
        assert_eq!(d.vendor_or_undefined(), "Undefined");
        assert_eq!(d.device_or_undefined(), "Undefined");
    }
}
