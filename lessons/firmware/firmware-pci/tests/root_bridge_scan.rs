use firmware_pci::config::{self, PciHeader};
use firmware_pci::ids::PciIds;
use firmware_pci::resources::{self, END_TAG, QWORD_ADDRESS_SPACE, QWORD_LEN};
use firmware_pci::rom::{self, RomImages};

const PCI_IDS: &str = "\
8086  Intel Corporation
\t29c0  82G33/G31/P35/P31 Express DRAM Controller
1b36  Red Hat, Inc.
\t000d  QEMU XHCI Host Controller
";

fn bus_descriptor(min: u64, max: u64) -> Vec<u8> {
    let mut d = vec![QWORD_ADDRESS_SPACE];
    d.extend_from_slice(&u16::try_from(QWORD_LEN).unwrap().to_le_bytes());
    d.extend_from_slice(&[2, 0, 0]);
    for field in [0, min, max, 0, max - min + 1] {
        d.extend_from_slice(&field.to_le_bytes());
    }
    d
}

#[test]
fn lists_functions_on_reported_buses() {
    let mut descriptors = bus_descriptor(0, 0);
    descriptors.extend_from_slice(&[END_TAG, 0]);
    let spaces = resources::parse(&descriptors).unwrap();

    let mut header = [0xFFu8; 16];
    header[..4].copy_from_slice(&[0x86, 0x80, 0xC0, 0x29]);
    header[11] = 0x06;

    let ids = PciIds::new(PCI_IDS);
    let mut lines = Vec::new();
    for range in resources::bus_ranges(&spaces) {
        for location in config::scan(range) {
            let bytes = if (location.device, location.function) == (0, 0) {
                header
            } else {
                [0xFF; 16]
            };
            let parsed = PciHeader::parse(&bytes).unwrap();
            if !parsed.is_present() {
                continue;
            }
            let names = ids.lookup(parsed.vendor_id, parsed.device_id);
            lines.push(format!(
                "{location} - Vendor:{:04x}, Device:{:04x}:    {}, {}",
                parsed.vendor_id,
                parsed.device_id,
                names.vendor_or_undefined(),
                names.device_or_undefined()
            ));
        }
    }
    assert_eq!(
        lines,
        ["00:00.00 - Vendor:8086, Device:29c0:    Intel Corporation, 82G33/G31/P35/P31 Express DRAM Controller"]
    );
}

#[test]
fn walks_an_option_rom() {
    let mut image = vec![0u8; 1024];
    image[..2].copy_from_slice(&rom::ROM_SIGNATURE.to_le_bytes());
    image[4..8].copy_from_slice(&rom::EFI_SIGNATURE.to_le_bytes());
    image[8..10].copy_from_slice(&10u16.to_le_bytes());
    image[10..12].copy_from_slice(&0xAA64u16.to_le_bytes());
    image[0x18..0x1A].copy_from_slice(&0x40u16.to_le_bytes());
    image[0x40..0x44].copy_from_slice(b"PCIR");
    image[0x44..0x46].copy_from_slice(&0x1b36u16.to_le_bytes());
    image[0x46..0x48].copy_from_slice(&0x000du16.to_le_bytes());
    image[0x50..0x52].copy_from_slice(&2u16.to_le_bytes());
    image[0x54] = rom::code_type::EFI;
    image[0x55] = rom::LAST_IMAGE;

    let images: Vec<_> = RomImages::new(&image).collect::<Result<_, _>>().unwrap();
    assert_eq!(images.len(), 1);
    let only = images[0];
    assert_eq!((only.vendor_id, only.device_id), (0x1b36, 0x000d));
    assert_eq!(only.end(), 1024);
    assert_eq!(rom::code_type_name(only.code_type), "EFI Image");

    let efi = only.efi.unwrap();
    assert!(efi.signature_valid());
    assert_eq!(rom::subsystem_name(efi.subsystem), "EFI Application");
    assert_eq!(rom::machine_type_name(efi.machine_type), "ARM 64-bit");
    assert_eq!(rom::compression_name(efi.compression_type), "Uncompressed");
}
