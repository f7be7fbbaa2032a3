use firmware_acpi::bgrt::{Bgrt, BmpHeader};
use firmware_acpi::rsdp::AcpiRoots;
use firmware_acpi::sdt::{self, Signature};
use firmware_acpi::{AcpiError, PhysMapRo};

/// Physical memory starting at address zero.
struct Flat(&'static [u8]);

impl PhysMapRo for Flat {
    unsafe fn map_ro<'a>(&self, paddr: u64, len: usize) -> &'a [u8] {
        let start = usize::try_from(paddr).unwrap().min(self.0.len());
        let end = (start + len).min(self.0.len());
        &self.0[start..end]
    }
}

fn checksum(bytes: &mut [u8], at: usize) {
    bytes[at] = 0;
    let sum = bytes.iter().fold(0u8, |a, &b| a.wrapping_add(b));
    bytes[at] = 0u8.wrapping_sub(sum);
}

fn table(signature: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(signature);
    bytes.extend_from_slice(&u32::try_from(36 + body.len()).unwrap().to_le_bytes());
    bytes.extend_from_slice(&[1, 0]);
    bytes.extend_from_slice(b"OVMF  EDK2    ");
    bytes.extend_from_slice(&[0; 12]);
    bytes.extend_from_slice(body);
    checksum(&mut bytes, 9);
    bytes
}

fn place(memory: &mut [u8], at: usize, bytes: &[u8]) {
    memory[at..at + bytes.len()].copy_from_slice(bytes);
}

/// RSDP at 0x100, XSDT at 0x200, BGRT at 0x300, a 2x2 BMP at 0x400.
fn firmware_memory() -> Flat {
    let mut memory = vec![0u8; 0x1000];

    let mut rsdp = Vec::new();
    rsdp.extend_from_slice(b"RSD PTR \0OVMF  \x02");
    rsdp.extend_from_slice(&0u32.to_le_bytes());
    checksum(&mut rsdp, 8);
    rsdp.extend_from_slice(&36u32.to_le_bytes());
    rsdp.extend_from_slice(&0x200u64.to_le_bytes());
    rsdp.extend_from_slice(&[0; 4]);
    checksum(&mut rsdp, 32);
    place(&mut memory, 0x100, &rsdp);

    place(&mut memory, 0x200, &table(b"XSDT", &0x300u64.to_le_bytes()));

    let mut bgrt = Vec::new();
    bgrt.extend_from_slice(&1u16.to_le_bytes());
    bgrt.extend_from_slice(&[1, 0]);
    bgrt.extend_from_slice(&0x400u64.to_le_bytes());
    bgrt.extend_from_slice(&[0; 8]);
    place(&mut memory, 0x300, &table(b"BGRT", &bgrt));

    let mut bmp = vec![0u8; 54 + 16];
    bmp[..2].copy_from_slice(b"BM");
    bmp[2..6].copy_from_slice(&70u32.to_le_bytes());
    bmp[18..22].copy_from_slice(&2u32.to_le_bytes());
    bmp[22..26].copy_from_slice(&2u32.to_le_bytes());
    place(&mut memory, 0x400, &bmp);

    Flat(Box::leak(memory.into_boxed_slice()))
}

#[test]
fn rsdp_to_boot_logo() {
    let memory = firmware_memory();
    let roots = unsafe { AcpiRoots::parse(&memory, 0x100) }.unwrap();
    assert_eq!(roots.rsdt_addr, None);
    assert_eq!(roots.xsdt_addr, Some(0x200));

    let table = unsafe { sdt::find_table(&memory, &roots, Signature::BGRT) }
        .unwrap()
        .unwrap();
    let bytes = unsafe { table.bytes(&memory) };
    assert!(sdt::checksum_valid(bytes));

    let bgrt = Bgrt::parse(bytes).unwrap();
    assert!(bgrt.is_bmp());
    let header = unsafe { memory.map_ro(bgrt.image_address, 54) };
    let bmp = BmpHeader::parse(header).unwrap();
    assert_eq!((bmp.width, bmp.height, bmp.size), (2, 2, 70));
}

#[test]
fn missing_root_table() {
    let memory = firmware_memory();
    let roots = AcpiRoots {
        rsdp_addr: 0x100,
        revision: 0,
        oem_id: *b"OVMF  ",
        xsdt_addr: None,
        rsdt_addr: None,
    };
    assert_eq!(
        unsafe { sdt::tables(&memory, &roots) },
        Err(AcpiError::NullAddress)
    );
}
