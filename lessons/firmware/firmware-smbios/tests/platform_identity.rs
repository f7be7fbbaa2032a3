use firmware_smbios::entry::EntryPoint;
use firmware_smbios::records::{SystemInformation, structure_type, type_name};
use firmware_smbios::structure::{END_OF_TABLE, Structures};

fn structure(ty: u8, formatted: &[u8], strings: &[&str]) -> Vec<u8> {
    let mut out = vec![ty, u8::try_from(4 + formatted.len()).unwrap(), 0, 0];
    out.extend_from_slice(formatted);
    for s in strings {
        out.extend_from_slice(s.as_bytes());
        out.push(0);
    }
    if strings.is_empty() {
        out.push(0);
    }
    out.push(0);
    out
}

fn entry_v3(address: u64, max: u32) -> Vec<u8> {
    let mut e = vec![0u8; 0x18];
    e[..5].copy_from_slice(b"_SM3_");
    e[6] = 0x18;
    e[7] = 3;
    e[8] = 0;
    e[0x0C..0x10].copy_from_slice(&max.to_le_bytes());
    e[0x10..0x18].copy_from_slice(&address.to_le_bytes());
    let sum = e.iter().fold(0u8, |a, &b| a.wrapping_add(b));
    e[5] = 0u8.wrapping_sub(sum);
    e
}

#[test]
fn entry_point_to_system_identity() {
    let mut table = structure(0, &[1, 2, 0, 0xE8, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0], &["Vendor", "1.0", "01/01/2024"]);
    let mut system = vec![1, 2, 0, 0];
    system.extend_from_slice(&[0; 16]);
    table.extend(structure(1, &system, &["QEMU", "Standard PC"]));
    table.extend(structure(4, &[0; 8], &[]));
    table.extend(structure(END_OF_TABLE, &[], &[]));

    let max = u32::try_from(table.len() + 64).unwrap();
    let entry = EntryPoint::parse(&entry_v3(0x7F9_0000, max)).unwrap();
    assert_eq!(entry.table_address(), 0x7F9_0000);
    assert!(entry.table_length() >= table.len());

    // the 3.x maximum size may exceed the real table; iteration stops at type 127
    let mut mapped = table.clone();
    mapped.resize(entry.table_length(), 0xCC);

    let structures: Vec<_> = Structures::new(&mapped).collect::<Result<_, _>>().unwrap();
    let names: Vec<_> = structures.iter().map(|s| type_name(s.ty)).collect();
    assert_eq!(
        names,
        ["BIOS Information", "System Information", "Processor Information", "End-of-Table"]
    );

    let system = structures
        .iter()
        .find(|s| s.ty == structure_type::SYSTEM_INFORMATION)
        .map(SystemInformation::parse)
        .unwrap()
        .unwrap();
    assert_eq!(system.manufacturer, "QEMU");
    assert_eq!(system.product_name, "Standard PC");
    assert!(system.uuid.is_some());
    assert_eq!(system.wake_up_type, None);
}
