use firmware_types::device_path::{DevicePath, END_ENTIRE, node_type, pci_node, sub_type};
use firmware_types::load_option::LoadOption;
use firmware_types::variable::{VariableAttributes, boot_option_name, parse_u16_array};
use firmware_types::{crc32, dmpstore, ucs2};

fn load_option(description: &str, path: &[u8]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&1u32.to_le_bytes());
    data.extend_from_slice(&u16::try_from(path.len()).unwrap().to_le_bytes());
    data.extend_from_slice(&ucs2::encode_bytes(description));
    data.extend_from_slice(path);
    data
}

/// `PciRoot(0x0)/Pci(0x1f,0x2)/Ctrl(0x0)` as QEMU's boot manager stores it.
const SATA_DISK_PATH: [u8; 26] = [
    0x02, 0x01, 0x0C, 0x00, 0xD0, 0x41, 0x03, 0x0A, 0x00, 0x00, 0x00, 0x00, // PciRoot(0x0)
    0x01, 0x01, 0x06, 0x00, 0x02, 0x1F, // Pci(0x1f,0x2)
    0x01, 0x05, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, // Ctrl(0x0)
];

#[test]
fn boot_order_to_load_options() {
    let order = parse_u16_array(&[0x01, 0x00, 0x0A, 0x00]).unwrap();
    let names: Vec<_> = order.iter().map(|&n| boot_option_name(n)).collect();
    assert_eq!(names, ["Boot0001", "Boot000A"]);

    let path = [SATA_DISK_PATH.as_slice(), &END_ENTIRE].concat();
    let data = load_option("UEFI QEMU HARDDISK", &path);
    let option = LoadOption::parse(&data).unwrap();

    assert_eq!(option.description, "UEFI QEMU HARDDISK");
    assert_eq!(option.file_path.validate(), Ok(path.len()));
    let nodes: Vec<_> = option.file_path.nodes().map(Result::unwrap).collect();
    assert_eq!(nodes.len(), 3);
    assert!(nodes[0].is(node_type::ACPI, sub_type::ACPI));
    assert!(nodes[2].is(node_type::HARDWARE, sub_type::HW_CONTROLLER));
    assert_eq!(option.file_path.count(node_type::HARDWARE, sub_type::HW_PCI), 1);
}

#[test]
fn multi_instance_file_path_list() {
    let mut bytes = pci_node(3, 5).to_vec();
    bytes.extend_from_slice(&[node_type::END, sub_type::END_INSTANCE, 4, 0]);
    bytes.extend_from_slice(&pci_node(0, 0));
    bytes.extend_from_slice(&END_ENTIRE);
    let path = DevicePath::new(&bytes);
    assert_eq!(path.validate(), Ok(bytes.len()));
    assert_eq!(path.count(node_type::HARDWARE, sub_type::HW_PCI), 2);
}

#[test]
fn dmpstore_dump_repair() {
    let name = ucs2::encode_bytes("Timeout");
    let mut record = Vec::new();
    record.extend_from_slice(&u32::try_from(name.len()).unwrap().to_le_bytes());
    record.extend_from_slice(&2u32.to_le_bytes());
    record.extend_from_slice(&name);
    record.extend_from_slice(&[0x61, 0xDF, 0xE4, 0x8B, 0xCA, 0x93, 0xD2, 0x11]);
    record.extend_from_slice(&[0xAA, 0x0D, 0x00, 0xE0, 0x98, 0x03, 0x2B, 0x8C]);
    record.extend_from_slice(&VariableAttributes::NV_BS_RT.into_bits().to_le_bytes());
    record.extend_from_slice(&[5, 0]);
    let crc = crc32::crc32(&record);
    record.extend_from_slice(&crc.to_le_bytes());

    // edit the value the way a user would with a hex editor
    let mut dump = record.clone();
    let value_at = dump.len() - 6;
    dump[value_at] = 10;

    assert!(!dmpstore::Records::new(&dump).next().unwrap().unwrap().crc_valid());
    assert_eq!(dmpstore::update_crcs(&mut dump), Ok(1));
    let repaired = dmpstore::Records::new(&dump).next().unwrap().unwrap();
    assert!(repaired.crc_valid());
    assert_eq!(repaired.data, &[10, 0]);
    assert_eq!(repaired.name(), "Timeout");
}
