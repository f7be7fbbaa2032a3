use firmware_hii::config::{
    ConfigElement, ConfigRender, Progress, block_config, block_request, config_header, elements,
    storages,
};
use firmware_hii::hex;
use firmware_types::device_path::{END_ENTIRE, node_type, sub_type};
use firmware_types::{Guid, guid};

/// `VenHw(<guid>)`, the path HII drivers usually install their forms on.
fn vendor_path(guid: Guid) -> Vec<u8> {
    let mut path = vec![node_type::HARDWARE, sub_type::HW_VENDOR, 20, 0];
    path.extend_from_slice(&guid.to_bytes());
    path.extend_from_slice(&END_ENTIRE);
    path
}

fn vendor_text(path: &[u8]) -> Option<String> {
    let guid = Guid::from_bytes(path.get(4..20)?.try_into().ok()?);
    Some(format!("VenHw({guid})"))
}

#[test]
fn request_renders_with_decoded_annotations() {
    let guid = guid!("531bc507-9191-4fa2-9446-b844e35dd12a");
    let path = vendor_path(guid);
    let header = config_header(&guid, "FormData", &path);
    let request = block_config(&header, "0", "2", &hex::encode_reversed(&[0x34, 0x12]));

    let rendered = ConfigRender::new(&request).with_path_text(vendor_text).to_string();
    assert!(rendered.starts_with("\nGUID=07c51b539191a24f9446b844e35dd12a"));
    assert!(rendered.contains("(531bc507-9191-4fa2-9446-b844e35dd12a)\n"));
    assert!(rendered.contains("(FormData)\n"));
    assert!(rendered.contains("(VenHw(531bc507-9191-4fa2-9446-b844e35dd12a))\n"));
    assert!(rendered.contains("OFFSET=0  WIDTH=2  VALUE=1234\n34 12 "));
}

#[test]
fn value_payload_is_little_endian() {
    let request = block_config("GUID=00", "10", "4", "deadbeef");
    let value = elements(&request)
        .find_map(|e| match e {
            ConfigElement::Value { bytes, .. } => bytes,
            _ => None,
        })
        .unwrap();
    assert_eq!(value, 0xDEAD_BEEFu32.to_le_bytes());
}

#[test]
fn multi_storage_response() {
    let first = block_request("GUID=01&NAME=0041&PATH=00", "0", "1");
    let second = block_request("GUID=02&NAME=0042&PATH=00", "4", "2");
    let response = format!("{first}&{second}");
    let split: Vec<_> = storages(&response).collect();
    assert_eq!(split, [first.as_str(), second.as_str()]);
}

#[test]
fn route_progress_reports_partial_write() {
    let request = "GUID=01&NAME=0041&PATH=00&OFFSET=0&WIDTH=1&VALUE=01&OFFSET=zz";
    let stopped_at = request.find("&OFFSET=zz").unwrap();
    let progress = Progress::new(request, stopped_at);
    assert_eq!(progress.unparsed(), "&OFFSET=zz");
    assert!(progress.partially_applied());

    let untouched = Progress::new(request, 0);
    assert!(!untouched.partially_applied());
    assert!(Progress::new(request, request.len()).is_complete());
}
