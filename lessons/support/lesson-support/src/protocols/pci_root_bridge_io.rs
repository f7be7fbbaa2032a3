//! `EFI_PCI_ROOT_BRIDGE_IO_PROTOCOL`.

use super::{IoWidth, null};
use alloc::vec;
use alloc::vec::Vec;
use core::ffi::c_void;
use firmware_pci::config::{ConfigAddress, HEADER_LEN, PciHeader};
use firmware_pci::resources::{self, AddressSpace};
use uefi::proto::unsafe_protocol;
use uefi::{Status, StatusExt};

type Access<This> = unsafe extern "efiapi" fn(
    this: *const This,
    width: IoWidth,
    address: u64,
    count: usize,
    buffer: *mut c_void,
) -> Status;

/// `EFI_PCI_ROOT_BRIDGE_IO_PROTOCOL_ACCESS`.
#[repr(C)]
pub struct RootBridgeAccess {
    pub read: Access<PciRootBridgeIo>,
    pub write: Access<PciRootBridgeIo>,
}

#[repr(C)]
#[unsafe_protocol("2f707ebb-4a1a-11d4-9a38-0090273fc14d")]
pub struct PciRootBridgeIo {
    pub parent_handle: *mut c_void,
    pub poll_mem: *const c_void,
    pub poll_io: *const c_void,
    pub mem: RootBridgeAccess,
    pub io: RootBridgeAccess,
    pub pci: RootBridgeAccess,
    pub copy_mem: *const c_void,
    pub map: *const c_void,
    pub unmap: *const c_void,
    pub allocate_buffer: *const c_void,
    pub free_buffer: *const c_void,
    pub flush: *const c_void,
    pub get_attributes: *const c_void,
    pub set_attributes: *const c_void,
    pub configuration: unsafe extern "efiapi" fn(this: *const Self, resources: *mut *mut u8) -> Status,
    pub segment_number: u32,
}

impl PciRootBridgeIo {
    #[must_use]
    pub const fn segment_number(&self) -> u32 {
        self.segment_number
    }

    /// Reads `buffer.len()` bytes of configuration space.
    ///
    /// # Errors
    /// Returns the firmware status.
    pub fn read_config(&self, address: ConfigAddress, buffer: &mut [u8]) -> Result<(), Status> {
        unsafe {
            (self.pci.read)(
                self,
                IoWidth::Uint8,
                address.into_bits(),
                buffer.len(),
                buffer.as_mut_ptr().cast(),
            )
        }
        .to_result()
        .map_err(|e| e.status())
    }

    /// Reads the device independent header at `address`.
    ///
    /// # Errors
    /// Returns the firmware status.
    pub fn read_header(&self, address: ConfigAddress) -> Result<PciHeader, Status> {
        let mut raw = [0u8; HEADER_LEN];
        self.read_config(address, &mut raw)?;
        PciHeader::parse(&raw).map_err(|_| Status::DEVICE_ERROR)
    }

    /// The resources currently assigned to the bridge.
    ///
    /// # Errors
    /// Returns the firmware status, or [`Status::COMPROMISED_DATA`] for a
    /// malformed descriptor list.
    pub fn configuration(&self) -> Result<Vec<AddressSpace>, Status> {
        let mut descriptors = null();
        unsafe { (self.configuration)(self, &raw mut descriptors) }
            .to_result()
            .map_err(|e| e.status())?;
        if descriptors.is_null() {
            return Err(Status::NOT_FOUND);
        }
        // SAFETY: firmware returns a descriptor list closed by an end tag;
        // scan for it to learn the length.
        let bytes = unsafe { descriptor_list(descriptors) };
        resources::parse(&bytes).map_err(|_| Status::COMPROMISED_DATA)
    }
}

/// Copies a descriptor list up to and including its end tag.
unsafe fn descriptor_list(start: *const u8) -> Vec<u8> {
    let mut out = vec![];
    let mut at = start;
    loop {
        let tag = unsafe { *at };
        if tag != resources::QWORD_ADDRESS_SPACE {
            out.extend_from_slice(unsafe { core::slice::from_raw_parts(at, 2) });
            return out;
        }
        let len = usize::from(u16::from_le_bytes(unsafe { [*at.add(1), *at.add(2)] }));
        out.extend_from_slice(unsafe { core::slice::from_raw_parts(at, 3 + len) });
        at = unsafe { at.add(3 + len) };
    }
}
