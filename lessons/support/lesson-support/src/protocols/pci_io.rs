//! `EFI_PCI_IO_PROTOCOL`.

use super::IoWidth;
use core::ffi::c_void;
use firmware_pci::config::{HEADER_LEN, Location, PciHeader};
use uefi::proto::unsafe_protocol;
use uefi::{Status, StatusExt};

#[repr(C)]
pub struct MemIoAccess {
    pub read: *const c_void,
    pub write: *const c_void,
}

#[repr(C)]
pub struct ConfigAccess {
    pub read: unsafe extern "efiapi" fn(
        this: *const PciIo,
        width: IoWidth,
        offset: u32,
        count: usize,
        buffer: *mut c_void,
    ) -> Status,
    pub write: *const c_void,
}

#[repr(C)]
#[unsafe_protocol("4cf5b200-68b8-4ca5-9eec-b23e3f50029a")]
pub struct PciIo {
    pub poll_mem: *const c_void,
    pub poll_io: *const c_void,
    pub mem: MemIoAccess,
    pub io: MemIoAccess,
    pub pci: ConfigAccess,
    pub copy_mem: *const c_void,
    pub map: *const c_void,
    pub unmap: *const c_void,
    pub allocate_buffer: *const c_void,
    pub free_buffer: *const c_void,
    pub flush: *const c_void,
    pub get_location: unsafe extern "efiapi" fn(
        this: *const Self,
        segment: *mut usize,
        bus: *mut usize,
        device: *mut usize,
        function: *mut usize,
    ) -> Status,
    pub attributes: *const c_void,
    pub get_bar_attributes: *const c_void,
    pub set_bar_attributes: *const c_void,
    pub rom_size: u64,
    pub rom_image: *const u8,
}

impl PciIo {
    /// # Errors
    /// Returns the firmware status.
    pub fn location(&self) -> Result<Location, Status> {
        let (mut segment, mut bus, mut device, mut function) = (0, 0, 0, 0);
        unsafe {
            (self.get_location)(
                self,
                &raw mut segment,
                &raw mut bus,
                &raw mut device,
                &raw mut function,
            )
        }
        .to_result()
        .map_err(|e| e.status())?;
        let narrow = |v: usize| u8::try_from(v).map_err(|_| Status::DEVICE_ERROR);
        Ok(Location {
            segment: u32::try_from(segment).map_err(|_| Status::DEVICE_ERROR)?,
            bus: narrow(bus)?,
            device: narrow(device)?,
            function: narrow(function)?,
        })
    }

    /// # Errors
    /// Returns the firmware status.
    pub fn read_header(&self) -> Result<PciHeader, Status> {
        let mut raw = [0u8; HEADER_LEN];
        unsafe {
            (self.pci.read)(self, IoWidth::Uint8, 0, raw.len(), raw.as_mut_ptr().cast())
        }
        .to_result()
        .map_err(|e| e.status())?;
        PciHeader::parse(&raw).map_err(|_| Status::DEVICE_ERROR)
    }

    /// Address of the in-memory copy of the option ROM.
    #[must_use]
    pub fn rom_address(&self) -> u64 {
        self.rom_image as usize as u64
    }

    /// The option ROM copy made by the PCI bus driver, if any.
    #[must_use]
    pub fn rom(&self) -> Option<&[u8]> {
        let size = usize::try_from(self.rom_size).ok()?;
        if size == 0 || self.rom_image.is_null() {
            return None;
        }
        // SAFETY: the bus driver keeps `RomSize` bytes at `RomImage` for the
        // lifetime of the protocol instance.
        Some(unsafe { core::slice::from_raw_parts(self.rom_image, size) })
    }
}
