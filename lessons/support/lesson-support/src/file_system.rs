//! Whole-file access on the volume the lesson was loaded from.

use alloc::vec;
use alloc::vec::Vec;
use log::{debug, error};
use uefi::boot::{self, ScopedProtocol};
use uefi::proto::media::file::{Directory, File, FileAttribute, FileMode, RegularFile};
use uefi::proto::media::fs::SimpleFileSystem;
use uefi::{CStr16, CString16, Status};

fn image_volume() -> Result<Directory, Status> {
    let mut sfs: ScopedProtocol<SimpleFileSystem> =
        boot::get_image_file_system(boot::image_handle()).map_err(|e| {
            error!("Failed to get file system: {e:?}");
            Status::UNSUPPORTED
        })?;
    sfs.open_volume().map_err(|e| {
        error!("Failed to open root directory: {e:?}");
        e.status()
    })
}

/// Converts a file name for the file protocol.
///
/// # Errors
/// Returns [`Status::INVALID_PARAMETER`] for names that are not UCS-2.
pub fn file_name(name: &str) -> Result<CString16, Status> {
    CString16::try_from(name).map_err(|_| Status::INVALID_PARAMETER)
}

/// Loads a file from the image's file system.
///
/// # Errors
/// Returns the failing [`Status`]; a missing file is reported as
/// [`Status::NOT_FOUND`].
pub fn load_file(path: &CStr16) -> Result<Vec<u8>, Status> {
    let mut volume = image_volume()?;

    let handle = volume
        .open(path, FileMode::Read, FileAttribute::empty())
        .map_err(|e| {
            debug!("Failed to open {path}: {e:?}");
            e.status()
        })?;

    let Some(mut file) = handle.into_regular_file() else {
        error!("Failed to read {path}: not a file");
        return Err(Status::UNSUPPORTED);
    };

    file.set_position(RegularFile::END_OF_FILE).map_err(|e| {
        error!("Failed to seek to file end: {e:?}");
        e.status()
    })?;
    let size = file.get_position().map_err(|e| {
        error!("Failed to get file size: {e:?}");
        e.status()
    })?;
    file.set_position(0).map_err(|e| {
        error!("Failed to seek to file start: {e:?}");
        e.status()
    })?;

    let Ok(size) = usize::try_from(size) else {
        error!("Failed to get file size: invalid pointer widths");
        return Err(Status::UNSUPPORTED);
    };

    let mut buf = vec![0u8; size];
    let read = file.read(&mut buf).map_err(|e| {
        error!("Failed to read file contents: {e:?}");
        e.status()
    })?;

    if read != size {
        error!("Mismatch in file size: read {read} bytes, expected {size} bytes");
        return Err(Status::VOLUME_CORRUPTED);
    }

    Ok(buf)
}

/// Writes `data` to `path`, replacing any previous contents.
///
/// # Errors
/// Returns the failing [`Status`].
pub fn save_file(path: &CStr16, data: &[u8]) -> Result<(), Status> {
    let mut volume = image_volume()?;

    // Existing files keep their old length otherwise.
    if let Ok(existing) = volume.open(path, FileMode::ReadWrite, FileAttribute::empty()) {
        existing.delete().map_err(|e| {
            error!("Can't replace {path}: {e:?}");
            e.status()
        })?;
    }

    let handle = volume
        .open(path, FileMode::CreateReadWrite, FileAttribute::empty())
        .map_err(|e| e.status())?;
    let Some(mut file) = handle.into_regular_file() else {
        return Err(Status::ACCESS_DENIED);
    };
    file.write(data).map_err(|e| e.status())?;
    file.flush().map_err(|e| e.status())
}
