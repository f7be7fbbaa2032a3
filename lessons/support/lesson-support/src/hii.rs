//! HII database helpers.

use crate::protocols::{HiiDatabase, HiiHandle};
use alloc::vec::Vec;
use firmware_hii::package::{PackageList, package_type};
use log::warn;
use uefi::{Guid, Status};

/// Handles of all package lists registered under `guid`.
///
/// # Errors
/// Returns the firmware status of the database listing.
pub fn handles_for_guid(db: &HiiDatabase, guid: &Guid) -> Result<Vec<HiiHandle>, Status> {
    let handles = db.list_package_lists(package_type::ALL)?;
    let mut found = Vec::new();
    for handle in handles {
        let list = match db.export_package_lists(Some(handle)) {
            Ok(list) => list,
            Err(status) => {
                warn!("Can't export package list {handle:?}: {status}");
                continue;
            }
        };
        if PackageList::parse(&list).is_ok_and(|list| list.guid == *guid) {
            found.push(handle);
        }
    }
    Ok(found)
}
