//! # Device Paths
//!
//! A device path is a packed list of variable-sized nodes, each starting with
//! a four byte header:
//!
//! ```text
//! +------+---------+-----------+----------------+
//! | Type | SubType | Length LE | node data ...  |
//! +------+---------+-----------+----------------+
//!   u8      u8        u16        Length - 4 bytes
//! ```
//!
//! The list ends with an End Entire node (`0x7F`/`0xFF`). An End Instance node
//! (`0x7F`/`0x01`) separates instances of a multi-instance path.
//!
//! [`DevicePath`] walks and validates paths held in plain byte buffers, such
//! as the file path list of a load option or the `PATH=` element of a HII
//! configuration string. Building paths and converting them to and from text
//! is left to the firmware's device path protocols.

/// Node types.
pub mod node_type {
    pub const HARDWARE: u8 = 0x01;
    pub const ACPI: u8 = 0x02;
    pub const MESSAGING: u8 = 0x03;
    pub const MEDIA: u8 = 0x04;
    pub const BIOS_BOOT_SPEC: u8 = 0x05;
    pub const END: u8 = 0x7F;
}

/// Node sub-types, grouped by node type.
pub mod sub_type {
    pub const HW_PCI: u8 = 0x01;
    pub const HW_PCCARD: u8 = 0x02;
    pub const HW_MEMMAP: u8 = 0x03;
    pub const HW_VENDOR: u8 = 0x04;
    pub const HW_CONTROLLER: u8 = 0x05;

    pub const ACPI: u8 = 0x01;

    pub const MSG_SCSI: u8 = 0x02;
    pub const MSG_USB: u8 = 0x05;
    pub const MSG_VENDOR: u8 = 0x0A;
    pub const MSG_MAC_ADDR: u8 = 0x0B;
    pub const MSG_IPV4: u8 = 0x0C;
    pub const MSG_SATA: u8 = 0x12;
    pub const MSG_NVME_NAMESPACE: u8 = 0x17;
    pub const MSG_URI: u8 = 0x18;

    pub const MEDIA_HARDDRIVE: u8 = 0x01;
    pub const MEDIA_CDROM: u8 = 0x02;
    pub const MEDIA_VENDOR: u8 = 0x03;
    pub const MEDIA_FILEPATH: u8 = 0x04;
    pub const MEDIA_PIWG_FW_FILE: u8 = 0x06;
    pub const MEDIA_PIWG_FW_VOL: u8 = 0x07;
    pub const MEDIA_RELATIVE_OFFSET: u8 = 0x08;

    pub const END_INSTANCE: u8 = 0x01;
    pub const END_ENTIRE: u8 = 0xFF;
}

/// Size of a node header in bytes.
pub const NODE_HEADER_LEN: usize = 4;

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum DevicePathError {
    #[error("device path node at offset {0} is truncated")]
    Truncated(usize),
    #[error("device path node at offset {offset} has invalid length {length}")]
    InvalidLength { offset: usize, length: u16 },
    #[error("device path node at offset {0} has type 0 or sub-type 0")]
    InvalidNode(usize),
    #[error("device path is not terminated by an End Entire node")]
    Unterminated,
}

/// A single node borrowed from a device path.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DevicePathNode<'a> {
    pub ty: u8,
    pub sub_type: u8,
    /// Node payload after the header.
    pub data: &'a [u8],
}

impl DevicePathNode<'_> {
    /// Total node length including the header.
    #[must_use]
    pub const fn len(&self) -> usize {
        NODE_HEADER_LEN + self.data.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub const fn is_end_entire(&self) -> bool {
        self.ty == node_type::END && self.sub_type == sub_type::END_ENTIRE
    }

    #[must_use]
    pub const fn is_end_instance(&self) -> bool {
        self.ty == node_type::END && self.sub_type == sub_type::END_INSTANCE
    }

    #[must_use]
    pub const fn is(&self, ty: u8, sub_type: u8) -> bool {
        self.ty == ty && self.sub_type == sub_type
    }
}

/// A borrowed, possibly unvalidated device path.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DevicePath<'a> {
    bytes: &'a [u8],
}

impl<'a> DevicePath<'a> {
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Iterates the nodes up to, but not including, the End Entire node.
    #[must_use]
    pub const fn nodes(&self) -> Nodes<'a> {
        Nodes {
            bytes: self.bytes,
            offset: 0,
            done: false,
            terminated: false,
        }
    }

    /// Checks every node and returns the path size including the End Entire node.
    ///
    /// Nodes must have a non-zero type and sub-type, a length of at least the
    /// header size, and lie inside the buffer.
    ///
    /// # Errors
    /// Returns the first structural problem found.
    pub fn validate(&self) -> Result<usize, DevicePathError> {
        let mut nodes = self.nodes();
        #[allow(clippy::while_let_on_iterator)]
        while let Some(node) = nodes.next() {
            let node = node?;
            if node.ty == 0 || node.sub_type == 0 {
                return Err(DevicePathError::InvalidNode(nodes.offset - node.len()));
            }
        }
        if nodes.terminated {
            Ok(nodes.offset)
        } else {
            Err(DevicePathError::Unterminated)
        }
    }

    /// Counts nodes of the given type and sub-type.
    #[must_use]
    pub fn count(&self, ty: u8, sub_type: u8) -> usize {
        self.nodes()
            .map_while(Result::ok)
            .filter(|n| n.is(ty, sub_type))
            .count()
    }
}

/// Iterator over the nodes of a [`DevicePath`].
pub struct Nodes<'a> {
    bytes: &'a [u8],
    offset: usize,
    done: bool,
    terminated: bool,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = Result<DevicePathNode<'a>, DevicePathError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let offset = self.offset;
        let Some(header) = self.bytes.get(offset..offset + NODE_HEADER_LEN) else {
            self.done = true;
            return if offset == self.bytes.len() {
                None
            } else {
                Some(Err(DevicePathError::Truncated(offset)))
            };
        };

        let length = u16::from_le_bytes([header[2], header[3]]);
        let len = usize::from(length);
        if len < NODE_HEADER_LEN {
            self.done = true;
            return Some(Err(DevicePathError::InvalidLength { offset, length }));
        }
        let Some(data) = self.bytes.get(offset + NODE_HEADER_LEN..offset + len) else {
            self.done = true;
            return Some(Err(DevicePathError::Truncated(offset)));
        };

        self.offset += len;
        let node = DevicePathNode {
            ty: header[0],
            sub_type: header[1],
            data,
        };
        if node.is_end_entire() {
            self.done = true;
            self.terminated = true;
            return None;
        }
        Some(Ok(node))
    }
}

/// The End Entire node.
pub const END_ENTIRE: [u8; 4] = [node_type::END, sub_type::END_ENTIRE, 4, 0];

/// Encodes a standalone `PCI_DEVICE_PATH` node.
#[must_use]
pub const fn pci_node(device: u8, function: u8) -> [u8; 6] {
    [node_type::HARDWARE, sub_type::HW_PCI, 6, 0, function, device]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pci_path(nodes: &[(u8, u8)]) -> Vec<u8> {
        let mut bytes: Vec<u8> = nodes.iter().flat_map(|&(d, f)| pci_node(d, f)).collect();
        bytes.extend_from_slice(&END_ENTIRE);
        bytes
    }

    #[test]
    fn walk_nodes() {
        let bytes = pci_path(&[(3, 5), (0, 1)]);
        assert_eq!(bytes.len(), 6 + 6 + 4);

        let path = DevicePath::new(&bytes);
        assert_eq!(path.validate(), Ok(16));
        let nodes: Vec<_> = path.nodes().collect::<Result<_, _>>().unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].data, &[5, 3]);
        assert_eq!(nodes[1].len(), 6);
        assert!(nodes[1].is(node_type::HARDWARE, sub_type::HW_PCI));
        assert_eq!(path.count(node_type::HARDWARE, sub_type::HW_PCI), 2);
    }

    #[test]
    fn multi_instance_paths() {
        let mut bytes: Vec<u8> = pci_node(3, 5).to_vec();
        bytes.extend_from_slice(&[node_type::END, sub_type::END_INSTANCE, 4, 0]);
        bytes.extend_from_slice(&pci_path(&[(3, 5), (3, 5)]));
        let path = DevicePath::new(&bytes);
        assert_eq!(path.validate(), Ok(bytes.len()));
        assert_eq!(path.count(node_type::HARDWARE, sub_type::HW_PCI), 3);
        assert_eq!(path.nodes().filter(|n| n.unwrap().is_end_instance()).count(), 1);
    }

    #[test]
    fn validation_errors() {
        assert_eq!(
            DevicePath::new(&[1, 1, 6, 0, 0, 0]).validate(),
            Err(DevicePathError::Unterminated)
        );
        assert_eq!(
            DevicePath::new(&[1, 1, 2, 0]).validate(),
            Err(DevicePathError::InvalidLength { offset: 0, length: 2 })
        );
        assert_eq!(
            DevicePath::new(&[1, 1, 8, 0, 0]).validate(),
            Err(DevicePathError::Truncated(0))
        );
        assert_eq!(
            DevicePath::new(&[0, 1, 4, 0, 0x7F, 0xFF, 4, 0]).validate(),
            Err(DevicePathError::InvalidNode(0))
        );
        assert_eq!(
            DevicePath::new(&[1, 1, 6, 0, 5, 3, 0x7F]).validate(),
            Err(DevicePathError::Truncated(6))
        );
    }

    #[test]
    fn trailing_bytes_after_end_are_ignored() {
        let bytes = [0x7F, 0xFF, 4, 0, 0xAA, 0xBB];
        assert_eq!(DevicePath::new(&bytes).validate(), Ok(4));
    }
}
