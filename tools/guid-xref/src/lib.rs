//! # GUID cross reference
//!
//! EDK2 builds emit a `Guid.xref` file next to the firmware image, one
//! `GUID NAME` pair per line. Boot logs print raw GUIDs; this crate swaps
//! every GUID it knows for its name so the log becomes readable.
//!
//! ```
//! use guid_xref::XrefTable;
//!
//! let table = XrefTable::parse("7c04a583-9e3e-4f1c-ad65-e05268d0b4d1 Shell\n");
//! let (text, replaced) = table.replace("Loading driver 7C04A583-9E3E-4F1C-AD65-E05268D0B4D1");
//! assert_eq!(text, "Loading driver Shell");
//! assert_eq!(replaced, 1);
//! ```

use anyhow::Context;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Length of a GUID in registry format.
pub const GUID_TEXT_LEN: usize = 36;

/// GUID to name mapping loaded from one or more `Guid.xref` files.
#[derive(Debug, Default, Clone)]
pub struct XrefTable {
    names: HashMap<String, String>,
}

impl XrefTable {
    /// Parses `Guid.xref` text.
    ///
    /// Only lines made of exactly one GUID and one name separated by a single
    /// space are used; anything else is skipped. GUIDs are stored uppercase.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut table = Self::default();
        table.merge(text);
        table
    }

    /// Adds the entries of another `Guid.xref` text. Later entries win.
    pub fn merge(&mut self, text: &str) {
        for line in text.lines() {
            let mut fields = line.trim_end_matches('\r').split(' ');
            if let (Some(guid), Some(name), None) = (fields.next(), fields.next(), fields.next())
                && is_guid(guid.as_bytes())
                && !name.is_empty()
            {
                self.names.insert(guid.to_ascii_uppercase(), name.to_string());
            }
        }
    }

    /// Loads and merges a file.
    ///
    /// # Errors
    /// Fails if the file cannot be read as UTF-8 text.
    pub fn merge_file(&mut self, path: &Path) -> anyhow::Result<()> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read GUID file {}", path.display()))?;
        self.merge(&text);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name registered for `guid`, in any letter case.
    #[must_use]
    pub fn name(&self, guid: &str) -> Option<&str> {
        self.names.get(&guid.to_ascii_uppercase()).map(String::as_str)
    }

    /// Replaces every known GUID in `log` with its name and returns the new
    /// text together with the number of replacements. Unknown GUIDs are kept.
    #[must_use]
    pub fn replace(&self, log: &str) -> (String, usize) {
        let bytes = log.as_bytes();
        let mut out = String::with_capacity(log.len());
        let mut replaced = 0;
        let mut copied = 0;
        let mut at = 0;
        while at + GUID_TEXT_LEN <= bytes.len() {
            let candidate = &bytes[at..at + GUID_TEXT_LEN];
            // ASCII only, so the slice is on character boundaries.
            if is_guid(candidate)
                && let Some(name) = self.name(&log[at..at + GUID_TEXT_LEN])
            {
                out.push_str(&log[copied..at]);
                out.push_str(name);
                replaced += 1;
                at += GUID_TEXT_LEN;
                copied = at;
                continue;
            }
            at += 1;
        }
        out.push_str(&log[copied..]);
        (out, replaced)
    }
}

/// Matches `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` with hex digits of any case.
#[must_use]
pub fn is_guid(text: &[u8]) -> bool {
    text.len() == GUID_TEXT_LEN
        && text.iter().enumerate().all(|(i, b)| match i {
            8 | 13 | 18 | 23 => *b == b'-',
            _ => b.is_ascii_hexdigit(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const XREF: &str = "\
7c04a583-9e3e-4f1c-ad65-e05268d0b4d1 Shell
a0bad9f7-ab78-491b-b583-c52b7f84b9e0 SmmControl2Dxe
not-a-guid Ignored
1ba0062e-c779-4582-8566-336ae8f78f09 Reset Vector
d6a2cb7f-6a18-4e2f-b43b-9920a733700a DxeCore\r
";

    #[test]
    fn parses_valid_lines_only() {
        let table = XrefTable::parse(XREF);
        assert_eq!(table.len(), 3);
        assert_eq!(table.name("7C04A583-9E3E-4F1C-AD65-E05268D0B4D1"), Some("Shell"));
        assert_eq!(table.name("d6a2cb7f-6a18-4e2f-b43b-9920a733700a"), Some("DxeCore"));
        assert_eq!(table.name("1ba0062e-c779-4582-8566-336ae8f78f09"), None);
    }

    #[test]
    fn later_entries_win() {
        let mut table = XrefTable::parse(XREF);
        table.merge("7C04A583-9E3E-4F1C-AD65-E05268D0B4D1 UiApp\n");
        assert_eq!(table.len(), 3);
        assert_eq!(table.name("7c04a583-9e3e-4f1c-ad65-e05268d0b4d1"), Some("UiApp"));
    }

    #[test]
    fn replaces_known_guids() {
        let table = XrefTable::parse(XREF);
        let log = "Loading driver at 0x0007E9F6000 EntryPoint=0x0007E9F6268 \
                   A0BAD9F7-AB78-491B-B583-C52B7F84B9E0\n\
                   InstallProtocolInterface: 5B1B31A1-9562-11D2-8E3F-00A0C969723B 7EA5F028\n";
        let (text, replaced) = table.replace(log);
        assert_eq!(replaced, 1);
        assert!(text.contains("EntryPoint=0x0007E9F6268 SmmControl2Dxe\n"));
        assert!(text.contains("5B1B31A1-9562-11D2-8E3F-00A0C969723B"));
    }

    #[test]
    fn adjacent_and_partial_guids() {
        let table = XrefTable::parse(XREF);
        let (text, replaced) = table.replace(
            "7C04A583-9E3E-4F1C-AD65-E05268D0B4D1D6A2CB7F-6A18-4E2F-B43B-9920A733700A 7C04A583-9E3E",
        );
        assert_eq!(text, "ShellDxeCore 7C04A583-9E3E");
        assert_eq!(replaced, 2);
    }

    #[test]
    fn guid_shape() {
        assert!(is_guid(b"7c04a583-9e3e-4f1c-ad65-e05268d0b4d1"));
        assert!(!is_guid(b"7c04a583-9e3e-4f1c-ad65-e05268d0b4d"));
        assert!(!is_guid(b"7c04a583x9e3e-4f1c-ad65-e05268d0b4d1"));
        assert!(!is_guid(b"7c04a583-9e3e-4f1c-ad65-e05268d0b4dz"));
    }
}
