//! # HII Configuration Strings
//!
//! The HII configuration routing and keyword handler protocols exchange
//! settings as `&`-separated `KEY=value` text:
//!
//! ```text
//! GUID=<32 hex>&NAME=<4 hex per char>&PATH=<hex device path>
//!     &OFFSET=<hex>&WIDTH=<hex>&VALUE=<hex, little-endian>
//!     &OFFSET=...                                    (more blocks)
//! GUID=...                                           (next storage)
//! ```
//!
//! Keyword strings use `NAMESPACE=`, `PATH=`, `KEYWORD=` and `VALUE=` in the
//! same syntax. This module builds request strings, splits responses into
//! typed [`ConfigElement`]s and renders them for the console.

use crate::hex;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use firmware_types::Guid;
use firmware_types::device_path::DevicePath;
use firmware_types::hexdump::HexDump;

/// Default of `PcdUefiLibMaxPrintBufferSize`, the longest string the
/// firmware `Print` routine emits in one go.
pub const MAX_PRINT_BUFFER_SIZE: usize = 320;

/// Builds a `<ConfigHdr>` identifying a variable store.
///
/// The GUID is written byte by byte in memory order, the name as UCS-2 code
/// units and the device path as raw bytes, all lowercase.
#[must_use]
pub fn config_header(guid: &Guid, name: &str, device_path: &[u8]) -> String {
    alloc::format!(
        "GUID={}&NAME={}&PATH={}",
        hex::encode(&guid.to_bytes()),
        hex::encode_name(name),
        hex::encode(device_path)
    )
}

/// Appends a `&OFFSET=..&WIDTH=..` block request.
#[must_use]
pub fn block_request(header: &str, offset: &str, width: &str) -> String {
    alloc::format!("{header}&OFFSET={offset}&WIDTH={width}")
}

/// Appends a `&OFFSET=..&WIDTH=..&VALUE=..` block for `RouteConfig`.
#[must_use]
pub fn block_config(header: &str, offset: &str, width: &str, value: &str) -> String {
    alloc::format!("{header}&OFFSET={offset}&WIDTH={width}&VALUE={value}")
}

/// One `&`-separated element of a configuration or keyword string.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ConfigElement<'a> {
    /// `GUID=`; `guid` is `None` unless the payload decodes to 16 bytes.
    Guid { raw: &'a str, guid: Option<Guid> },
    /// `NAME=` with the decoded storage name.
    Name { raw: &'a str, name: Option<String> },
    /// `PATH=` with the decoded device path if it is well formed.
    Path { raw: &'a str, path: Option<Vec<u8>> },
    Offset(&'a str),
    Width(&'a str),
    /// `VALUE=` with the little-endian buffer it encodes.
    Value { raw: &'a str, bytes: Option<Vec<u8>> },
    Namespace(&'a str),
    Keyword(&'a str),
    /// Anything else, e.g. `ALTCFG=` or `READONLY`.
    Other(&'a str),
}

impl<'a> ConfigElement<'a> {
    /// Classifies a single element by its key.
    #[must_use]
    pub fn parse(raw: &'a str) -> Self {
        let Some((key, value)) = raw.split_once('=') else {
            return Self::Other(raw);
        };
        match key {
            "GUID" => Self::Guid {
                raw,
                guid: hex::decode(value)
                    .ok()
                    .and_then(|b| <[u8; 16]>::try_from(b).ok())
                    .map(Guid::from_bytes),
            },
            "NAME" => Self::Name {
                raw,
                name: hex::decode_name(value).ok(),
            },
            "PATH" => Self::Path {
                raw,
                path: hex::decode(value)
                    .ok()
                    .filter(|b| DevicePath::new(b).validate().is_ok()),
            },
            "OFFSET" => Self::Offset(raw),
            "WIDTH" => Self::Width(raw),
            "VALUE" => Self::Value {
                raw,
                bytes: hex::decode_reversed(value).ok(),
            },
            "NAMESPACE" => Self::Namespace(raw),
            "KEYWORD" => Self::Keyword(raw),
            _ => Self::Other(raw),
        }
    }

    /// The element text as it appeared in the string.
    #[must_use]
    pub const fn raw(&self) -> &'a str {
        match self {
            Self::Guid { raw, .. }
            | Self::Name { raw, .. }
            | Self::Path { raw, .. }
            | Self::Value { raw, .. }
            | Self::Offset(raw)
            | Self::Width(raw)
            | Self::Namespace(raw)
            | Self::Keyword(raw)
            | Self::Other(raw) => *raw,
        }
    }
}

/// Splits a configuration string into its elements.
pub fn elements(config: &str) -> impl Iterator<Item = ConfigElement<'_>> {
    config.split('&').map(ConfigElement::parse)
}

/// Splits a multi-storage response at each `GUID=` into per-storage strings.
pub fn storages(config: &str) -> impl Iterator<Item = &str> {
    let mut rest = config;
    core::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let next = rest
            .match_indices("&GUID=")
            .next()
            .map_or(rest.len(), |(i, _)| i);
        let (storage, tail) = rest.split_at(next);
        rest = tail.strip_prefix('&').unwrap_or(tail);
        Some(storage)
    })
}

/// A string cut to the firmware print limit.
///
/// Strings longer than `max` characters keep their first `max - 6`
/// characters followed by `<...>`.
#[derive(Debug, Copy, Clone)]
pub struct LongString<'a> {
    text: &'a str,
    max: usize,
}

impl<'a> LongString<'a> {
    #[must_use]
    pub const fn new(text: &'a str) -> Self {
        Self {
            text,
            max: MAX_PRINT_BUFFER_SIZE,
        }
    }

    #[must_use]
    pub const fn with_max(text: &'a str, max: usize) -> Self {
        Self { text, max }
    }
}

impl fmt::Display for LongString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.text.chars().count() <= self.max {
            return f.write_str(self.text);
        }
        let keep = self.max.saturating_sub(6);
        let cut = self
            .text
            .char_indices()
            .nth(keep)
            .map_or(self.text.len(), |(i, _)| i);
        f.write_str(&self.text[..cut])?;
        f.write_str("<...>")
    }
}

/// Human readable rendering of a configuration or keyword string.
///
/// * `GUID=` starts a new paragraph and is annotated with the GUID.
/// * `NAME=` is annotated with the decoded name, `PATH=` with the device path
///   text when a converter is set through [`ConfigRender::with_path_text`].
/// * `OFFSET=` and `WIDTH=` share a line.
/// * `VALUE=` is followed by a hex dump of the decoded buffer.
/// * `NAMESPACE=` is preceded by a blank line.
#[derive(Debug, Copy, Clone)]
pub struct ConfigRender<'a> {
    config: &'a str,
    max: usize,
    path_text: Option<PathToText>,
}

/// Converts a validated device path to its text form, e.g. through
/// `EFI_DEVICE_PATH_TO_TEXT_PROTOCOL`. `None` leaves the element unannotated.
pub type PathToText = fn(&[u8]) -> Option<String>;

impl<'a> ConfigRender<'a> {
    #[must_use]
    pub const fn new(config: &'a str) -> Self {
        Self {
            config,
            max: MAX_PRINT_BUFFER_SIZE,
            path_text: None,
        }
    }

    #[must_use]
    pub const fn with_max(config: &'a str, max: usize) -> Self {
        Self {
            config,
            max,
            path_text: None,
        }
    }

    #[must_use]
    pub const fn with_path_text(mut self, path_text: PathToText) -> Self {
        self.path_text = Some(path_text);
        self
    }
}

impl fmt::Display for ConfigRender<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in elements(self.config) {
            match &element {
                ConfigElement::Guid { raw, guid } => match guid {
                    Some(guid) => write!(f, "\n{raw} ({guid})\n")?,
                    None => write!(f, "\n{raw}\n")?,
                },
                ConfigElement::Name { raw, name } => match name {
                    Some(name) => write!(f, "{raw} ({name})\n")?,
                    None => writeln!(f, "{raw}")?,
                },
                ConfigElement::Path { raw, path } => {
                    match path.as_deref().zip(self.path_text).and_then(|(p, text)| text(p)) {
                        Some(text) => write!(f, "{raw} ({text})\n")?,
                        None => writeln!(f, "{raw}")?,
                    }
                }
                ConfigElement::Offset(raw) | ConfigElement::Width(raw) => write!(f, "{raw}  ")?,
                ConfigElement::Value { raw, bytes } => {
                    writeln!(f, "{}", LongString::with_max(raw, self.max))?;
                    if let Some(bytes) = bytes {
                        write!(f, "{}", HexDump::compact(bytes))?;
                    }
                }
                ConfigElement::Namespace(raw) => write!(f, "\n{raw}\n")?,
                ConfigElement::Keyword(raw) | ConfigElement::Other(raw) => writeln!(f, "{raw}")?,
            }
        }
        Ok(())
    }
}

/// Where a firmware call stopped parsing a request string.
///
/// `ExtractConfig`, `RouteConfig` and the keyword handler report progress as
/// a pointer into the request; `offset` is that position in characters.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Progress<'a> {
    request: &'a str,
    offset: usize,
}

impl<'a> Progress<'a> {
    /// Creates the report for `request`. Offsets past the end are clamped.
    #[must_use]
    pub fn new(request: &'a str, offset: usize) -> Self {
        Self {
            request,
            offset: offset.min(request.chars().count()),
        }
    }

    /// The part of the request that was not consumed.
    #[must_use]
    pub fn unparsed(&self) -> &'a str {
        let byte = self
            .request
            .char_indices()
            .nth(self.offset)
            .map_or(self.request.len(), |(i, _)| i);
        &self.request[byte..]
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unparsed().is_empty()
    }

    /// Parsing stopped midway, so earlier blocks may have been applied.
    #[must_use]
    pub fn partially_applied(&self) -> bool {
        !self.is_complete() && self.offset > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use firmware_types::device_path::{END_ENTIRE, pci_node};
    use firmware_types::guid;

    const GUID: Guid = guid!("a04a27f4-df00-4d42-b552-39511302113d");

    fn pci_path() -> Vec<u8> {
        [pci_node(3, 0).as_slice(), &END_ENTIRE].concat()
    }

    fn pci_text(path: &[u8]) -> Option<String> {
        (path == pci_path()).then(|| String::from("Pci(0x3,0x0)"))
    }

    #[test]
    fn header_encoding() {
        let header = config_header(&GUID, "Data", &pci_path());
        assert_eq!(
            header,
            "GUID=f4274aa000df424db55239511302113d&NAME=0044006100740061&PATH=0101060000037fff0400"
        );
    }

    #[test]
    fn request_builders() {
        assert_eq!(block_request("HDR", "0", "1"), "HDR&OFFSET=0&WIDTH=1");
        assert_eq!(
            block_config("HDR", "10", "2", "0033"),
            "HDR&OFFSET=10&WIDTH=2&VALUE=0033"
        );
    }

    #[test]
    fn element_classification() {
        let header = config_header(&GUID, "Data", &pci_path());
        let config = block_config(&header, "0010", "0002", "abc");
        let parsed: Vec<_> = elements(&config).collect();
        assert_eq!(parsed.len(), 6);
        assert_eq!(
            parsed[0],
            ConfigElement::Guid {
                raw: "GUID=f4274aa000df424db55239511302113d",
                guid: Some(GUID)
            }
        );
        assert!(matches!(&parsed[1], ConfigElement::Name { name: Some(n), .. } if n == "Data"));
        assert!(matches!(&parsed[2], ConfigElement::Path { path: Some(p), .. } if *p == pci_path()));
        assert_eq!(parsed[3], ConfigElement::Offset("OFFSET=0010"));
        assert_eq!(parsed[4], ConfigElement::Width("WIDTH=0002"));
        assert_eq!(
            parsed[5],
            ConfigElement::Value {
                raw: "VALUE=abc",
                bytes: Some(vec![0xbc, 0x0a])
            }
        );
    }

    #[test]
    fn malformed_payloads_are_kept_raw() {
        assert_eq!(
            ConfigElement::parse("GUID=0102"),
            ConfigElement::Guid { raw: "GUID=0102", guid: None }
        );
        assert_eq!(
            ConfigElement::parse("PATH=0000"),
            ConfigElement::Path { raw: "PATH=0000", path: None }
        );
        assert_eq!(ConfigElement::parse("ALTCFG=0000"), ConfigElement::Other("ALTCFG=0000"));
        assert_eq!(ConfigElement::parse("READONLY"), ConfigElement::Other("READONLY"));
        assert_eq!(ConfigElement::parse("NAMESPACE=x-UEFI-ns"), ConfigElement::Namespace("NAMESPACE=x-UEFI-ns"));
    }

    #[test]
    fn render_block() {
        let header = config_header(&GUID, "Data", &pci_path());
        let config = block_config(&header, "0000", "0001", "07");
        let out = ConfigRender::new(&config).with_path_text(pci_text).to_string();
        let expected = format!(
            "\nGUID=f4274aa000df424db55239511302113d ({GUID})\n\
             NAME=0044006100740061 (Data)\n\
             PATH=0101060000037fff0400 (Pci(0x3,0x0))\n\
             OFFSET=0000  WIDTH=0001  VALUE=07\n\
             07 {} | .\n",
            "   ".repeat(15)
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn render_keyword_response() {
        let response = "NAMESPACE=x-UEFI-ns&PATH=7fff0400&KEYWORD=iSCSIMacAddr:1&VALUE=00&READONLY";
        let out = ConfigRender::new(response).with_path_text(pci_text).to_string();
        assert!(out.starts_with("\nNAMESPACE=x-UEFI-ns\nPATH=7fff0400\nKEYWORD=iSCSIMacAddr:1\nVALUE=00\n"));
        assert!(out.ends_with("READONLY\n"));
    }

    #[test]
    fn path_annotation_needs_a_converter() {
        let header = config_header(&GUID, "Data", &pci_path());
        let plain = ConfigRender::new(&header).to_string();
        assert!(plain.ends_with("PATH=0101060000037fff0400\n"));

        let annotated = ConfigRender::new(&header).with_path_text(pci_text).to_string();
        assert!(annotated.ends_with("PATH=0101060000037fff0400 (Pci(0x3,0x0))\n"));

        let broken = ConfigRender::new("PATH=01010600").with_path_text(|_| Some(String::from("?"))).to_string();
        assert_eq!(broken, "PATH=01010600\n");
    }

    #[test]
    fn long_strings_are_truncated() {
        let long = "a".repeat(400);
        let shown = LongString::new(&long).to_string();
        assert_eq!(shown.len(), MAX_PRINT_BUFFER_SIZE - 1);
        assert!(shown.ends_with("a<...>"));
        assert_eq!(LongString::with_max("short", 10).to_string(), "short");
        assert_eq!(LongString::with_max("0123456789AB", 10).to_string(), "0123<...>");
    }

    #[test]
    fn long_string_limit_is_inclusive() {
        let exact: String = ('a'..='z').cycle().take(MAX_PRINT_BUFFER_SIZE).collect();
        assert_eq!(LongString::new(&exact).to_string(), exact);

        let over = alloc::format!("{exact}z");
        let shown = LongString::new(&over).to_string();
        let keep = MAX_PRINT_BUFFER_SIZE - 6;
        assert_eq!(&shown[..keep], &exact[..keep]);
        assert_eq!(&shown[keep..], "<...>");
    }

    #[test]
    fn storages_split_on_guid() {
        let all = "GUID=01&NAME=02&PATH=03&OFFSET=0&GUID=04&NAME=05";
        let parts: Vec<_> = storages(all).collect();
        assert_eq!(parts, ["GUID=01&NAME=02&PATH=03&OFFSET=0", "GUID=04&NAME=05"]);
    }

    #[test]
    fn progress_reports() {
        let request = "GUID=01&NAME=02";
        let done = Progress::new(request, request.len());
        assert!(done.is_complete());
        assert!(!done.partially_applied());

        let untouched = Progress::new(request, 0);
        assert_eq!(untouched.unparsed(), request);
        assert!(!untouched.partially_applied());

        let midway = Progress::new(request, 8);
        assert_eq!(midway.unparsed(), "NAME=02");
        assert!(midway.partially_applied());
    }
}
