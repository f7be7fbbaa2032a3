//! Hex dump formatting for console output.

use core::fmt;

const BYTES_PER_LINE: usize = 16;

/// Layout of a [`HexDump`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum HexDumpStyle {
    /// `xx xx .. xx  | ascii` lines without offsets.
    ///
    /// Printable range is `0x20..0x7E`.
    Compact,
    /// `0x00000010: xx xx .. xx  |ascii|` lines followed by a blank line.
    ///
    /// Printable range is `0x21..0x7E`.
    Offset,
}

/// Lazily formatted hex dump of a byte slice.
///
/// ```
/// use firmware_types::hexdump::HexDump;
/// let dump = HexDump::compact(b"AB").to_string();
/// assert!(dump.starts_with("41 42 "));
/// ```
#[derive(Debug, Copy, Clone)]
pub struct HexDump<'a> {
    bytes: &'a [u8],
    style: HexDumpStyle,
}

impl<'a> HexDump<'a> {
    #[must_use]
    pub const fn compact(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            style: HexDumpStyle::Compact,
        }
    }

    #[must_use]
    pub const fn offset(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            style: HexDumpStyle::Offset,
        }
    }

    fn fmt_compact(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.bytes.chunks(BYTES_PER_LINE) {
            for b in line {
                write!(f, "{b:02x} ")?;
            }
            for _ in line.len()..BYTES_PER_LINE {
                f.write_str("   ")?;
            }
            f.write_str(" | ")?;
            for &b in line {
                f.write_str(printable(b, 0x20))?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }

    fn fmt_offset(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, line) in self.bytes.chunks(BYTES_PER_LINE).enumerate() {
            write!(f, "0x{:08x}: ", index * BYTES_PER_LINE)?;
            for (i, b) in line.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{b:02x}")?;
            }
            for _ in line.len()..BYTES_PER_LINE {
                f.write_str("   ")?;
            }
            f.write_str("  |")?;
            for &b in line {
                f.write_str(printable(b, 0x21))?;
            }
            f.write_str("|\n")?;
        }
        f.write_str("\n")
    }
}

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.style {
            HexDumpStyle::Compact => self.fmt_compact(f),
            HexDumpStyle::Offset => self.fmt_offset(f),
        }
    }
}

/// Returns the byte as a one-character string or `"."` if unprintable.
fn printable(b: u8, lowest: u8) -> &'static str {
    const ASCII: &str = " !\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}";
    if b >= lowest && b < 0x7E {
        let i = usize::from(b - 0x20);
        &ASCII[i..=i]
    } else {
        "."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_full_line() {
        let bytes: Vec<u8> = (b'A'..=b'P').collect();
        let dump = HexDump::compact(&bytes).to_string();
        assert_eq!(
            dump,
            "41 42 43 44 45 46 47 48 49 4a 4b 4c 4d 4e 4f 50  | ABCDEFGHIJKLMNOP\n"
        );
    }

    #[test]
    fn compact_pads_short_line() {
        let dump = HexDump::compact(&[0x00, 0x7E, b' ']).to_string();
        let expected = format!("00 7e 20 {} | .. \n", "   ".repeat(13));
        assert_eq!(dump, expected);
    }

    #[test]
    fn offset_style_lines() {
        let bytes: Vec<u8> = (0u8..18).map(|b| b + b'a').collect();
        let dump = HexDump::offset(&bytes).to_string();
        let mut lines = dump.lines();
        assert_eq!(
            lines.next(),
            Some("0x00000000: 61 62 63 64 65 66 67 68 69 6a 6b 6c 6d 6e 6f 70  |abcdefghijklmnop|")
        );
        let second = lines.next().unwrap_or_default();
        assert!(second.starts_with("0x00000010: 71 72 "));
        assert!(second.ends_with("  |qr|"));
        assert_eq!(lines.next(), Some(""));
    }

    #[test]
    fn offset_style_hides_space() {
        let dump = HexDump::offset(b" !").to_string();
        assert!(dump.contains("|.!|"));
    }

    #[test]
    fn empty_input() {
        assert_eq!(HexDump::compact(&[]).to_string(), "");
        assert_eq!(HexDump::offset(&[]).to_string(), "\n");
    }
}
