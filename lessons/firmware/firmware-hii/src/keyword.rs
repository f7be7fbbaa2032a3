//! Status bits reported by `EFI_CONFIG_KEYWORD_HANDLER_PROTOCOL` in
//! `ProgressErr`.

use bitfield_struct::bitfield;
use core::fmt;

#[bitfield(u32)]
#[derive(Eq, PartialEq)]
pub struct KeywordProgress {
    /// Bit 0: the `NAMESPACE=` id was not found.
    pub namespace_id_not_found: bool,
    /// Bit 1: the keyword string is malformed.
    pub malformed_string: bool,
    /// Bit 2: the keyword was not found.
    pub keyword_not_found: bool,
    /// Bit 3: the value does not fit the keyword's type.
    pub incompatible_value_detected: bool,
    /// Bit 4: the keyword is read only or otherwise protected.
    pub access_not_permitted: bool,
    #[bits(26)]
    __: u32,
    /// Bit 31: any other failure.
    pub undefined: bool,
}

impl KeywordProgress {
    #[must_use]
    pub const fn is_error(self) -> bool {
        self.into_bits() != 0
    }

    /// Short description of the first error reported.
    #[must_use]
    pub const fn description(self) -> &'static str {
        if self.namespace_id_not_found() {
            "NamespaceId not found"
        } else if self.malformed_string() {
            "Malformed string"
        } else if self.keyword_not_found() {
            "Keyword not found"
        } else if self.incompatible_value_detected() {
            "Incompatible value detected"
        } else if self.access_not_permitted() {
            "Access not permitted"
        } else {
            "Unknown error"
        }
    }
}

impl fmt::Display for KeywordProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn bits() {
        assert_eq!(KeywordProgress::new().with_malformed_string(true).into_bits(), 0x2);
        assert_eq!(KeywordProgress::new().with_access_not_permitted(true).into_bits(), 0x10);
        assert_eq!(KeywordProgress::new().with_undefined(true).into_bits(), 0x8000_0000);
        assert!(!KeywordProgress::new().is_error());
    }

    #[test]
    fn descriptions() {
        assert_eq!(KeywordProgress::from_bits(0x1).to_string(), "NamespaceId not found");
        assert_eq!(KeywordProgress::from_bits(0x4).to_string(), "Keyword not found");
        assert_eq!(KeywordProgress::from_bits(0x8).to_string(), "Incompatible value detected");
        assert_eq!(KeywordProgress::from_bits(0x8000_0000).to_string(), "Unknown error");
    }
}
