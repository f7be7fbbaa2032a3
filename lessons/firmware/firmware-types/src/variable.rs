//! UEFI variable attributes and boot manager variable helpers.

use alloc::string::String;
use alloc::vec::Vec;
use bitfield_struct::bitfield;
use core::fmt;

/// Attributes passed to and returned from `GetVariable`/`SetVariable`.
#[bitfield(u32)]
#[derive(Eq, PartialEq)]
pub struct VariableAttributes {
    /// Bit 0: survives a reset.
    pub non_volatile: bool,
    /// Bit 1: accessible before `ExitBootServices`.
    pub bootservice_access: bool,
    /// Bit 2: accessible after `ExitBootServices`.
    pub runtime_access: bool,
    /// Bit 3: hardware error record.
    pub hardware_error_record: bool,
    /// Bit 4: deprecated count-based authenticated write access.
    pub authenticated_write_access: bool,
    /// Bit 5: time-based authenticated write access.
    pub time_based_authenticated_write_access: bool,
    /// Bit 6: append to the existing value instead of replacing it.
    pub append_write: bool,
    /// Bit 7: enhanced authenticated access.
    pub enhanced_authenticated_access: bool,
    #[bits(24)]
    __: u32,
}

impl VariableAttributes {
    /// `NV + BS + RT`, the attributes of the boot manager variables.
    pub const NV_BS_RT: Self = Self::new()
        .with_non_volatile(true)
        .with_bootservice_access(true)
        .with_runtime_access(true);
}

/// Renders the attribute set the way the UEFI Shell does, e.g. `NV+BS+RT`.
impl fmt::Display for VariableAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (self.non_volatile(), "NV"),
            (self.bootservice_access(), "BS"),
            (self.runtime_access(), "RT"),
            (self.hardware_error_record(), "HR"),
            (self.authenticated_write_access(), "AW"),
            (self.time_based_authenticated_write_access(), "AT"),
            (self.append_write(), "AP"),
            (self.enhanced_authenticated_access(), "EA"),
        ];
        let mut first = true;
        for (_, name) in names.into_iter().filter(|(set, _)| *set) {
            if !first {
                f.write_str("+")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum VariableError {
    #[error("unknown attribute letter '{0}'")]
    UnknownAttribute(char),
    #[error("variable data length {0} is not a multiple of two")]
    OddLength(usize),
}

/// Parses a combination of the letters `n` (non-volatile),
/// `b` (boot service access) and `r` (runtime access).
///
/// # Errors
/// Any other letter is rejected.
pub fn parse_attribute_letters(letters: &str) -> Result<VariableAttributes, VariableError> {
    letters.chars().try_fold(VariableAttributes::new(), |attrs, c| match c {
        'n' => Ok(attrs.with_non_volatile(true)),
        'b' => Ok(attrs.with_bootservice_access(true)),
        'r' => Ok(attrs.with_runtime_access(true)),
        other => Err(VariableError::UnknownAttribute(other)),
    })
}

/// Name of the boot option variable for `number`, e.g. `Boot0001`.
#[must_use]
pub fn boot_option_name(number: u16) -> String {
    alloc::format!("Boot{number:04X}")
}

/// Decodes a variable holding little-endian `u16` values such as `BootOrder`.
///
/// # Errors
/// Fails when the data length is odd.
pub fn parse_u16_array(data: &[u8]) -> Result<Vec<u16>, VariableError> {
    if data.len() % 2 != 0 {
        return Err(VariableError::OddLength(data.len()));
    }
    Ok(data
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_to_attributes() {
        let attrs = parse_attribute_letters("nbr").unwrap();
        assert_eq!(attrs.into_bits(), 0x7);
        assert_eq!(attrs, VariableAttributes::NV_BS_RT);
        assert_eq!(parse_attribute_letters("b").unwrap().into_bits(), 0x2);
        assert_eq!(parse_attribute_letters("").unwrap().into_bits(), 0);
        assert_eq!(
            parse_attribute_letters("nx"),
            Err(VariableError::UnknownAttribute('x'))
        );
    }

    #[test]
    fn attribute_display() {
        assert_eq!(VariableAttributes::NV_BS_RT.to_string(), "NV+BS+RT");
        assert_eq!(VariableAttributes::from_bits(0x27).to_string(), "NV+BS+RT+AT");
        assert_eq!(VariableAttributes::new().to_string(), "");
    }

    #[test]
    fn boot_names() {
        assert_eq!(boot_option_name(1), "Boot0001");
        assert_eq!(boot_option_name(0x00AB), "Boot00AB");
    }

    #[test]
    fn boot_order() {
        assert_eq!(parse_u16_array(&[1, 0, 0, 1]).unwrap(), vec![1, 0x100]);
        assert_eq!(parse_u16_array(&[1]), Err(VariableError::OddLength(1)));
    }
}
