//! Transmission modes
//!
//! Binary and Continuous copy bytes verbatim. ASCII recodes every byte
//! through 7-bit ASCII, replacing anything outside it with `?`; the
//! recoding is length-preserving but not binary-safe.

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;

const REPLACEMENT: u8 = b'?';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransmissionMode {
    Ascii,
    #[default]
    Binary,
    Continuous,
}

impl TransmissionMode {
    pub fn describe(self) -> &'static str {
        match self {
            TransmissionMode::Ascii => "Ascii",
            TransmissionMode::Binary => "Binary",
            TransmissionMode::Continuous => "Continuous",
        }
    }

    /// Recodes a chunk in place for transmission in this mode.
    pub fn recode(self, chunk: &mut [u8]) {
        if self == TransmissionMode::Ascii {
            for byte in chunk.iter_mut().filter(|b| !b.is_ascii()) {
                *byte = REPLACEMENT;
            }
        }
    }
}

impl FromStr for TransmissionMode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(TransmissionMode::Ascii),
            "B" => Ok(TransmissionMode::Binary),
            "C" => Ok(TransmissionMode::Continuous),
            _ => Err(ProtocolError::InvalidArguments("Type not valid")),
        }
    }
}

impl fmt::Display for TransmissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_binary() {
        assert_eq!(TransmissionMode::default(), TransmissionMode::Binary);
    }

    #[test]
    fn ascii_replaces_high_bytes() {
        let mut chunk = vec![b'h', b'i', 0x00, 0x7f, 0x80, 0xff, b'\n'];
        TransmissionMode::Ascii.recode(&mut chunk);
        assert_eq!(chunk, vec![b'h', b'i', 0x00, 0x7f, b'?', b'?', b'\n']);
    }

    #[test]
    fn binary_and_continuous_are_verbatim() {
        let original = vec![0x00, 0x80, 0xff];
        for mode in [TransmissionMode::Binary, TransmissionMode::Continuous] {
            let mut chunk = original.clone();
            mode.recode(&mut chunk);
            assert_eq!(chunk, original);
        }
    }

    #[test]
    fn parses_letters_case_insensitively() {
        assert_eq!("c".parse::<TransmissionMode>().unwrap(), TransmissionMode::Continuous);
        assert!("AB".parse::<TransmissionMode>().is_err());
    }
}
