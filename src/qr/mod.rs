//! QR code encoding and decoding
//!
//! Encoding turns a payload into a module matrix and rasterizes it with the
//! configured box size, border and colors. Decoding is used to check that a
//! written image reads back as the original payload.

mod color;
mod decoder;
mod encoder;

pub use color::Color;
pub use decoder::QrDecoder;
pub use encoder::{EncodedQr, QrEncoder};

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A QR code payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrPayload {
    /// The raw data
    pub data: Vec<u8>,
    /// String representation if valid UTF-8
    pub text: Option<String>,
}

impl QrPayload {
    /// Create a new QR payload from raw bytes
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let text = String::from_utf8(data.clone()).ok();
        Self { data, text }
    }

    /// Create a new QR payload from a string
    pub fn from_string(s: String) -> Self {
        Self {
            data: s.as_bytes().to_vec(),
            text: Some(s),
        }
    }

    /// Get the payload as a string, if valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload carries no data
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<&str> for QrPayload {
    fn from(value: &str) -> Self {
        Self::from_string(value.to_string())
    }
}

/// Standard QR error correction levels, from least to most redundant
///
/// Serialized as the uppercase letter and parsed case-insensitively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ErrorCorrection {
    /// Recovers about 7% of codewords
    #[default]
    L,
    /// Recovers about 15% of codewords
    M,
    /// Recovers about 25% of codewords
    Q,
    /// Recovers about 30% of codewords
    H,
}

impl ErrorCorrection {
    /// Parse a level identifier (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "l" | "low" => Some(Self::L),
            "m" | "medium" => Some(Self::M),
            "q" | "quartile" => Some(Self::Q),
            "h" | "high" => Some(Self::H),
            _ => None,
        }
    }

    /// Matching `qrcode` level
    pub fn ec_level(self) -> qrcode::EcLevel {
        match self {
            Self::L => qrcode::EcLevel::L,
            Self::M => qrcode::EcLevel::M,
            Self::Q => qrcode::EcLevel::Q,
            Self::H => qrcode::EcLevel::H,
        }
    }

    pub(crate) fn from_ec_level(level: qrcode::EcLevel) -> Self {
        match level {
            qrcode::EcLevel::L => Self::L,
            qrcode::EcLevel::M => Self::M,
            qrcode::EcLevel::Q => Self::Q,
            qrcode::EcLevel::H => Self::H,
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        };
        f.write_str(label)
    }
}

impl FromStr for ErrorCorrection {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        Self::parse(value).ok_or_else(|| {
            Error::Config(format!(
                "Unknown error correction level '{value}', expected L, M, Q or H"
            ))
        })
    }
}

impl Serialize for ErrorCorrection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ErrorCorrection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_payload_from_string() {
        let payload = QrPayload::from_string("berdinidss.es".to_string());
        assert_eq!(payload.as_str(), Some("berdinidss.es"));
        assert_eq!(payload.as_bytes(), b"berdinidss.es");
        assert_eq!(payload.len(), 13);
    }

    #[test]
    fn test_qr_payload_from_bytes() {
        let payload = QrPayload::from_bytes(vec![0xFF, 0xFE]);
        assert!(payload.as_str().is_none()); // Invalid UTF-8
        assert_eq!(payload.as_bytes(), &[0xFF, 0xFE]);
    }

    #[test]
    fn test_error_correction_parse() {
        assert_eq!("l".parse::<ErrorCorrection>().unwrap(), ErrorCorrection::L);
        assert_eq!(ErrorCorrection::parse("High"), Some(ErrorCorrection::H));
        assert!("x".parse::<ErrorCorrection>().is_err());
        assert_eq!(ErrorCorrection::default(), ErrorCorrection::L);
    }

    #[test]
    fn test_error_correction_serde_accepts_any_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            level: ErrorCorrection,
        }

        for (raw, expected) in [
            ("H", ErrorCorrection::H),
            ("h", ErrorCorrection::H),
            ("Quartile", ErrorCorrection::Q),
        ] {
            let parsed: Wrapper = toml::from_str(&format!("level = \"{raw}\"")).unwrap();
            assert_eq!(parsed.level, expected);
        }

        assert!(toml::from_str::<Wrapper>("level = \"z\"").is_err());
        assert_eq!(serde_json::to_string(&ErrorCorrection::M).unwrap(), "\"M\"");
    }

    #[test]
    fn test_error_correction_maps_to_qrcode() {
        for level in [
            ErrorCorrection::L,
            ErrorCorrection::M,
            ErrorCorrection::Q,
            ErrorCorrection::H,
        ] {
            assert_eq!(ErrorCorrection::from_ec_level(level.ec_level()), level);
        }
    }
}
