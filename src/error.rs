//! Error types for qrmint operations

use thiserror::Error;

/// Result type alias using qrmint's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for qrmint operations
#[derive(Error, Debug)]
pub enum Error {
    /// QR code encoding failed
    #[error("Failed to encode QR code: {0}")]
    QrEncode(String),

    /// Payload does not fit in any permitted symbol version
    #[error("Payload of {len} bytes does not fit at error correction level {level}: {reason}")]
    PayloadTooLong {
        /// Payload length in bytes
        len: usize,
        /// Error correction level that was requested
        level: String,
        /// Encoder explanation
        reason: String,
    },

    /// QR code decoding failed
    #[error("Failed to decode QR code: {0}")]
    QrDecode(String),

    /// No QR code found in image
    #[error("No QR code found in image")]
    NoQrCodeFound,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image processing error
    #[error("Image processing error: {0}")]
    Image(String),

    /// Writing the output file failed
    #[error("Output error: {0}")]
    Output(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Other(format!("JSON error: {}", e))
    }
}
