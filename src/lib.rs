//! QRMINT - encode a payload as a QR code and write it to disk
//!
//! The QR algorithm (Reed-Solomon, module placement, masking) comes from the
//! `qrcode` crate. This crate adds rendering with an explicit box size, border
//! and colors, image output in any format `image` can write, and an optional
//! read-back check through `rqrr`.
//!
//! With default settings the generator encodes `berdinidss.es` at error
//! correction level L with 10 px modules and a 4 module border, and writes a
//! black on white `qr_web.png`.
//!
//! # Example
//!
//! ```no_run
//! use qrmint::{QrGenerator, QrmintConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut config = QrmintConfig::default();
//!     config.output.verify = true;
//!
//!     let report = QrGenerator::new(&config)?.generate()?;
//!     println!("wrote {} ({}x{})", report.path.display(), report.width, report.height);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]

pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod qr;

pub use error::{Error, Result};

pub use config::{LogRotation, LoggingOptions, OutputOptions, QrOptions, QrmintConfig};
pub use output::{GeneratedQr, RenderedReport, render_report};
pub use qr::{Color, EncodedQr, ErrorCorrection, QrDecoder, QrEncoder, QrPayload};

use std::path::Path;

/// High-level generator combining encoder, image output and read-back check
pub struct QrGenerator {
    payload: QrPayload,
    output: OutputOptions,
    encoder: QrEncoder,
    decoder: QrDecoder,
}

impl QrGenerator {
    /// Create a generator from configuration, validating encoder settings
    pub fn new(config: &QrmintConfig) -> Result<Self> {
        let encoder = QrEncoder::from_options(&config.qr)?;

        Ok(Self {
            payload: config.qr.payload(),
            output: config.output.clone(),
            encoder,
            decoder: QrDecoder::new(),
        })
    }

    /// Payload this generator encodes
    pub fn payload(&self) -> &QrPayload {
        &self.payload
    }

    /// Encode the payload, write the image and optionally verify the written file
    pub fn generate(&self) -> Result<GeneratedQr> {
        let path = self.output.path.as_path();
        let format = output::resolve_format(path, self.output.format.as_deref())?;

        let encoded = self.encoder.encode_detailed(&self.payload)?;
        output::write_image(&encoded.image, path, format)?;

        let verified = if self.output.verify {
            Some(self.verify(path)?)
        } else {
            None
        };

        Ok(GeneratedQr {
            path: path.to_path_buf(),
            format: output::format_label(format).to_string(),
            version: encoded.version,
            error_correction: encoded.error_correction,
            modules: encoded.modules,
            width: encoded.image.width(),
            height: encoded.image.height(),
            payload_text: self.payload.as_str().map(str::to_string),
            payload: self.payload.as_bytes().to_vec(),
            verified,
        })
    }

    /// Decode the image at `path` and check it carries exactly this generator's payload.
    ///
    /// An image without a readable code counts as a mismatch; failing to open it is an error.
    pub fn verify(&self, path: &Path) -> Result<bool> {
        let decoded = match self.decoder.decode_file(path) {
            Ok(decoded) => decoded,
            Err(err @ (Error::NoQrCodeFound | Error::QrDecode(_))) => {
                tracing::warn!(path = %path.display(), "Verification could not read a QR code: {err}");
                return Ok(false);
            }
            Err(err) => return Err(err),
        };
        let matches = decoded.as_bytes() == self.payload.as_bytes();

        if matches {
            tracing::info!(path = %path.display(), "Round trip verified");
        } else {
            tracing::warn!(
                path = %path.display(),
                expected = self.payload.len(),
                decoded = decoded.len(),
                "Decoded payload differs from the encoded one"
            );
        }

        Ok(matches)
    }
}
