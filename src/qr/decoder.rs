//! QR code decoder using rqrr

use crate::error::{Error, Result};
use crate::qr::QrPayload;
use image::{DynamicImage, GrayImage};
use std::path::Path;

/// QR code decoder
#[derive(Debug, Default)]
pub struct QrDecoder {}

impl QrDecoder {
    /// Create a new QR decoder with default settings
    pub fn new() -> Self {
        Self {}
    }

    /// Decode a QR code from an image
    pub fn decode(&self, img: &DynamicImage) -> Result<QrPayload> {
        self.decode_gray(img.to_luma8())
    }

    /// Open an image file and decode the first QR code in it
    pub fn decode_file(&self, path: &Path) -> Result<QrPayload> {
        let img = image::open(path)?;
        self.decode(&img)
    }

    /// Decode the first readable QR code in a grayscale image.
    ///
    /// The payload is returned as raw bytes, so binary data survives unchanged.
    pub fn decode_gray(&self, img: GrayImage) -> Result<QrPayload> {
        let mut prepared = rqrr::PreparedImage::prepare(img);
        let grids = prepared.detect_grids();
        if grids.is_empty() {
            return Err(Error::NoQrCodeFound);
        }

        let mut last_error = None;
        for (index, grid) in grids.iter().enumerate() {
            let mut data = Vec::new();
            match grid.decode_to(&mut data) {
                Ok(meta) => {
                    tracing::debug!(
                        grid = index,
                        version = ?meta.version,
                        ecc_level = meta.ecc_level,
                        bytes = data.len(),
                        "Decoded QR grid"
                    );
                    return Ok(QrPayload::from_bytes(data));
                }
                Err(e) => {
                    tracing::debug!(grid = index, error = ?e, "Skipping undecodable QR grid");
                    last_error = Some(e);
                }
            }
        }

        Err(Error::QrDecode(format!(
            "{} grid(s) detected, none decodable: {:?}",
            grids.len(),
            last_error
        )))
    }
}
