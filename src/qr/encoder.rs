//! QR code encoder

use crate::config::QrOptions;
use crate::error::{Error, Result};
use crate::qr::{Color, ErrorCorrection, QrPayload};
use image::{DynamicImage, ImageBuffer, Pixel};
use qrcode::types::QrError;
use qrcode::{QrCode, Version};

/// Highest normal QR symbol version
pub const MAX_VERSION: i16 = 40;

/// Modules per side of a version 40 symbol
const MAX_MODULES: usize = 177;

/// Largest image side in pixels the encoder will produce
pub const MAX_IMAGE_SIDE: u32 = 16_384;

/// A rendered QR symbol together with the parameters the encoder settled on
#[derive(Debug, Clone)]
pub struct EncodedQr {
    /// Symbol version actually used (1..=40)
    pub version: i16,
    /// Modules per side, border excluded
    pub modules: usize,
    /// Error correction level of the symbol
    pub error_correction: ErrorCorrection,
    /// Rasterized image
    pub image: DynamicImage,
}

/// QR code encoder
#[derive(Debug, Clone)]
pub struct QrEncoder {
    /// Minimum (or exact, without `fit`) symbol version; `None` picks the smallest that fits
    version: Option<i16>,
    /// Error correction level
    ecc_level: ErrorCorrection,
    /// Pixels per module side
    box_size: u32,
    /// Quiet zone width in modules
    border: u32,
    /// Grow past `version` when the payload does not fit
    fit: bool,
    fill_color: Color,
    back_color: Color,
}

impl QrEncoder {
    /// Create an encoder with the default rendering parameters
    /// (auto version, level L, 10 px modules, 4 module border, black on white)
    pub fn new() -> Self {
        Self {
            version: None,
            ecc_level: ErrorCorrection::L,
            box_size: 10,
            border: 4,
            fit: true,
            fill_color: Color::BLACK,
            back_color: Color::WHITE,
        }
    }

    /// Create a new QR encoder with a specific error correction level
    pub fn with_ecc_level(ecc_level: ErrorCorrection) -> Self {
        Self {
            ecc_level,
            ..Self::new()
        }
    }

    /// Build an encoder from configuration, rejecting out-of-range settings.
    pub fn from_options(options: &QrOptions) -> Result<Self> {
        if options.box_size == 0 {
            return Err(Error::Config("box_size must be at least 1 pixel".to_string()));
        }

        if let Some(version) = options.version {
            if !(1..=MAX_VERSION).contains(&version) {
                return Err(Error::Config(format!(
                    "version {version} out of range, expected 1..={MAX_VERSION}"
                )));
            }
        }

        let encoder = Self {
            version: options.version,
            ecc_level: options.error_correction,
            box_size: options.box_size,
            border: options.border,
            fit: options.fit,
            fill_color: options.fill_color,
            back_color: options.back_color,
        };

        // Any symbol the payload may grow into has to stay within the pixel limit.
        encoder.image_side(MAX_MODULES).map_err(|_| {
            Error::Config(format!(
                "box_size {} with border {} exceeds the {MAX_IMAGE_SIDE} px image limit for large symbols",
                options.box_size, options.border
            ))
        })?;

        Ok(encoder)
    }

    /// Error correction level used for new symbols
    pub fn ecc_level(&self) -> ErrorCorrection {
        self.ecc_level
    }

    /// Side length in pixels of the image produced for a symbol with `modules` per side.
    pub fn image_side(&self, modules: usize) -> Result<u32> {
        u32::try_from(modules)
            .ok()
            .and_then(|m| self.border.checked_mul(2)?.checked_add(m))
            .and_then(|m| m.checked_mul(self.box_size))
            .filter(|side| *side <= MAX_IMAGE_SIDE)
            .ok_or_else(|| {
                Error::Config(format!(
                    "{modules} modules with border {} at {} px per module exceeds {MAX_IMAGE_SIDE} px",
                    self.border, self.box_size
                ))
            })
    }

    /// Build the module matrix for a payload.
    pub fn encode_code(&self, payload: &QrPayload) -> Result<QrCode> {
        let level = self.ecc_level.ec_level();

        let Some(start) = self.version else {
            return QrCode::with_error_correction_level(payload.as_bytes(), level)
                .map_err(|e| self.map_qr_error(payload, e));
        };

        let last = if self.fit { MAX_VERSION } else { start };
        let mut outcome = Err(QrError::DataTooLong);
        for version in start..=last {
            outcome = QrCode::with_version(payload.as_bytes(), Version::Normal(version), level);
            match outcome {
                Err(QrError::DataTooLong) => {
                    tracing::trace!(version, "payload does not fit, trying next version");
                }
                _ => break,
            }
        }

        outcome.map_err(|e| self.map_qr_error(payload, e))
    }

    fn map_qr_error(&self, payload: &QrPayload, err: QrError) -> Error {
        match err {
            QrError::DataTooLong => Error::PayloadTooLong {
                len: payload.len(),
                level: self.ecc_level.to_string(),
                reason: match (self.version, self.fit) {
                    (Some(v), false) => format!("version {v} is pinned and fit is disabled"),
                    (Some(v), true) => format!("no version between {v} and {MAX_VERSION} is large enough"),
                    (None, _) => format!("exceeds version {MAX_VERSION} capacity"),
                },
            },
            other => Error::QrEncode(format!("Failed to create QR code: {other}")),
        }
    }

    /// Rasterize a symbol: each module becomes a `box_size` square, surrounded by
    /// `border` modules of background.
    pub fn render(&self, code: &QrCode) -> Result<DynamicImage> {
        let side = self.image_side(code.width())?;

        Ok(if self.fill_color.is_opaque() && self.back_color.is_opaque() {
            DynamicImage::ImageRgb8(self.paint(
                code,
                side,
                self.fill_color.to_rgb(),
                self.back_color.to_rgb(),
            ))
        } else {
            DynamicImage::ImageRgba8(self.paint(
                code,
                side,
                self.fill_color.to_rgba(),
                self.back_color.to_rgba(),
            ))
        })
    }

    fn paint<P: Pixel>(
        &self,
        code: &QrCode,
        side: u32,
        fill: P,
        back: P,
    ) -> ImageBuffer<P, Vec<P::Subpixel>> {
        let modules = code.width();
        let colors = code.to_colors();
        let border = self.border as usize;

        ImageBuffer::from_fn(side, side, |x, y| {
            let mx = (x / self.box_size) as usize;
            let my = (y / self.box_size) as usize;

            let inside = (border..border + modules).contains(&mx)
                && (border..border + modules).contains(&my);
            if inside && colors[(my - border) * modules + (mx - border)] == qrcode::Color::Dark {
                fill
            } else {
                back
            }
        })
    }

    /// Encode a payload and render it, keeping the chosen symbol parameters.
    pub fn encode_detailed(&self, payload: &QrPayload) -> Result<EncodedQr> {
        let code = self.encode_code(payload)?;

        let version = match code.version() {
            Version::Normal(v) | Version::Micro(v) => v,
        };
        let modules = code.width();
        let image = self.render(&code)?;

        tracing::debug!(
            version,
            modules,
            ecc_level = %self.ecc_level,
            side = image.width(),
            "Encoded QR symbol"
        );

        Ok(EncodedQr {
            version,
            modules,
            error_correction: ErrorCorrection::from_ec_level(code.error_correction_level()),
            image,
        })
    }

    /// Encode data into a QR code image
    pub fn encode(&self, payload: &QrPayload) -> Result<DynamicImage> {
        Ok(self.encode_detailed(payload)?.image)
    }

    /// Encode a string into a QR code image
    pub fn encode_string(&self, data: &str) -> Result<DynamicImage> {
        let payload = QrPayload::from_string(data.to_string());
        self.encode(&payload)
    }

    /// Encode bytes into a QR code image
    pub fn encode_bytes(&self, data: &[u8]) -> Result<DynamicImage> {
        let payload = QrPayload::from_bytes(data.to_vec());
        self.encode(&payload)
    }
}

impl Default for QrEncoder {
    fn default() -> Self {
        Self::new()
    }
}
