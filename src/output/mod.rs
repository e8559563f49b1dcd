//! Writing generated images and rendering the generation report

use crate::error::{Error, Result};
use crate::qr::ErrorCorrection;
use hex::encode as hex_encode;
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Summary of one generated QR image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedQr {
    /// File the image was written to
    pub path: PathBuf,
    /// Image format name (`png`, `jpeg`, ...)
    pub format: String,
    /// Symbol version used
    pub version: i16,
    /// Error correction level used
    pub error_correction: ErrorCorrection,
    /// Modules per side, border excluded
    pub modules: usize,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Payload text, if valid UTF-8
    pub payload_text: Option<String>,
    /// Raw payload
    pub payload: Vec<u8>,
    /// Round-trip result when verification ran
    pub verified: Option<bool>,
}

/// Combined structured and human-readable representation of a generation report
#[derive(Debug, Clone)]
pub struct RenderedReport {
    /// Structured JSON representation suitable for downstream consumers
    pub json: Value,
    /// Human-readable lines for terminal presentation
    pub human: Vec<String>,
}

/// Pick the image format from an explicit name, falling back to the path extension.
pub fn resolve_format(path: &Path, explicit: Option<&str>) -> Result<ImageFormat> {
    let format = match explicit {
        Some(name) => {
            let name = name.trim().trim_start_matches('.');
            ImageFormat::from_extension(name)
                .or_else(|| ImageFormat::from_mime_type(name))
                .ok_or_else(|| Error::Output(format!("Unknown image format '{name}'")))?
        }
        None => ImageFormat::from_path(path).map_err(|_| {
            Error::Output(format!(
                "Cannot infer image format from '{}', use an extension such as .png or set a format",
                path.display()
            ))
        })?,
    };

    if !format.writing_enabled() {
        return Err(Error::Output(format!(
            "Image format {} cannot be written",
            format_label(format)
        )));
    }

    Ok(format)
}

/// Short lowercase name of an image format
pub fn format_label(format: ImageFormat) -> &'static str {
    format.extensions_str().first().copied().unwrap_or("unknown")
}

fn supports_alpha(format: ImageFormat) -> bool {
    !matches!(format, ImageFormat::Jpeg | ImageFormat::Pnm)
}

/// Write `image` to `path`, creating missing parent directories.
pub fn write_image(image: &DynamicImage, path: &Path, format: ImageFormat) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            Error::Output(format!(
                "Failed to create output directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    let flattened;
    let image = if image.color().has_alpha() && !supports_alpha(format) {
        tracing::debug!(
            format = format_label(format),
            "Dropping alpha channel for format without transparency"
        );
        flattened = DynamicImage::ImageRgb8(image.to_rgb8());
        &flattened
    } else {
        image
    };

    image
        .save_with_format(path, format)
        .map_err(|e| Error::Output(format!("Failed to write {}: {e}", path.display())))?;

    tracing::info!(
        path = %path.display(),
        format = format_label(format),
        width = image.width(),
        height = image.height(),
        "Wrote QR image"
    );
    Ok(())
}

/// Render a generation report into both JSON and human-readable forms.
pub fn render_report(report: &GeneratedQr) -> RenderedReport {
    let json = report_value(report);
    let mut human = Vec::new();

    human.push(format!("QR code written to {}", report.path.display()));
    match &report.payload_text {
        Some(text) => human.push(format!("  Payload: {}", format_text_snippet(text))),
        None => human.push(format!("  Payload: {}", format_hex_snippet(&report.payload))),
    }
    human.push(format!(
        "  Symbol: version {} ({}x{} modules), error correction {}",
        report.version, report.modules, report.modules, report.error_correction
    ));
    human.push(format!(
        "  Image: {}x{} px, {}",
        report.width, report.height, report.format
    ));

    match report.verified {
        Some(true) => human.push("  Verified: decoded payload matches".to_string()),
        Some(false) => human.push("  Verified: MISMATCH".to_string()),
        None => {}
    }

    RenderedReport { json, human }
}

/// Produce a structured JSON representation of the report.
pub fn report_value(report: &GeneratedQr) -> Value {
    let mut root = Map::new();
    root.insert(
        "path".to_string(),
        Value::String(report.path.display().to_string()),
    );
    root.insert("format".to_string(), Value::String(report.format.clone()));
    root.insert("version".to_string(), Value::from(report.version));
    root.insert(
        "error_correction".to_string(),
        Value::String(report.error_correction.to_string()),
    );
    root.insert("modules".to_string(), Value::from(report.modules));
    root.insert("width".to_string(), Value::from(report.width));
    root.insert("height".to_string(), Value::from(report.height));
    root.insert(
        "payload_text".to_string(),
        report
            .payload_text
            .clone()
            .map(Value::String)
            .unwrap_or(Value::Null),
    );
    root.insert(
        "payload_hex".to_string(),
        Value::String(hex_encode(&report.payload)),
    );
    root.insert("byte_length".to_string(), Value::from(report.payload.len()));
    root.insert(
        "verified".to_string(),
        report.verified.map(Value::Bool).unwrap_or(Value::Null),
    );

    Value::Object(root)
}

fn format_hex_snippet(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "empty".to_string();
    }

    let hex = hex_encode(bytes);
    const MAX: usize = 64;
    if hex.len() > MAX {
        format!("{}... ({} bytes)", &hex[..MAX], bytes.len())
    } else {
        format!("{} ({} bytes)", hex, bytes.len())
    }
}

fn format_text_snippet(text: &str) -> String {
    const MAX: usize = 120;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let snippet: String = text.chars().take(MAX).collect();
        let total = text.chars().count();
        format!("{}... ({} chars)", snippet, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn sample_report() -> GeneratedQr {
        GeneratedQr {
            path: PathBuf::from("qr_web.png"),
            format: "png".to_string(),
            version: 1,
            error_correction: ErrorCorrection::L,
            modules: 21,
            width: 290,
            height: 290,
            payload_text: Some("berdinidss.es".to_string()),
            payload: b"berdinidss.es".to_vec(),
            verified: Some(true),
        }
    }

    #[test]
    fn resolves_format_from_extension_and_override() {
        assert_eq!(
            resolve_format(Path::new("qr_web.png"), None).unwrap(),
            ImageFormat::Png
        );
        assert_eq!(
            resolve_format(Path::new("out/qr.JPG"), None).unwrap(),
            ImageFormat::Jpeg
        );
        assert_eq!(
            resolve_format(Path::new("qr_web.png"), Some("bmp")).unwrap(),
            ImageFormat::Bmp
        );
        assert_eq!(
            resolve_format(Path::new("qr"), Some("image/png")).unwrap(),
            ImageFormat::Png
        );
    }

    #[test]
    fn rejects_unknown_formats() {
        assert!(matches!(
            resolve_format(Path::new("qr"), None),
            Err(Error::Output(_))
        ));
        assert!(matches!(
            resolve_format(Path::new("qr.txt"), None),
            Err(Error::Output(_))
        ));
        assert!(matches!(
            resolve_format(Path::new("qr.png"), Some("nope")),
            Err(Error::Output(_))
        ));
    }

    #[test]
    fn writes_into_missing_directories_and_flattens_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/qr.jpg");
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0])));

        write_image(&image, &path, ImageFormat::Jpeg).unwrap();
        let reopened = image::open(&path).unwrap();
        assert_eq!((reopened.width(), reopened.height()), (8, 8));
        assert!(!reopened.color().has_alpha());
    }

    #[test]
    fn renders_report_consistently() {
        let rendered = render_report(&sample_report());

        assert_eq!(rendered.json["version"], 1);
        assert_eq!(rendered.json["error_correction"], "L");
        assert_eq!(rendered.json["payload_text"], "berdinidss.es");
        assert_eq!(rendered.json["byte_length"], 13);
        assert_eq!(rendered.json["verified"], true);
        assert!(
            rendered
                .human
                .iter()
                .any(|line| line.contains("version 1 (21x21 modules)"))
        );
        assert!(
            rendered
                .human
                .iter()
                .any(|line| line.contains("290x290 px, png"))
        );
    }

    #[test]
    fn binary_payload_renders_as_hex() {
        let mut report = sample_report();
        report.payload_text = None;
        report.payload = vec![0xff, 0x00];
        report.verified = None;

        let rendered = render_report(&report);
        assert_eq!(rendered.json["payload_hex"], "ff00");
        assert_eq!(rendered.json["verified"], Value::Null);
        assert!(rendered.human.iter().any(|line| line.contains("ff00 (2 bytes)")));
        assert!(!rendered.human.iter().any(|line| line.contains("Verified")));
    }
}
