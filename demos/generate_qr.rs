//! Generate a few QR codes with different rendering settings
//!
//! Usage: cargo run --example generate_qr

use qrmint::{Color, ErrorCorrection, QrEncoder, QrGenerator, QrOptions, QrPayload, QrmintConfig};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Default settings: berdinidss.es, level L, 10 px modules, 4 module border
    let report = QrGenerator::new(&QrmintConfig::default())?.generate()?;
    println!(
        "✓ {} written ({}x{} px, version {})",
        report.path.display(),
        report.width,
        report.height,
        report.version
    );

    // Navy on a transparent background with a thin border
    let options = QrOptions {
        error_correction: ErrorCorrection::Q,
        box_size: 6,
        border: 2,
        fill_color: Color::parse("navy")?,
        back_color: Color::TRANSPARENT,
        ..QrOptions::default()
    };
    let encoder = QrEncoder::from_options(&options)?;
    let image = encoder.encode(&QrPayload::from("https://berdinidss.es/contact"))?;
    image.save("qr_transparent.png")?;
    println!("✓ qr_transparent.png written");

    Ok(())
}
