//! qrmint command line entrypoint

use clap::Parser;
use qrmint::{Error, QrGenerator, QrmintConfig, Result, logging, render_report};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "qrmint",
    version,
    about = "Encode a payload as a QR code and write it to an image file"
)]
struct Cli {
    /// Optional configuration file (toml/yaml). Defaults to qrmint.{toml,yaml} in cwd/XDG config.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the output image path (format follows the extension)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Override the image format regardless of the output extension (png, jpeg, bmp, ...)
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// Decode the written image and fail unless it yields the original payload
    #[arg(long)]
    verify: bool,

    /// Print the report as formatted JSON instead of human-readable text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = QrmintConfig::load(cli.config.as_deref())?;

    if let Some(path) = cli.output {
        config.output.path = path;
    }

    if let Some(format) = cli.format {
        config.output.format = Some(format);
    }

    if cli.verify {
        config.output.verify = true;
    }

    logging::init(&config.logging)?;
    config.log_load_notes();
    info!(qr = ?config.qr, output = ?config.output, "Generating QR code");

    let generator = QrGenerator::new(&config)?;
    let report = generator.generate()?;
    let rendered = render_report(&report);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&rendered.json)?);
    } else {
        for line in &rendered.human {
            println!("{line}");
        }
    }

    if report.verified == Some(false) {
        return Err(Error::QrDecode(format!(
            "{} does not decode to the configured payload",
            report.path.display()
        )));
    }

    Ok(())
}
