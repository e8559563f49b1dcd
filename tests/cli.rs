use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use image::GenericImageView;
use qrmint::QrDecoder;
use serde_json::Value;

/// Run the binary in `dir` with no inherited `QRMINT_*` settings or XDG config.
fn run_qrmint(dir: &Path, args: &[&str], vars: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_qrmint"));
    command.current_dir(dir).args(args).env("XDG_CONFIG_HOME", dir);
    for (name, _) in std::env::vars().filter(|(name, _)| name.starts_with("QRMINT_")) {
        command.env_remove(name);
    }
    command.envs(vars.iter().copied());
    command.output().expect("run qrmint binary")
}

#[test]
fn bare_run_writes_reference_image_to_cwd() {
    let dir = tempfile::tempdir().expect("tempdir");

    let output = run_qrmint(dir.path(), &[], &[]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("QR code written to qr_web.png"), "stdout: {stdout}");

    let image = image::open(dir.path().join("qr_web.png")).expect("open qr_web.png");
    assert_eq!(image.dimensions(), (290, 290));
    let decoded = QrDecoder::new().decode(&image).expect("decode");
    assert_eq!(decoded.as_str(), Some("berdinidss.es"));
}

#[test]
fn json_flag_prints_parseable_report() {
    let dir = tempfile::tempdir().expect("tempdir");

    let output = run_qrmint(
        dir.path(),
        &["--json", "--verify", "--output", "out/code.bmp"],
        &[],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let report: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(report["format"], "bmp");
    assert_eq!(report["version"], 1);
    assert_eq!(report["error_correction"], "L");
    assert_eq!(report["width"], 290);
    assert_eq!(report["payload_text"], "berdinidss.es");
    assert_eq!(report["verified"], true);
    assert!(dir.path().join("out/code.bmp").exists());
}

#[test]
fn format_flag_overrides_extension() {
    let dir = tempfile::tempdir().expect("tempdir");

    let output = run_qrmint(dir.path(), &["--output", "code.img", "--format", "png"], &[]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let bytes = fs::read(dir.path().join("code.img")).expect("read code.img");
    assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
}

#[test]
fn failed_verification_exits_non_zero() {
    let dir = tempfile::tempdir().expect("tempdir");

    // Transparent white modules on white leave nothing to decode.
    let output = run_qrmint(
        dir.path(),
        &["--verify"],
        &[("QRMINT_FILL_COLOR", "transparent")],
    );
    assert!(!output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Verified: MISMATCH"), "stdout: {stdout}");
}

#[test]
fn invalid_configuration_exits_non_zero() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("qrmint.toml"), "[qr]\nbox_size = 0\n").expect("write config");

    let output = run_qrmint(dir.path(), &[], &[]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("box_size"));
    assert!(!dir.path().join("qr_web.png").exists());
}
