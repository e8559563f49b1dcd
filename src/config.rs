//! qrmint runtime configuration handling

use crate::error::{Error, Result};
use crate::qr::{Color, ErrorCorrection, QrPayload};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Text encoded when nothing overrides it
pub const DEFAULT_PAYLOAD: &str = "berdinidss.es";

/// File written when nothing overrides it
pub const DEFAULT_OUTPUT: &str = "qr_web.png";

/// Top-level configuration structure persisted to disk or environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QrmintConfig {
    /// Payload and symbol rendering parameters
    pub qr: QrOptions,
    /// Output file settings
    pub output: OutputOptions,
    /// Logging configuration
    pub logging: LoggingOptions,
    /// File the configuration was read from
    #[serde(skip)]
    source: Option<PathBuf>,
    /// Overrides that were present but could not be applied
    #[serde(skip)]
    rejected_overrides: Vec<String>,
}

impl QrmintConfig {
    /// Load configuration from an explicit path or fall back to discovered defaults.
    ///
    /// Loading runs before logging is set up, so nothing is logged here; call
    /// [`QrmintConfig::log_load_notes`] once the subscriber is installed.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let source = match explicit_path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::discover_file()?,
        };

        let mut config = match &source {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.source = source;

        config.apply_overrides(&|name| env::var(name).ok());
        Ok(config)
    }

    /// Attempt to locate a configuration file in common locations.
    fn discover_file() -> Result<Option<PathBuf>> {
        let cwd =
            env::current_dir().map_err(|e| Error::Config(format!("Failed to read cwd: {e}")))?;
        let xdg_config = env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
        Ok(Self::discover_in(&cwd, xdg_config.as_deref()))
    }

    /// `qrmint.{toml,yaml,yml}` in `cwd` wins over `<xdg_config>/qrmint/config.{toml,yaml}`.
    fn discover_in(cwd: &Path, xdg_config: Option<&Path>) -> Option<PathBuf> {
        let local = ["qrmint.toml", "qrmint.yaml", "qrmint.yml"]
            .iter()
            .map(|candidate| cwd.join(candidate));
        let xdg = xdg_config
            .map(|base| base.join("qrmint"))
            .into_iter()
            .flat_map(|base| ["config.toml", "config.yaml"].map(|candidate| base.join(candidate)));

        local.chain(xdg).find(|path| path.exists())
    }

    /// Read configuration from a concrete file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
            .as_str()
        {
            "toml" => toml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse TOML {}: {e}", path.display()))
            }),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse YAML {}: {e}", path.display()))
            }),
            other => Err(Error::Config(format!(
                "Unsupported config format '{}', expected toml/yaml",
                other
            ))),
        }
    }

    /// Apply `QRMINT_*` overrides resolved through `lookup` (normally the process environment).
    ///
    /// Values that fail to parse are skipped and kept for [`QrmintConfig::rejected_overrides`].
    pub fn apply_overrides(&mut self, lookup: &dyn Fn(&str) -> Option<String>) {
        let mut env = EnvOverrides::new(lookup);
        self.qr.apply_overrides(&mut env);
        self.output.apply_overrides(&mut env);
        self.logging.apply_overrides(&mut env);
        self.rejected_overrides.extend(env.rejected);
    }

    /// File the configuration was read from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// `NAME=value: reason` for every override that was ignored
    pub fn rejected_overrides(&self) -> &[String] {
        &self.rejected_overrides
    }

    /// Log where the configuration came from and which overrides were ignored.
    pub fn log_load_notes(&self) {
        match &self.source {
            Some(path) => tracing::info!("Using configuration file: {}", path.display()),
            None => tracing::debug!("No qrmint.toml / qrmint.yaml found, using defaults"),
        }
        for rejected in &self.rejected_overrides {
            tracing::warn!("Ignoring environment override {rejected}");
        }
    }
}

/// Reads overrides through a lookup function and records the values it could not use.
struct EnvOverrides<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
    rejected: Vec<String>,
}

impl<'a> EnvOverrides<'a> {
    fn new(lookup: &'a dyn Fn(&str) -> Option<String>) -> Self {
        Self {
            lookup,
            rejected: Vec::new(),
        }
    }

    fn raw(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
    }

    fn reject(&mut self, name: &str, raw: &str, reason: impl fmt::Display) {
        self.rejected.push(format!("{name}={raw}: {reason}"));
    }

    fn parse<T>(&mut self, name: &str) -> Option<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let raw = self.raw(name)?;
        match raw.trim().parse::<T>() {
            Ok(value) => Some(value),
            Err(e) => {
                self.reject(name, &raw, e);
                None
            }
        }
    }

    fn flag(&mut self, name: &str) -> Option<bool> {
        let raw = self.raw(name)?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => Some(true),
            "0" | "false" | "off" | "no" => Some(false),
            _ => {
                self.reject(name, &raw, "expected true/false");
                None
            }
        }
    }
}

/// Payload and encoder settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QrOptions {
    /// Text to encode
    pub payload: String,
    /// Symbol version (1..=40); unset picks the smallest that fits
    pub version: Option<i16>,
    /// Error correction level
    pub error_correction: ErrorCorrection,
    /// Pixels per module side
    pub box_size: u32,
    /// Quiet zone width in modules
    pub border: u32,
    /// Allow growing past `version` when the payload does not fit
    pub fit: bool,
    /// Color of dark modules
    pub fill_color: Color,
    /// Color of light modules and the border
    pub back_color: Color,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            payload: DEFAULT_PAYLOAD.to_string(),
            version: None,
            error_correction: ErrorCorrection::L,
            box_size: 10,
            border: 4,
            fit: true,
            fill_color: Color::BLACK,
            back_color: Color::WHITE,
        }
    }
}

impl QrOptions {
    /// Payload to encode
    pub fn payload(&self) -> QrPayload {
        QrPayload::from_string(self.payload.clone())
    }

    fn apply_overrides(&mut self, env: &mut EnvOverrides<'_>) {
        if let Some(payload) = env.raw("QRMINT_PAYLOAD") {
            self.payload = payload;
        }
        if env
            .raw("QRMINT_VERSION")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("auto"))
        {
            self.version = None;
        } else if let Some(version) = env.parse::<i16>("QRMINT_VERSION") {
            self.version = Some(version);
        }
        if let Some(level) = env.parse::<ErrorCorrection>("QRMINT_ERROR_CORRECTION") {
            self.error_correction = level;
        }
        if let Some(size) = env.parse::<u32>("QRMINT_BOX_SIZE") {
            self.box_size = size;
        }
        if let Some(border) = env.parse::<u32>("QRMINT_BORDER") {
            self.border = border;
        }
        if let Some(fit) = env.flag("QRMINT_FIT") {
            self.fit = fit;
        }
        if let Some(color) = env.parse::<Color>("QRMINT_FILL_COLOR") {
            self.fill_color = color;
        }
        if let Some(color) = env.parse::<Color>("QRMINT_BACK_COLOR") {
            self.back_color = color;
        }
    }
}

/// Where and how the image is written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    /// Destination image path
    pub path: PathBuf,
    /// Image format name (`png`, `jpeg`, ...) overriding the path extension
    pub format: Option<String>,
    /// Decode the written file and compare it with the payload
    pub verify: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT),
            format: None,
            verify: false,
        }
    }
}

impl OutputOptions {
    fn apply_overrides(&mut self, env: &mut EnvOverrides<'_>) {
        if let Some(path) = env.raw("QRMINT_OUTPUT") {
            if !path.trim().is_empty() {
                self.path = PathBuf::from(path);
            }
        }
        if let Some(format) = env.raw("QRMINT_OUTPUT_FORMAT") {
            self.format = Some(format).filter(|f| !f.trim().is_empty());
        }
        if let Some(verify) = env.flag("QRMINT_VERIFY") {
            self.verify = verify;
        }
    }
}

/// Structured logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Default log level (overridable via `QRMINT_LOG_LEVEL`)
    pub level: String,
    /// Optional log file path for teeing structured logs
    pub file: Option<PathBuf>,
    /// Force ANSI colors in stderr logging
    pub color: bool,
    /// Optional log rotation strategy applied to `file`
    pub rotation: Option<LogRotation>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            color: true,
            rotation: None,
        }
    }
}

impl LoggingOptions {
    fn apply_overrides(&mut self, env: &mut EnvOverrides<'_>) {
        if let Some(level) = env.raw("QRMINT_LOG_LEVEL") {
            self.level = level;
        }
        if let Some(file) = env.raw("QRMINT_LOG_FILE") {
            self.file = Some(PathBuf::from(file)).filter(|f| !f.as_os_str().is_empty());
        }
        if let Some(color) = env.flag("QRMINT_LOG_COLOR") {
            self.color = color;
        }
        if let Some(rotation) = env.parse::<LogRotation>("QRMINT_LOG_ROTATION") {
            self.rotation = Some(rotation);
        }
    }
}

/// Supported log rotation policies for file sinks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// Rotate log files once per hour
    Hourly,
    /// Rotate log files once per day
    Daily,
}

impl FromStr for LogRotation {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            _ => Err(format!("unknown rotation '{value}', expected hourly or daily")),
        }
    }
}
