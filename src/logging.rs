//! Logging utilities wrapping `tracing` initialisation

use crate::config::{LogRotation, LoggingOptions};
use crate::error::{Error, Result};
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::OnceLock;
use tracing::Subscriber;
use tracing_appender::non_blocking::{self, NonBlocking, WorkerGuard};
use tracing_appender::rolling;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

type LayeredEnvFilter = Layered<EnvFilter, Registry>;
type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Initialise the global tracing subscriber according to the provided logging options.
///
/// Logs go to stderr so that stdout only carries the generation report.
/// Subsequent calls are ignored to avoid reinitialisation panics.
pub fn init(options: &LoggingOptions) -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter = env_filter(options)?;

    let file = file_writer(options)?;
    let file_layer: Option<BoxedLayer<LayeredEnvFilter>> = file.map(|writer| {
        fmt::layer()
            .with_timer(UtcTime::rfc_3339())
            .with_ansi(false)
            .with_writer(writer)
            .with_target(true)
            .with_level(true)
            .boxed()
    });

    Registry::default()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer::<_>(options.color))
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to install tracing subscriber: {e}")))
}

fn env_filter(options: &LoggingOptions) -> Result<EnvFilter> {
    let level = std::env::var("QRMINT_LOG_LEVEL").unwrap_or_else(|_| options.level.clone());
    EnvFilter::try_new(level.as_str())
        .map_err(|e| Error::Config(format!("Invalid log level '{level}': {e}")))
}

/// Directory that holds `path`, created if missing.
fn ensure_log_dir(path: &Path) -> Result<&Path> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| {
        Error::Config(format!(
            "Failed to create log directory {}: {e}",
            dir.display()
        ))
    })?;
    Ok(dir)
}

fn file_writer(options: &LoggingOptions) -> Result<Option<NonBlocking>> {
    let Some(path) = options.file.as_ref() else {
        return Ok(None);
    };

    let dir = ensure_log_dir(path)?;

    let (writer, guard) = match options.rotation {
        Some(rotation) => {
            let file_name = path.file_name().ok_or_else(|| {
                Error::Config(format!(
                    "Log file path '{}' must include a filename when rotation is enabled",
                    path.display()
                ))
            })?;

            let appender = match rotation {
                LogRotation::Hourly => rolling::hourly(dir, file_name),
                LogRotation::Daily => rolling::daily(dir, file_name),
            };

            non_blocking::NonBlockingBuilder::default()
                .lossy(false)
                .finish(appender)
        }
        None => {
            let file = OpenOptions::new()
                .append(true)
                .create(true)
                .open(path)
                .map_err(|e| {
                    Error::Config(format!("Failed to open log file {}: {e}", path.display()))
                })?;

            non_blocking::NonBlockingBuilder::default()
                .lossy(false)
                .finish(file)
        }
    };
    // Keeps the background writer thread alive for the life of the process.
    let _ = FILE_GUARD.set(guard);

    Ok(Some(writer))
}

fn stderr_layer<S>(color: bool) -> BoxedLayer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span> + Send + Sync + 'static,
{
    fmt::layer()
        .with_timer(UtcTime::rfc_3339())
        .with_writer(io::stderr)
        .with_ansi(color)
        .with_target(true)
        .with_level(true)
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_is_config_error() {
        let options = LoggingOptions {
            level: "qrmint=notalevel".to_string(),
            ..LoggingOptions::default()
        };
        if std::env::var("QRMINT_LOG_LEVEL").is_err() {
            assert!(matches!(env_filter(&options), Err(Error::Config(_))));
        }
    }

    #[test]
    fn test_log_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/logs/qrmint.log");

        let created = ensure_log_dir(&path).unwrap();
        assert!(created.is_dir());
        assert_eq!(created, dir.path().join("nested/logs"));
    }

    #[test]
    fn test_bare_file_name_uses_cwd() {
        assert_eq!(ensure_log_dir(Path::new("qrmint.log")).unwrap(), Path::new("."));
    }
}
