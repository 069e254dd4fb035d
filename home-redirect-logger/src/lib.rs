//! Console and daily-rolling file logging on top of `tracing-subscriber`.
//!
//! `RUST_LOG`, when set, takes precedence over the configured level.

use log::error;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, time::ChronoLocal},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const DEFAULT_LEVEL: &str = "info";
const DEFAULT_FILE_PREFIX: &str = "home-redirect.log";
const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("Logger already initialized: {0}")]
    Init(#[from] TryInitError),
}

/// `logging` section of the settings file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `EnvFilter` directives, e.g. `info,home_redirect_core=debug`.
    pub level: String,
    /// chrono strftime format for timestamps.
    pub time_format: String,
    pub console: bool,
    /// File output is off unless this section is present.
    pub file: Option<FileLogSettings>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            console: true,
            file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileLogSettings {
    pub dir: PathBuf,
    /// Rolled files are named `<prefix>.<date>`.
    #[serde(default = "default_file_prefix")]
    pub prefix: String,
    /// Newest files to keep; unset keeps everything.
    #[serde(default)]
    pub max_files: Option<usize>,
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

fn default_file_prefix() -> String {
    DEFAULT_FILE_PREFIX.to_string()
}

fn default_cleanup_interval_secs() -> u64 {
    DEFAULT_CLEANUP_INTERVAL_SECS
}

impl FileLogSettings {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: default_file_prefix(),
            max_files: None,
            cleanup_interval_secs: DEFAULT_CLEANUP_INTERVAL_SECS,
        }
    }
}

/// Install the global subscriber.
///
/// Keep the returned guard alive for the lifetime of the process, otherwise
/// buffered file output is lost.
pub fn init(settings: &LogSettings) -> Result<Option<WorkerGuard>, LoggerError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.level)?,
    };

    let console_layer = build_console_layer(settings);
    let (file_layer, guard) = match &settings.file {
        Some(file) => {
            let (layer, guard) = build_file_layer(file, &settings.time_format);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    Registry::default()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    if let Some(file) = &settings.file {
        spawn_cleanup_task(file);
    }

    Ok(guard)
}

fn build_console_layer<S>(settings: &LogSettings) -> Option<impl Layer<S>>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    settings.console.then(|| {
        fmt::layer()
            .with_timer(ChronoLocal::new(settings.time_format.clone()))
            .with_writer(std::io::stdout)
    })
}

fn build_file_layer<S>(file: &FileLogSettings, time_format: &str) -> (impl Layer<S>, WorkerGuard)
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let appender = tracing_appender::rolling::daily(&file.dir, &file.prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let layer = fmt::layer()
        .with_timer(ChronoLocal::new(time_format.to_string()))
        .with_ansi(false)
        .with_writer(non_blocking);

    (layer, guard)
}

fn spawn_cleanup_task(file: &FileLogSettings) {
    let Some(max_files) = file.max_files else {
        return;
    };
    let dir = file.dir.clone();
    let prefix = file.prefix.clone();
    let interval = Duration::from_secs(file.cleanup_interval_secs.max(1));

    std::thread::spawn(move || {
        loop {
            cleanup_old_logs(&dir, &prefix, max_files);
            std::thread::sleep(interval);
        }
    });
}

/// Delete all but the newest `max_files` files starting with `file_prefix`.
///
/// Relies on the date suffix sorting lexically, as `tracing-appender` names
/// them (`app.log.2024-01-31`).
pub fn cleanup_old_logs(log_dir: &Path, file_prefix: &str, max_files: usize) {
    if !log_dir.exists() {
        return;
    }

    let read_dir = match std::fs::read_dir(log_dir) {
        Ok(dir) => dir,
        Err(e) => {
            error!("Failed to read log directory: {}", e);
            return;
        }
    };

    let mut log_files: Vec<_> = read_dir
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let file_name = entry.file_name().into_string().ok()?;
            file_name.starts_with(file_prefix).then_some((entry, file_name))
        })
        .collect();

    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    for (entry, _) in log_files.iter().skip(max_files) {
        if let Err(e) = std::fs::remove_file(entry.path()) {
            error!("Failed to remove old log file {:?}: {}", entry.path(), e);
        }
    }
}
