//! # Logging Utilities
//!
//! Logging infrastructure for regscope using `tracing`.
//!
//! This module provides structured logging with support for:
//! - Pretty (development) and JSON (production) output
//! - Environment variable configuration
//! - Optional file output with daily rotation
//! - A file-only mode for the terminal register view
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use regscope_utils::init_logging;
//!
//! // Keep the guard alive for as long as logs should be flushed to file
//! let _guard = init_logging().expect("Failed to initialize logging");
//! tracing::info!("regscope started");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: level filter (e.g. `RUST_LOG=debug`, `RUST_LOG=regscope_core=trace`)
//! - `REGSCOPE_LOG_FORMAT`: `json` or `pretty` (default: `pretty`)
//! - `REGSCOPE_LOG_FILE`: optional path of a log file, rotated daily

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, io};

use chrono::Utc;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::MakeWriter;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format.
pub const LOG_FORMAT_ENV: &str = "REGSCOPE_LOG_FORMAT";
/// Environment variable naming an optional log file.
pub const LOG_FILE_ENV: &str = "REGSCOPE_LOG_FILE";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default for development)
    #[default]
    Pretty,
    /// JSON format (default for production)
    Json,
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(format!("{s}. Use 'pretty' or 'json'"))),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    Info,
    /// Debug level
    Debug,
    /// Trace level (most verbose)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::InvalidLevel(format!(
                "{s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            ))),
        }
    }
}

/// Where log output goes and how it is filtered.
///
/// Filter priority:
/// 1. An explicit `level` (e.g. from a `--log-level` flag)
/// 2. `RUST_LOG`, which also accepts per-module directives
/// 3. `INFO`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig
{
    /// Explicit level overriding `RUST_LOG`
    pub level: Option<LogLevel>,
    /// Output format for every sink
    pub format: LogFormat,
    /// Whether to write to stderr
    pub console: bool,
    /// Optional log file
    pub file: Option<PathBuf>,
    /// Rotate the log file daily (otherwise append to a single file)
    pub rotate_daily: bool,
}

impl Default for LogConfig
{
    fn default() -> Self
    {
        Self {
            level: None,
            format: LogFormat::Pretty,
            console: true,
            file: None,
            rotate_daily: true,
        }
    }
}

impl LogConfig
{
    /// Build a configuration from `REGSCOPE_LOG_FORMAT` and `REGSCOPE_LOG_FILE`.
    ///
    /// An unparseable format falls back to pretty output.
    #[must_use]
    pub fn from_env() -> Self
    {
        let format = env::var(LOG_FORMAT_ENV)
            .ok()
            .and_then(|s| LogFormat::from_str(&s).ok())
            .unwrap_or_default();
        let file = env::var(LOG_FILE_ENV).ok().filter(|s| !s.is_empty()).map(PathBuf::from);

        Self {
            format,
            file,
            ..Self::default()
        }
    }

    /// Log only to `path`, never to the terminal.
    #[must_use]
    pub fn file_only(path: impl Into<PathBuf>) -> Self
    {
        Self {
            console: false,
            file: Some(path.into()),
            rotate_daily: false,
            ..Self::default()
        }
    }

    /// Override the level filter.
    #[must_use]
    pub fn with_level(mut self, level: Option<LogLevel>) -> Self
    {
        if level.is_some() {
            self.level = level;
        }
        self
    }

    /// Override the output format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self
    {
        self.format = format;
        self
    }

    fn env_filter(&self) -> EnvFilter
    {
        if let Some(level) = self.level {
            return EnvFilter::new(Level::from(level).to_string());
        }
        match env::var("RUST_LOG") {
            Ok(rust_log) => EnvFilter::try_new(&rust_log).unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string())),
            Err(_) => EnvFilter::new(Level::INFO.to_string()),
        }
    }
}

/// Keeps the background file writer alive.
///
/// Dropping the guard flushes and stops file logging, so hold on to it for the
/// lifetime of the program.
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug, Default)]
pub struct LoggingGuard
{
    _file: Option<WorkerGuard>,
}

/// Initialize logging with default settings
///
/// Reads configuration from `RUST_LOG`, `REGSCOPE_LOG_FORMAT` and
/// `REGSCOPE_LOG_FILE`.
///
/// ## Errors
///
/// Returns an error if logging is already initialized or the log file cannot
/// be opened.
pub fn init_logging() -> Result<LoggingGuard, LoggingError>
{
    init_with(&LogConfig::from_env())
}

/// Initialize logging with explicit level and format
///
/// ## Example
///
/// ```rust,no_run
/// use regscope_utils::{LogFormat, LogLevel, init_logging_with_level};
///
/// let _guard = init_logging_with_level(LogLevel::Debug, LogFormat::Pretty)
///     .expect("Failed to initialize logging");
/// ```
///
/// ## Errors
///
/// Returns an error if logging is already initialized or file logging fails.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<LoggingGuard, LoggingError>
{
    init_with(&LogConfig::from_env().with_level(Some(level)).with_format(format))
}

/// Initialize logging for the terminal register view (file-only, no stderr)
///
/// Writing to the terminal would corrupt the alternate screen, so logs go to
/// `~/.regscope/YYYY-MM-DD-regscope-view.log`, or the same name under the
/// system temp directory when `HOME` is not set.
///
/// ## Errors
///
/// Returns an error if logging is already initialized or the log directory
/// cannot be created.
pub fn init_logging_for_tui(level: Option<LogLevel>) -> Result<(PathBuf, LoggingGuard), LoggingError>
{
    let today = Utc::now().format("%Y-%m-%d");
    let file_name = format!("{today}-regscope-view.log");
    let log_file = if let Ok(home) = env::var("HOME") {
        let dir = PathBuf::from(home).join(".regscope");
        std::fs::create_dir_all(&dir).map_err(LoggingError::FileError)?;
        dir.join(file_name)
    } else {
        env::temp_dir().join(file_name)
    };

    let guard = init_with(&LogConfig::file_only(&log_file).with_level(level))?;
    Ok((log_file, guard))
}

/// Install a global subscriber built from `config`.
///
/// ## Errors
///
/// - [`LoggingError::InitializationFailed`] if a global subscriber is already set
/// - [`LoggingError::FileError`] if the log file's directory cannot be created
pub fn init_with(config: &LogConfig) -> Result<LoggingGuard, LoggingError>
{
    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut guard = LoggingGuard::default();

    if config.console {
        layers.push(fmt_layer(config.format, io::stderr, true).with_filter(config.env_filter()).boxed());
    }

    if let Some(path) = &config.file {
        let (directory, file_name) = split_log_path(path)?;
        std::fs::create_dir_all(&directory)?;
        let appender = if config.rotate_daily {
            tracing_appender::rolling::daily(directory, file_name)
        } else {
            tracing_appender::rolling::never(directory, file_name)
        };
        let (writer, worker) = tracing_appender::non_blocking(appender);
        guard._file = Some(worker);
        // No ANSI in files
        layers.push(fmt_layer(config.format, writer, false).with_filter(config.env_filter()).boxed());
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;

    Ok(guard)
}

fn fmt_layer<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(writer);

    match format {
        LogFormat::Pretty => layer.with_ansi(ansi).boxed(),
        LogFormat::Json => layer.json().with_current_span(true).with_span_list(true).boxed(),
    }
}

fn split_log_path(path: &Path) -> Result<(PathBuf, PathBuf), LoggingError>
{
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::InvalidFile(path.display().to_string()))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((directory, PathBuf::from(file_name)))
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    /// Invalid log level
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// Log file path has no file name component
    #[error("Invalid log file path: {0}")]
    InvalidFile(String),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}
