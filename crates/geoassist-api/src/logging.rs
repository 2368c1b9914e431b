//! Logging configuration for GeoAssist
//!
//! Events are emitted through `tracing` under these targets:
//!
//! | target                  | level   | events                                   |
//! |-------------------------|---------|------------------------------------------|
//! | `geoassist_wal`         | `debug` | manager bound to a file, every record    |
//! | `geoassist_wal::writer` | `debug` | bytes appended, log directory created    |
//! | `geoassist_wal::replay` | `info`  | start and totals of each replayed file   |
//! | `geoassist_wal::replay` | `warn`  | records skipped during lenient replay    |
//! | `geoassist::durable`    | `info`  | recovery summary when an index is opened |
//!
//! `RUST_LOG=geoassist_wal=debug` traces every append, while
//! `RUST_LOG=warn,geoassist_wal::replay=warn` keeps only skipped records.
//! The same directives can be given to [`LogConfig::with_level`] or built
//! with [`LogConfig::with_target`].

use geoassist_core::{Error, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::{Layered, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Target of append events from the WAL manager
pub const WAL_TARGET: &str = "geoassist_wal";
/// Target of replay progress and skipped-record warnings
pub const REPLAY_TARGET: &str = "geoassist_wal::replay";
/// Target of the recovery summary logged by `DurableIndex`
pub const RECOVERY_TARGET: &str = "geoassist::durable";

const DEFAULT_LOG_FILE: &str = "geoassist.log";

type BoxedLayer = Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync>;

/// Where log lines go
#[derive(Debug, Clone)]
pub enum LogOutput {
    Stdout,
    /// Daily-rotated file; the date is appended to the file name
    File(PathBuf),
    Both(PathBuf),
}

impl LogOutput {
    fn to_stdout(&self) -> bool {
        matches!(self, LogOutput::Stdout | LogOutput::Both(_))
    }

    fn file(&self) -> Option<&Path> {
        match self {
            LogOutput::Stdout => None,
            LogOutput::File(path) | LogOutput::Both(path) => Some(path),
        }
    }
}

/// Log format style
#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    /// Human-readable multi-line format (default)
    Pretty,
    /// Compact single-line format
    Compact,
}

impl LogFormat {
    fn layer<W>(self, writer: W, ansi: bool) -> BoxedLayer
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let layer = fmt::layer().with_writer(writer).with_ansi(ansi);
        match self {
            LogFormat::Pretty => layer.pretty().boxed(),
            LogFormat::Compact => layer.compact().boxed(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter directives in `EnvFilter` syntax, e.g. `info,geoassist_wal=debug`
    pub level: String,
    pub output: LogOutput,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: LogOutput::Stdout,
            format: LogFormat::Pretty,
        }
    }
}

impl LogConfig {
    /// Replay summaries and recovery, no per-record events
    pub fn info() -> Self {
        Self::default()
    }

    /// Every WAL append and file creation
    pub fn debug() -> Self {
        Self::default().with_level("debug")
    }

    /// Only skipped records and failures
    pub fn warn() -> Self {
        Self::default().with_level("warn")
    }

    pub fn with_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::File(path.into());
        self
    }

    pub fn with_both<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::Both(path.into());
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Replace the filter directives
    pub fn with_level<S: Into<String>>(mut self, level: S) -> Self {
        self.level = level.into();
        self
    }

    /// Add a per-target directive on top of the current filter
    ///
    /// ```
    /// use geoassist::logging::{LogConfig, WAL_TARGET};
    ///
    /// let config = LogConfig::warn().with_target(WAL_TARGET, "debug");
    /// assert_eq!(config.level, "warn,geoassist_wal=debug");
    /// ```
    pub fn with_target(mut self, target: &str, level: &str) -> Self {
        self.level = format!("{},{}={}", self.level, target, level);
        self
    }

    /// Install this configuration as the global subscriber
    ///
    /// `RUST_LOG` takes precedence over the configured filter. When logging
    /// to a file the returned guard must be kept alive; dropping it stops
    /// the background writer. ANSI colours are only written to stdout.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use geoassist::logging::LogConfig;
    ///
    /// let _guard = LogConfig::info().init()?;
    /// # Ok::<(), geoassist::Error>(())
    /// ```
    pub fn init(self) -> Result<Option<WorkerGuard>> {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => parse_filter(&self.level)?,
        };

        let mut layers: Vec<BoxedLayer> = Vec::new();
        let mut guard = None;
        if self.output.to_stdout() {
            layers.push(self.format.layer(std::io::stdout, true));
        }
        if let Some(path) = self.output.file() {
            let (writer, file_guard) = tracing_appender::non_blocking(file_appender(path));
            layers.push(self.format.layer(writer, false));
            guard = Some(file_guard);
        }

        tracing_subscriber::registry()
            .with(filter)
            .with(layers)
            .try_init()
            .map_err(|e| Error::InvalidOperation(format!("Failed to install logger: {}", e)))?;
        Ok(guard)
    }
}

fn parse_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives).map_err(|e| {
        Error::InvalidOperation(format!("Invalid log filter '{}': {}", directives, e))
    })
}

fn file_appender(path: &Path) -> tracing_appender::rolling::RollingFileAppender {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_LOG_FILE);
    tracing_appender::rolling::daily(dir, name)
}
