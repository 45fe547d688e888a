//! Logging infrastructure for gitnoob.
//!
//! Logging is off unless a level is requested. When enabled, diagnostics go
//! to stderr or a file, as text or JSON, and only the `gitnoob` target is
//! recorded.

use std::path::PathBuf;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Log level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Configuration for the logging system.
#[derive(Debug, Default, PartialEq)]
pub struct LogConfig {
    /// Log level (None means logging is disabled).
    pub level: Option<LogLevel>,
    /// Output file path (None means stderr).
    pub file: Option<PathBuf>,
    pub format: LogFormat,
}

/// Keeps the background writer alive. Pending lines are flushed on drop,
/// so hold this until the process exits.
pub struct LogGuard {
    _guard: WorkerGuard,
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn build_layer(writer: NonBlocking, format: LogFormat, to_file: bool) -> BoxedLayer {
    match format {
        LogFormat::Json => fmt::layer()
            .with_writer(writer)
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_file(to_file)
            .with_line_number(to_file)
            .boxed(),
        LogFormat::Text if to_file => fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Text => fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .compact()
            .boxed(),
    }
}

/// Initialize the logging system.
///
/// Returns `None` when logging is disabled or the log file cannot be opened.
///
/// # Example
///
/// ```rust,no_run
/// use gitnoob::logging::{LogConfig, LogLevel, LogFormat, init_logging};
/// use std::path::PathBuf;
///
/// let config = LogConfig {
///     level: Some(LogLevel::Debug),
///     file: Some(PathBuf::from("/tmp/gitnoob.log")),
///     format: LogFormat::Text,
/// };
///
/// let _guard = init_logging(config);
/// ```
#[must_use = "the returned guard must be held until application exit"]
pub fn init_logging(config: LogConfig) -> Option<LogGuard> {
    let level = config.level?;
    let filter = EnvFilter::new(format!("gitnoob={}", level.as_filter_str()));

    let (writer, guard) = match &config.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()?;
            tracing_appender::non_blocking(file)
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::registry()
        .with(build_layer(writer, config.format, config.file.is_some()))
        .with(filter)
        .init();

    Some(LogGuard { _guard: guard })
}

/// Reads logging options straight from argv and the environment, before clap
/// runs, so parse errors can be logged too.
///
/// Precedence: CLI args > environment variables. `-v`/`--verbose` implies
/// `debug` when no level is given.
#[must_use]
pub fn parse_early_log_config(args: &[String]) -> LogConfig {
    let level = extract_arg_value(args, "--log-level")
        .or_else(|| std::env::var("GITNOOB_LOG_LEVEL").ok())
        .and_then(|s| LogLevel::parse(&s));
    let verbose = args.iter().any(|a| a == "-v" || a == "--verbose");

    LogConfig {
        level: level.or(verbose.then_some(LogLevel::Debug)),
        file: extract_arg_value(args, "--log-file")
            .or_else(|| std::env::var("GITNOOB_LOG_FILE").ok())
            .map(PathBuf::from),
        format: extract_arg_value(args, "--log-format")
            .or_else(|| std::env::var("GITNOOB_LOG_FORMAT").ok())
            .and_then(|s| LogFormat::parse(&s))
            .unwrap_or_default(),
    }
}

/// Value of `flag` given as `flag value` or `flag=value`.
fn extract_arg_value(args: &[String], flag: &str) -> Option<String> {
    let inline = format!("{flag}=");
    args.iter().enumerate().find_map(|(i, arg)| {
        if arg == flag {
            args.get(i + 1).cloned()
        } else {
            arg.strip_prefix(&inline).map(str::to_string)
        }
    })
}
