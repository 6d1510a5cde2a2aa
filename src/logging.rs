/// Structured logging for the battery health service.
///
/// Library code emits `tracing` events tagged with a `component` field.
/// Binaries call `init_logger` once to install a subscriber that writes to
/// the console and, optionally, appends to a log file.

use std::fmt;
use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::analysis::usage::Indeterminate;
use crate::model::AnalyticsError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Parses a level name as written in config files and env vars.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    fn directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// Which part of the pipeline an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Dataset,
    Estimator,
    Aggregator,
    Query,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Dataset => write!(f, "DATASET"),
            Component::Estimator => write!(f, "EST"),
            Component::Aggregator => write!(f, "AGG"),
            Component::Query => write!(f, "QUERY"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Subscriber setup
// ---------------------------------------------------------------------------

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `min_level` when set. With a `log_file`, events are
/// appended there (no ANSI colours) instead of going to stderr.
/// `console_timestamps = false` drops the time column from stderr output;
/// file output is always timestamped.
/// Returns an error if the file cannot be opened or a subscriber is
/// already installed.
pub fn init_logger(
    min_level: LogLevel,
    log_file: Option<&str>,
    console_timestamps: bool,
) -> Result<(), AnalyticsError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(min_level.directive()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match (log_file, console_timestamps) {
        (Some(path), _) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    AnalyticsError::Config(format!("cannot open log file {}: {}", path, e))
                })?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        (None, true) => builder.with_writer(std::io::stderr).try_init(),
        (None, false) => builder.without_time().with_writer(std::io::stderr).try_init(),
    };

    installed.map_err(|e| AnalyticsError::Config(format!("logger already initialised: {}", e)))
}

// ---------------------------------------------------------------------------
// Structured helpers
// ---------------------------------------------------------------------------

/// Records why a device ended up without a usage rate.
pub fn log_indeterminate(device_id: &str, reason: Indeterminate) {
    debug!(
        component = %Component::Estimator,
        device_id,
        reason = ?reason,
        "usage rate indeterminate"
    );
}

/// Logs a one-line fleet summary after a full analysis pass.
///
/// Severity follows the fleet state: info when nothing is unhealthy, warn
/// when some devices are, error when every device is.
pub fn log_analysis_summary(total: usize, healthy: usize, unhealthy: usize, unknown: usize) {
    let message = format!(
        "Analysis complete: {} devices, {} healthy, {} unhealthy, {} unknown",
        total, healthy, unhealthy, unknown
    );

    if unhealthy == 0 {
        info!(component = %Component::Query, "{}", message);
    } else if unhealthy == total {
        error!(component = %Component::Query, "{}", message);
    } else {
        warn!(component = %Component::Query, "{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_parse_accepts_common_spellings() {
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse(" info "), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse("warn"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::parse("warning"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::parse("error"), Some(LogLevel::Error));
        assert_eq!(LogLevel::parse("verbose"), None);
    }

    #[test]
    fn test_component_tags() {
        assert_eq!(Component::Dataset.to_string(), "DATASET");
        assert_eq!(Component::System.to_string(), "SYS");
    }

    #[test]
    fn test_helpers_do_not_panic_without_subscriber() {
        log_indeterminate("SN-1", Indeterminate::InsufficientReadings);
        log_analysis_summary(0, 0, 0, 0);
        log_analysis_summary(3, 1, 1, 1);
        log_analysis_summary(2, 0, 2, 0);
    }
}
