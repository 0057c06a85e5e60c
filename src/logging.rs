//! Subscriber setup for applications embedding stridestats
//!
//! Analysis code only emits `tracing` events: debug for each computed metric,
//! warn when a metric degrades (normalized power on a too-short series) or a
//! config file cannot be read. [`init_logging`] routes those events to the
//! console and, optionally, to a JSON log file.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::error::StrideError;

const CRATE_TARGET: &str = "stridestats";
const DEFAULT_LOG_FILE: &str = "stridestats.log";

/// Where analysis events go and how verbose they are
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    /// Per-module overrides, keyed by module path below the crate
    /// (`moving = "trace"` enables `stridestats::moving=trace`)
    pub modules: BTreeMap<String, LogLevel>,
    pub file: Option<LogFile>,
    /// Emit an event when instrumented calculations such as reports start and finish
    pub span_events: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            modules: BTreeMap::new(),
            file: None,
            span_events: false,
        }
    }
}

/// JSON log file written next to console output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogFile {
    pub path: PathBuf,
    #[serde(default)]
    pub rotation: LogRotation,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Never,
    Hourly,
    #[default]
    Daily,
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Never => Rotation::NEVER,
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Daily => Rotation::DAILY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = StrideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level: Level = s
            .trim()
            .parse()
            .map_err(|_| StrideError::Configuration(format!("Unknown log level: {}", s)))?;
        Ok(match level {
            Level::ERROR => LogLevel::Error,
            Level::WARN => LogLevel::Warn,
            Level::INFO => LogLevel::Info,
            Level::DEBUG => LogLevel::Debug,
            _ => LogLevel::Trace,
        })
    }
}

/// Console output style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    /// One JSON object per event
    Json,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = StrideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(StrideError::Configuration(format!(
                "Unknown log format: {}",
                s
            ))),
        }
    }
}

impl LogConfig {
    /// Filter directives used when `RUST_LOG` is not set
    pub fn directives(&self) -> String {
        std::iter::once(format!("{}={}", CRATE_TARGET, self.level))
            .chain(
                self.modules
                    .iter()
                    .map(|(module, level)| format!("{}::{}={}", CRATE_TARGET, module, level)),
            )
            .collect::<Vec<_>>()
            .join(",")
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

impl LogFile {
    fn appender(&self) -> anyhow::Result<RollingFileAppender> {
        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(directory)
            .with_context(|| format!("Failed to create log directory: {}", directory.display()))?;

        let file_name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(DEFAULT_LOG_FILE);
        RollingFileAppender::builder()
            .rotation(self.rotation.into())
            .filename_prefix(file_name)
            .build(directory)
            .with_context(|| format!("Failed to open log file: {}", self.path.display()))
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.directives())
            .with_context(|| format!("Invalid log directives: {}", config.directives()))?,
    };

    let console = match config.format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_span_events(config.span_events())
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_span_events(config.span_events())
            .with_current_span(config.span_events)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_span_events(config.span_events())
            .boxed(),
    };

    let file = match &config.file {
        Some(file) => Some(
            tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(file.appender()?)
                .with_current_span(config.span_events),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .context("Failed to install logging subscriber")?;

    tracing::debug!(
        directives = %config.directives(),
        format = ?config.format,
        file = ?config.file.as_ref().map(|f| &f.path),
        "Logging initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("error".parse::<LogLevel>().unwrap(), LogLevel::Error);
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!(" debug ".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert!(matches!(
            "verbose".parse::<LogLevel>(),
            Err(StrideError::Configuration(_))
        ));
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
        assert!(LogLevel::Warn < LogLevel::Debug);
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_directives_include_module_overrides() {
        let mut config = LogConfig {
            level: LogLevel::Warn,
            ..Default::default()
        };
        assert_eq!(config.directives(), "stridestats=warn");

        config.modules.insert("moving".to_string(), LogLevel::Trace);
        config.modules.insert("metrics".to_string(), LogLevel::Debug);
        assert_eq!(
            config.directives(),
            "stridestats=warn,stridestats::metrics=debug,stridestats::moving=trace"
        );
        assert!(EnvFilter::try_new(config.directives()).is_ok());
    }

    #[test]
    fn test_log_config_toml() {
        let config: LogConfig = toml::from_str(
            r#"
            level = "debug"

            [modules]
            moving = "trace"

            [file]
            path = "logs/analysis.log"
            "#,
        )
        .unwrap();
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.modules.get("moving"), Some(&LogLevel::Trace));

        let file = config.file.unwrap();
        assert_eq!(file.path, PathBuf::from("logs/analysis.log"));
        assert_eq!(file.rotation, LogRotation::Daily);
    }

    #[test]
    fn test_second_init_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            format: LogFormat::Compact,
            file: Some(LogFile {
                path: temp_dir.path().join("logs").join("stridestats.log"),
                rotation: LogRotation::Never,
            }),
            ..Default::default()
        };

        // Whichever call installs the subscriber, the other must fail cleanly
        let first = init_logging(&config);
        let second = init_logging(&config);
        assert!(first.is_err() || second.is_err());
        assert!(temp_dir.path().join("logs").exists());
    }
}
