//! Structured logging initialisation.
//!
//! Components log through `tracing`; the host process decides where the
//! events go by calling [`init_logging`] once at start-up.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LoggerFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl LoggerFormat {
    /// Returns the canonical name of the format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

impl FromStr for LoggerFormat {
    type Err = LoggerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(LoggerError::InvalidFormat(value.to_owned())),
        }
    }
}

impl TryFrom<String> for LoggerFormat {
    type Error = LoggerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LoggerFormat> for String {
    fn from(value: LoggerFormat) -> Self {
        value.as_str().to_owned()
    }
}

/// Logger settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Output format.
    pub format: LoggerFormat,
    /// `EnvFilter` directive, e.g. `info` or `atrium=debug,warn`.
    pub level: String,
    /// Include event targets in the output.
    pub with_targets: bool,
    /// Emit ANSI colours in text output.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::Text,
            level: "info".to_owned(),
            with_targets: true,
            use_color: false,
        }
    }
}

/// Errors raised while installing the global subscriber.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoggerError {
    /// The format name is not `text` or `json`.
    #[error("invalid logger format: {0} (expected: text|json)")]
    InvalidFormat(String),
    /// The filter directive could not be parsed.
    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),
    /// A global subscriber is already installed.
    #[error("logger has already been initialised")]
    AlreadyInitialized,
    /// The subscriber could not be installed.
    #[error("failed to initialise logger: {0}")]
    InitializationFailed(String),
}

/// Installs the global `tracing` subscriber described by `config`.
///
/// # Errors
///
/// Returns [`LoggerError::InvalidLogLevel`] for a bad filter directive and
/// [`LoggerError::AlreadyInitialized`] when a subscriber is already set.
pub fn init_logging(config: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|_| LoggerError::InvalidLogLevel(config.level.clone()))?;
    if tracing::dispatcher::has_been_set() {
        return Err(LoggerError::AlreadyInitialized);
    }
    match config.format {
        LoggerFormat::Text => {
            let layer = fmt::layer()
                .with_ansi(config.use_color)
                .with_target(config.with_targets);
            install(tracing_subscriber::registry().with(filter).with(layer))
        }
        LoggerFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(config.with_targets);
            install(tracing_subscriber::registry().with(filter).with(layer))
        }
    }
}

fn install<S>(subscriber: S) -> Result<(), LoggerError>
where
    S: Subscriber + Send + Sync + 'static,
{
    subscriber.try_init().map_err(|err| {
        if tracing::dispatcher::has_been_set() {
            LoggerError::AlreadyInitialized
        } else {
            LoggerError::InitializationFailed(err.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{LoggerConfig, LoggerError, LoggerFormat, init_logging};
    use rstest::rstest;

    #[rstest]
    #[case("text", LoggerFormat::Text)]
    #[case(" JSON ", LoggerFormat::Json)]
    fn format_parses_case_insensitively(#[case] raw: &str, #[case] expected: LoggerFormat) {
        assert_eq!(raw.parse::<LoggerFormat>(), Ok(expected));
    }

    #[rstest]
    fn unknown_format_is_rejected() {
        assert_eq!(
            "journald".parse::<LoggerFormat>(),
            Err(LoggerError::InvalidFormat("journald".to_owned()))
        );
    }

    #[rstest]
    fn invalid_filter_is_rejected_before_install() {
        let config = LoggerConfig {
            level: "atrium=notalevel".to_owned(),
            ..LoggerConfig::default()
        };
        assert_eq!(
            init_logging(&config),
            Err(LoggerError::InvalidLogLevel("atrium=notalevel".to_owned()))
        );
    }

    #[rstest]
    fn second_initialisation_is_reported() {
        let config = LoggerConfig::default();
        // The first call may lose to another test in the same binary.
        let _first = init_logging(&config);
        assert_eq!(init_logging(&config), Err(LoggerError::AlreadyInitialized));
    }

    #[rstest]
    fn config_deserialises_with_defaults() -> eyre::Result<()> {
        let config: LoggerConfig = serde_json::from_str(r#"{"format": "json"}"#)?;
        eyre::ensure!(config.format == LoggerFormat::Json);
        eyre::ensure!(config.level == "info");
        Ok(())
    }
}
