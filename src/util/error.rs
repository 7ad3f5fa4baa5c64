// McNotify - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.
//
// Only config errors and a failed sink readiness check are fatal (at
// startup). State errors are logged and swallowed by the tailer; per-event
// delivery errors by the delivery worker.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all McNotify operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum NotifierError {
    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// A notification could not be delivered.
    Delivery(DeliveryError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for NotifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Delivery(e) => write!(f, "Delivery error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for NotifierError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Delivery(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// JSON parsing failed (`.json` config files).
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A required field is missing or blank.
    MissingField { field: &'static str },

    /// A required config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::JsonParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::MissingField { field } => {
                write!(f, "Config is missing required field '{field}'")
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::JsonParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for NotifierError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// State errors
// ---------------------------------------------------------------------------

/// Errors related to persisting the tail state file.
#[derive(Debug)]
pub enum StateError {
    /// I/O error creating, writing, or renaming the state file.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },

    /// The state could not be serialised.
    Serialise { source: serde_json::Error },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "cannot {operation} state file '{}': {source}",
                path.display()
            ),
            Self::Serialise { source } => write!(f, "failed to serialise tail state: {source}"),
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serialise { source } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Delivery errors
// ---------------------------------------------------------------------------

/// Errors related to pushing a notification to the sink.
#[derive(Debug)]
pub enum DeliveryError {
    /// The HTTP request could not be completed (DNS, connect, timeout).
    Http { source: reqwest::Error },

    /// The remote service answered with a non-success status.
    Rejected { status: u16, body: String },

    /// Sink-specific failure with no underlying error value.
    Sink { reason: String },
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http { source } => write!(f, "HTTP request failed: {source}"),
            Self::Rejected { status, body } => {
                write!(f, "rejected with HTTP {status}: {body}")
            }
            Self::Sink { reason } => write!(f, "{reason}"),
        }
    }
}

impl std::error::Error for DeliveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http { source } => Some(source),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DeliveryError {
    fn from(source: reqwest::Error) -> Self {
        Self::Http { source }
    }
}

impl From<DeliveryError> for NotifierError {
    fn from(e: DeliveryError) -> Self {
        Self::Delivery(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    /// Wrapping must keep the source chain reachable for diagnostics.
    #[test]
    fn test_config_error_chain_preserved() {
        let inner = ConfigError::Io {
            path: PathBuf::from("config.toml"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        let err: NotifierError = inner.into();
        let msg = err.to_string();
        assert!(msg.starts_with("Configuration error:"), "got: {msg}");
        assert!(msg.contains("config.toml"));

        let source = err.source().expect("config source");
        assert!(source.source().is_some(), "io error must be chained");
    }

    #[test]
    fn test_rejected_display_contains_status() {
        let err = DeliveryError::Rejected {
            status: 403,
            body: "Missing Access".to_string(),
        };
        assert_eq!(err.to_string(), "rejected with HTTP 403: Missing Access");
        assert!(err.source().is_none());
    }
}
