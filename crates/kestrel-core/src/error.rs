//! Error types and handling for lint and correction runs

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Kestrel operations
#[derive(Debug, Error)]
pub enum KestrelError {
    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Two rules registered under the same identifier
    #[error("Duplicate rule identifier '{rule_id}'")]
    DuplicateRule { rule_id: String },

    /// A rule identifier that no registered rule carries
    #[error("Unknown rule '{rule_id}'")]
    UnknownRule { rule_id: String },

    /// Rule matching, rewriting or option errors
    #[error("Rule error in '{rule_id}': {message}")]
    RuleError { rule_id: String, message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Registry,
    Rule,
    Io,
    Internal,
}

impl KestrelError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            KestrelError::ConfigError { .. } => ErrorKind::Config,
            KestrelError::DuplicateRule { .. } | KestrelError::UnknownRule { .. } => {
                ErrorKind::Registry
            }
            KestrelError::RuleError { .. } => ErrorKind::Rule,
            KestrelError::IoError { .. } => ErrorKind::Io,
            KestrelError::InternalError { .. } => ErrorKind::Internal,
        }
    }

    /// Whether a run can skip the failing site or file and keep going
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Rule | ErrorKind::Io)
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn duplicate_rule(rule_id: impl Into<String>) -> Self {
        Self::DuplicateRule {
            rule_id: rule_id.into(),
        }
    }

    pub fn unknown_rule(rule_id: impl Into<String>) -> Self {
        Self::UnknownRule {
            rule_id: rule_id.into(),
        }
    }

    pub fn rule_error(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RuleError {
            rule_id: rule_id.into(),
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for KestrelError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}
