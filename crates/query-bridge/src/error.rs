//! Error types for query translation

use std::fmt;
use thiserror::Error;

/// Which half of a dialect adapter was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterDirection {
    /// Dialect text into IR
    Parse,
    /// IR into dialect text
    Render,
}

impl fmt::Display for AdapterDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterDirection::Parse => f.write_str("parsing into the IR"),
            AdapterDirection::Render => f.write_str("rendering from the IR"),
        }
    }
}

/// Query translation error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Source text does not match the dialect's call grammar
    #[error("Invalid query format: {message}")]
    Format { message: String },

    /// Method is known lexically but not supported by the adapter
    #[error("Unsupported {dialect} method: {method}")]
    UnsupportedMethod {
        /// Display name of the rejecting dialect
        dialect: &'static str,
        /// Offending token (source side) or IR method kind (target side)
        method: String,
    },

    /// Adapter has no implementation for the requested direction
    #[error("{dialect} adapter does not support {direction}")]
    UnimplementedAdapter {
        dialect: &'static str,
        direction: AdapterDirection,
    },

    /// IR condition the target dialect cannot express
    #[error("Invalid condition on '{field}': {reason}")]
    InvalidCondition { field: String, reason: String },

    /// Dialect name not present in the registry
    #[error("Unknown dialect '{name}' (available: {})", .available.join(", "))]
    UnknownDialect {
        name: String,
        available: Vec<&'static str>,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for query translation
pub type Result<T> = std::result::Result<T, QueryError>;

impl QueryError {
    /// Create a format error
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Create an invalid condition error
    pub fn invalid_condition(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCondition {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an unimplemented adapter error
    pub fn unimplemented(dialect: &'static str, direction: AdapterDirection) -> Self {
        Self::UnimplementedAdapter { dialect, direction }
    }
}
