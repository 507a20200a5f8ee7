//! Error type of profile loading
//!
//! Every fallible operation of this crate returns a [`ConfigError`] that
//! names the file or field at fault.

use std::fmt;

use padmacro_types::action::TreeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// File or directory I/O error
    FileRead { path: String, message: String },
    /// The file is not valid JSON or TOML, or doesn't have the expected shape
    Parse { path: String, message: String },
    /// Validation error with context
    Validation { field: String, message: String },
    MissingField { field: String },
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },
    /// No profile in the directory could be loaded
    NoProfiles { dir: String },
}

impl ConfigError {
    /// Prefix the field of this error with `scope`, e.g. `buttons[3]`
    pub fn within(self, scope: &str) -> Self {
        let scoped = |field: String| {
            if field.is_empty() {
                scope.to_string()
            } else {
                format!("{}.{}", scope, field)
            }
        };
        match self {
            ConfigError::Validation { field, message } => ConfigError::Validation {
                field: scoped(field),
                message,
            },
            ConfigError::MissingField { field } => ConfigError::MissingField { field: scoped(field) },
            ConfigError::InvalidValue { field, value, expected } => ConfigError::InvalidValue {
                field: scoped(field),
                value,
                expected,
            },
            other => other,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileRead { path, message } => {
                write!(f, "Failed to read '{}': {}", path, message)
            }
            ConfigError::Parse { path, message } => {
                write!(f, "Failed to parse '{}': {}", path, message)
            }
            ConfigError::Validation { field, message } => {
                write!(f, "Validation error in '{}': {}", field, message)
            }
            ConfigError::MissingField { field } => {
                write!(f, "Missing required field: {}", field)
            }
            ConfigError::InvalidValue { field, value, expected } => {
                write!(f, "Invalid value '{}' for '{}', expected: {}", value, field, expected)
            }
            ConfigError::NoProfiles { dir } => {
                write!(f, "No profile could be loaded from '{}'", dir)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<TreeError> for ConfigError {
    fn from(err: TreeError) -> Self {
        ConfigError::Validation {
            field: "actions".to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
