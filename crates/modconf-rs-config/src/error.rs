//! Error and diagnostic types for schema declaration and config resolution.

use std::fmt;
use thiserror::Error;

/// Fatal errors returned while resolving module config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `get_config` was called for a module that never declared a schema.
    #[error("no config schema has been defined for {0}")]
    SchemaNotDefined(String),
    /// Strict mode rejected a provided key that the schema does not declare.
    #[error("unknown config key '{path}' is not declared in the schema")]
    UnknownKey { path: String },
    /// The external config source was located but could not be loaded.
    #[error(transparent)]
    ExternalLoad(#[from] ExternalLoadError),
    /// Reading a config file failed.
    #[error("failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Parsing a config file failed.
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] json5::Error),
    /// Converting JSON values failed.
    #[error("failed to decode config: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    /// Generic invalid input.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failure of the one-shot external source load.
///
/// Cloneable so every caller awaiting the shared load observes the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("problem importing {name}: {message}")]
pub struct ExternalLoadError {
    /// Well-known name of the external source.
    pub name: String,
    /// Rendered cause of the failure.
    pub message: String,
}

/// Non-fatal findings reported while declaring schemas or validating config.
///
/// Every diagnostic is logged when it is produced; resolution carries on with
/// a best-effort config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigDiagnostic {
    /// A provided key has no matching schema entry.
    UnknownKey { path: String },
    /// A schema validator rejected a provided value.
    InvalidValue {
        path: String,
        value: String,
        message: String,
    },
    /// A value that the schema declares as an array is something else.
    NotAnArray { path: String, value: String },
    /// A schema node is structurally unusable.
    MalformedSchema {
        module: String,
        path: String,
        reason: String,
    },
}

impl ConfigDiagnostic {
    /// Dotted/indexed key path the diagnostic refers to.
    pub fn path(&self) -> &str {
        match self {
            Self::UnknownKey { path }
            | Self::InvalidValue { path, .. }
            | Self::NotAnArray { path, .. }
            | Self::MalformedSchema { path, .. } => path,
        }
    }

    /// Log the diagnostic at error level.
    pub(crate) fn emit(&self) {
        log::error!("{self}");
    }
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKey { path } => {
                write!(f, "unknown config key '{path}' provided; ignoring")
            }
            Self::InvalidValue {
                path,
                value,
                message,
            } => write!(f, "invalid configuration value {value} for {path}: {message}"),
            Self::NotAnArray { path, value } => write!(
                f,
                "invalid configuration value {value} for {path}: value must be an array"
            ),
            Self::MalformedSchema {
                module,
                path,
                reason,
            } => write!(
                f,
                "{module} has a bad config schema definition for key '{path}': {reason}"
            ),
        }
    }
}
