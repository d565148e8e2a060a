//! Error types for URL template interpolation.

use thiserror::Error;

/// Errors returned while interpolating or dispatching navigation targets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    /// Templates may not contain backticks.
    #[error("template may not include backticks")]
    Backtick,
    /// A placeholder names a variable that was not supplied.
    #[error("unknown template variable: {0}")]
    UnknownVariable(String),
    /// A placeholder holds something other than a plain variable name.
    #[error("unsupported template expression: {0}")]
    UnsupportedExpression(String),
}
