//! Error types for function calls and configuration loading.

use thiserror::Error;

/// Failure raised by a single function call.
///
/// Only `OutOfRange` and `InvalidArgument` come from the core operations;
/// the rest are raised by the registry itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FuncError {
    #[error("index out of range: {index} not in [0, {len})")]
    /// `index` is the caller's value, widened so any signed or unsigned
    /// integer is reported unchanged.
    OutOfRange { index: i128, len: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("function not found: {0}")]
    UnknownFunction(String),

    #[error("function already registered: {0}")]
    DuplicateFunction(String),

    #[error("invalid function name: {0:?}")]
    InvalidName(String),
}

impl FuncError {
    pub fn arity(name: &str, expected: &str, got: usize) -> Self {
        Self::InvalidArgument(format!("{} expects {} argument(s), got {}", name, expected, got))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
