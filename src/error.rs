//! Crate-wide error type.
//!
//! Every fallible operation returns `Result<T, AppError>`. The binary maps each
//! variant to a process exit code via [`AppError::exit_code`].

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    /// Empty or mismatched series, too few points, zero variance, bad values.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A computation hit a singularity (ln of a non-positive value, NaN weight, ...).
    #[error("numeric degenerate: {0}")]
    NumericDegenerate(String),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Io(String),

    /// Input file could not be parsed.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl AppError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::NumericDegenerate(message.into())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::Io(_) | AppError::Parse { .. } => 2,
            AppError::InvalidInput(_) => 3,
            AppError::NumericDegenerate(_) => 4,
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, AppError>;
