//! Sender error types

use contracts::ContractError;
use thiserror::Error;

/// Sender-specific errors
#[derive(Debug, Error)]
pub enum SenderError {
    /// Invalid configuration, surfaced synchronously at construction
    #[error("invalid sender configuration: {message}")]
    Config { message: String },

    /// Everything the error log accumulated over one run
    #[error("agreement delivery accumulated {} error(s)", .errors.len())]
    Aggregate { errors: Vec<ContractError> },
}

impl SenderError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// The accumulated delivery errors, if any.
    pub fn errors(&self) -> &[ContractError] {
        match self {
            Self::Aggregate { errors } => errors,
            Self::Config { .. } => &[],
        }
    }
}
