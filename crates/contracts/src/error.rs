//! Layered error definitions
//!
//! Categorized by source: config / store / directory / transport / intake

use thiserror::Error;

use crate::SatelliteId;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Store Errors =====
    /// Store listing or deletion failure
    #[error("store {operation} error: {message}")]
    Store { operation: String, message: String },

    // ===== Directory Errors =====
    /// Satellite id could not be resolved to an address
    #[error("directory resolve error for '{satellite}': {message}")]
    DirectoryResolve {
        satellite: SatelliteId,
        message: String,
    },

    /// Directory endpoint unreachable or misconfigured
    #[error("directory connection error: {message}")]
    DirectoryConnection { message: String },

    // ===== Transport Errors =====
    /// Dial credentials could not be produced
    #[error("credentials error: {message}")]
    Credentials { message: String },

    /// Connection to a resolved satellite address failed
    #[error("connection error to {addr}: {message}")]
    Connection { addr: String, message: String },

    // ===== Intake Errors =====
    /// A streamed agreement message failed to send
    #[error("intake send error to '{satellite}' at index {index}: {message}")]
    IntakeSend {
        satellite: SatelliteId,
        index: usize,
        message: String,
    },

    /// Stream close or settlement summary receive failed
    #[error("intake close error for '{satellite}': {message}")]
    IntakeClose {
        satellite: SatelliteId,
        message: String,
    },

    /// Malformed or oversized wire frame
    #[error("protocol error: {message}")]
    Protocol { message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create store operation error
    pub fn store(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Store {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create directory resolve error
    pub fn directory_resolve(satellite: SatelliteId, message: impl Into<String>) -> Self {
        Self::DirectoryResolve {
            satellite,
            message: message.into(),
        }
    }

    /// Create directory connection error
    pub fn directory_connection(message: impl Into<String>) -> Self {
        Self::DirectoryConnection {
            message: message.into(),
        }
    }

    /// Create credentials error
    pub fn credentials(message: impl Into<String>) -> Self {
        Self::Credentials {
            message: message.into(),
        }
    }

    /// Create connection error
    pub fn connection(addr: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            addr: addr.into(),
            message: message.into(),
        }
    }

    /// Create protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}
