//! Common error types for keepalive-rs components.

use std::fmt;

/// A specialized Result type for keepalive-rs operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for keepalive-rs operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IPVS error: {0}")]
    Ipvs(String),

    #[error("interface address error: {0}")]
    Address(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown error: {0}")]
    Other(String),
}

impl Error {
    /// Create a new IPVS error.
    pub fn ipvs(msg: impl fmt::Display) -> Self {
        Error::Ipvs(msg.to_string())
    }

    /// Create a new interface address error.
    pub fn address(msg: impl fmt::Display) -> Self {
        Error::Address(msg.to_string())
    }

    /// Create a new configuration error.
    pub fn config(msg: impl fmt::Display) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new other error.
    pub fn other(msg: impl fmt::Display) -> Self {
        Error::Other(msg.to_string())
    }
}
