//! Common utilities and types shared across keepalive-rs components.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
