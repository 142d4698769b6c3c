//! Desired-state configuration for virtual services.
//!
//! Mirrors the `lvs:` section of the node's YAML configuration. These types
//! are rebuilt from the file on every reload and handed to the reconciler;
//! nothing here is cached across reconciliation passes.

use std::net::IpAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Scheduler;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Forwarding mode of a virtual service, from the `type` config field.
///
/// Only `dr` selects direct routing; every other value, including ones this
/// crate does not recognize, falls back to NAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ForwardingMode {
    DirectRoute,
    Masquerade,
}

impl Default for ForwardingMode {
    fn default() -> Self {
        ForwardingMode::Masquerade
    }
}

impl From<String> for ForwardingMode {
    fn from(s: String) -> Self {
        match s.as_str() {
            "dr" => ForwardingMode::DirectRoute,
            _ => ForwardingMode::Masquerade,
        }
    }
}

impl From<ForwardingMode> for String {
    fn from(mode: ForwardingMode) -> Self {
        match mode {
            ForwardingMode::DirectRoute => "dr",
            ForwardingMode::Masquerade => "nat",
        }
        .to_string()
    }
}

/// One virtual service in the desired configuration.
///
/// Identity key within one reconciliation pass: (address, port).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualServiceConfig {
    pub name: String,
    pub address: IpAddr,
    pub port: u16,
    pub schedule: Scheduler,
    #[serde(rename = "type", default)]
    pub forwarding: ForwardingMode,
    #[serde(default)]
    pub servers: Vec<RealServerConfig>,
}

/// One backend real server under a virtual service.
///
/// Identity key within its service: address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealServerConfig {
    pub address: IpAddr,
    pub port: u16,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

/// Top-level `lvs:` document: the full desired set of virtual services.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LvsConfig {
    #[serde(default)]
    pub lvs: Vec<VirtualServiceConfig>,
}

impl LvsConfig {
    /// Parse a configuration document from a YAML string.
    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Load a configuration document from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }
}
