//! HA VIP configuration.
//!
//! Mirrors the `vip:` section of the node's YAML configuration: the interface
//! carrying the VIPs and the address/prefix pairs under HA control.

use std::net::IpAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// One VIP in the HA configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VipConfig {
    pub address: IpAddr,
    pub prefix: u8,
}

/// HA section of the node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HaConfig {
    /// Name of the interface that carries the VIPs.
    pub interface: String,
    #[serde(default)]
    pub vips: Vec<VipConfig>,
}

impl HaConfig {
    /// Parse the HA section from a YAML string.
    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        #[derive(Deserialize)]
        struct Document {
            vip: HaConfig,
        }
        let doc: Document = serde_yaml::from_str(raw)?;
        Ok(doc.vip)
    }

    /// Load the HA section from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }
}
