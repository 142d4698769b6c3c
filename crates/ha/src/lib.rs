//! High-availability VIP management.
//!
//! Reacts to Active/Standby role transitions decided by the external VRRP
//! election: attaches or releases the configured VIPs on the node's interface
//! and runs a periodic ownership announcement per held VIP. Address
//! manipulation and announcement transmission stay behind the
//! [`AddressClient`] trait; the VRRP protocol itself lives elsewhere and only
//! its role signal arrives here.
//!
//! # Example
//!
//! ```no_run
//! use ha::{AddressClient, HaConfig, HaRole, VipEngine};
//! use std::sync::Arc;
//!
//! # async fn example(client: Arc<dyn AddressClient>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = HaConfig::from_yaml_file("/etc/keepalive/keepalive.yml")?;
//! let mut engine = VipEngine::new(&config, client);
//!
//! // Delivered by the role notifier on every transition.
//! engine.apply_role(HaRole::Active).await?;
//! # Ok(())
//! # }
//! ```

pub mod addr;
pub mod announce;
pub mod config;
pub mod engine;

pub use addr::AddressClient;
pub use announce::{ANNOUNCE_INTERVAL, AnnouncerHandle};
pub use config::{HaConfig, VipConfig};
pub use engine::{HaRole, VipEngine, VipEntry};
