//! Linux Virtual Server (IPVS) reconciliation.
//!
//! Diffs the desired virtual-service configuration against the kernel's live
//! IPVS table and issues the minimal set of create/update/delete operations.
//! Kernel access stays behind the [`IpvsTable`] trait; this crate never talks
//! netlink itself.
//!
//! # Example
//!
//! ```no_run
//! use lvs::{IpvsTable, Reconciler};
//! use lvs::config::LvsConfig;
//! use std::sync::Arc;
//!
//! # async fn example(table: Arc<dyn IpvsTable>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = LvsConfig::from_yaml_file("/etc/keepalive/keepalive.yml")?;
//! let reconciler = Reconciler::new(table);
//! reconciler.reconcile(&config.lvs).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod reconcile;
pub mod table;
pub mod types;

pub use reconcile::Reconciler;
pub use table::IpvsTable;
pub use types::{Destination, FwdMethod, Protocol, Scheduler, Service};
